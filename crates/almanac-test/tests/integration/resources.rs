//! Calendar, sub-calendar and event endpoints.

use chrono::{TimeZone, Utc};
use salvo::http::StatusCode;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn calendar_lifecycle() {
    let ctx = TestContext::new().await;

    let created = ctx
        .send(TestRequest::post("/api/v1/calendars").json(&json!({ "name": "  Family  " })))
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(created["name"], "Family");
    assert_eq!(created["timezone"], "UTC");
    let id = created["id"].as_i64().expect("calendar id");
    let path = format!("/api/v1/calendars/{id}");

    let updated = ctx
        .send(TestRequest::put(&path).json(&json!({ "timezone": "Europe/Berlin" })))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(updated["timezone"], "Europe/Berlin");
    assert_eq!(updated["name"], "Family");

    #[expect(unused_must_use)]
    ctx.send(TestRequest::patch(&path).json(&json!({ "timezone": "Mars/Olympus" })))
        .await
        .assert_validation_error("timezone", "The timezone field must be a valid timezone.");

    #[expect(unused_must_use)]
    ctx.send(TestRequest::delete(&path))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    #[expect(unused_must_use)]
    ctx.send(TestRequest::get(&path))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn invalid_json_body_is_a_validation_error() {
    let ctx = TestContext::new().await;

    #[expect(unused_must_use)]
    ctx.send(TestRequest::post("/api/v1/calendars").raw_body("application/json", "{not json"))
        .await
        .assert_validation_error("body", "The request body must be a valid JSON object.");

    #[expect(unused_must_use)]
    ctx.send(TestRequest::post("/api/v1/calendars").json(&json!({})))
        .await
        .assert_validation_error("name", "The name field is required.");
}

#[test_log::test(tokio::test)]
async fn sub_calendar_defaults_and_nested_create() {
    let ctx = TestContext::new().await;
    let calendar = ctx
        .db
        .seed_calendar(ctx.user.id, "Club")
        .await
        .expect("Failed to seed calendar");

    let created = ctx
        .send(
            TestRequest::post(&format!("/api/v1/calendars/{}/sub-calendars", calendar.id))
                .json(&json!({ "name": "Board" })),
        )
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(created["calendar_id"], calendar.id);
    assert_eq!(created["color"], "#000000");
    assert_eq!(created["active"], true);
    assert_eq!(created["overlap"], false);

    #[expect(unused_must_use)]
    ctx.send(TestRequest::post("/api/v1/sub-calendars").json(&json!({
        "calendar_id": calendar.id,
        "name": "Colorful",
        "color": "blue",
    })))
    .await
    .assert_validation_error("color", "The color field format is invalid.");

    #[expect(unused_must_use)]
    ctx.send(TestRequest::post("/api/v1/sub-calendars").json(&json!({ "name": "Orphan" })))
        .await
        .assert_validation_error("calendar_id", "The calendar_id field is required.");

    let listed = ctx
        .send(TestRequest::get(&format!("/api/v1/sub-calendars?calendar_id={}", calendar.id)))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[test_log::test(tokio::test)]
async fn sub_calendar_move_is_blocked_by_field_values() {
    let ctx = TestContext::new().await;
    let from = ctx
        .db
        .seed_calendar(ctx.user.id, "From")
        .await
        .expect("Failed to seed calendar");
    let to = ctx
        .db
        .seed_calendar(ctx.user.id, "To")
        .await
        .expect("Failed to seed calendar");
    let sub_calendar = ctx
        .db
        .seed_sub_calendar(from.id, "Moving")
        .await
        .expect("Failed to seed sub-calendar");
    let event = ctx
        .db
        .seed_event(sub_calendar.id, "Meeting")
        .await
        .expect("Failed to seed event");
    let field = ctx
        .db
        .seed_field(from.id, "Room", FieldType::Text)
        .await
        .expect("Failed to seed field");
    ctx.db
        .seed_text_value(event.id, field.id, "Hall B")
        .await
        .expect("Failed to seed value");

    let path = format!("/api/v1/sub-calendars/{}", sub_calendar.id);

    #[expect(unused_must_use)]
    ctx.send(TestRequest::patch(&path).json(&json!({ "calendar_id": to.id })))
        .await
        .assert_validation_error(
            "calendar_id",
            "The calendar cannot be changed while events in this sub-calendar have custom field values.",
        );

    // Clearing the value through the event unblocks the move.
    #[expect(unused_must_use)]
    ctx.send(
        TestRequest::patch(&format!("/api/v1/events/{}", event.id)).json(&json!({
            "custom_event_field_values": [{ "custom_event_field_id": field.id, "value": "" }],
        })),
    )
    .await
    .assert_status(StatusCode::OK);

    let moved = ctx
        .send(TestRequest::patch(&path).json(&json!({ "calendar_id": to.id })))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(moved["calendar_id"], to.id);
}

#[test_log::test(tokio::test)]
async fn event_fields_are_validated() {
    let ctx = TestContext::new().await;
    let calendar = ctx
        .db
        .seed_calendar(ctx.user.id, "Club")
        .await
        .expect("Failed to seed calendar");
    let sub_calendar = ctx
        .db
        .seed_sub_calendar(calendar.id, "Meetings")
        .await
        .expect("Failed to seed sub-calendar");
    let path = format!(
        "/api/v1/calendars/{}/sub-calendars/{}/events",
        calendar.id, sub_calendar.id
    );

    let response = ctx
        .send(TestRequest::post(&path).json(&json!({
            "title": "",
            "start_date": "2026-06-02 10:00",
            "end_date": "2026-06-01 10:00",
            "rrule": "FREQ=SOMETIMES",
        })))
        .await
        .assert_validation_error("title", "The title field is required.")
        .assert_validation_error(
            "end_date",
            "The end_date field must be a date after or equal to start_date.",
        );
    assert!(!response.validation_messages("rrule").is_empty());

    let created = ctx
        .send(TestRequest::post(&path).json(&json!({
            "title": "Weekly",
            "start_date": "2026-06-01 10:00",
            "end_date": "2026-06-01 11:00",
            "rrule": "RRULE:FREQ=WEEKLY;COUNT=4",
            "where": "Hall B",
            "about": "   ",
        })))
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(created["where"], "Hall B");
    assert_eq!(created["about"], serde_json::Value::Null);
    assert_eq!(created["sub_calendar_id"], sub_calendar.id);
    assert_eq!(created["custom_event_fields"], json!({}));
}

#[test_log::test(tokio::test)]
async fn event_listing_filters_by_window() {
    let ctx = TestContext::new().await;
    let calendar = ctx
        .db
        .seed_calendar(ctx.user.id, "Club")
        .await
        .expect("Failed to seed calendar");
    let sub_calendar = ctx
        .db
        .seed_sub_calendar(calendar.id, "Meetings")
        .await
        .expect("Failed to seed sub-calendar");

    let june = Utc.with_ymd_and_hms(2026, 6, 10, 9, 0, 0).single().expect("valid date");
    let august = Utc.with_ymd_and_hms(2026, 8, 10, 9, 0, 0).single().expect("valid date");
    let in_june = ctx
        .db
        .seed_event_at(sub_calendar.id, "June", june, june + chrono::Duration::hours(2))
        .await
        .expect("Failed to seed event");
    ctx.db
        .seed_event_at(sub_calendar.id, "August", august, august + chrono::Duration::hours(2))
        .await
        .expect("Failed to seed event");

    let events = ctx
        .send(TestRequest::get(
            "/api/v1/events?start=2026-06-01&end=2026-06-30",
        ))
        .await
        .assert_status(StatusCode::OK)
        .json();
    let ids: Vec<i64> = events
        .as_array()
        .expect("array of events")
        .iter()
        .filter_map(|event| event["id"].as_i64())
        .collect();
    assert_eq!(ids, [in_june.id]);

    #[expect(unused_must_use)]
    ctx.send(TestRequest::get("/api/v1/events?start=someday"))
        .await
        .assert_validation_error("start", "The start field must be a valid date.");
}

#[test_log::test(tokio::test)]
async fn deleting_an_event_cascades_its_values() {
    let ctx = TestContext::new().await;
    let calendar = ctx
        .db
        .seed_calendar(ctx.user.id, "Club")
        .await
        .expect("Failed to seed calendar");
    let sub_calendar = ctx
        .db
        .seed_sub_calendar(calendar.id, "Meetings")
        .await
        .expect("Failed to seed sub-calendar");
    let event = ctx
        .db
        .seed_event(sub_calendar.id, "Meeting")
        .await
        .expect("Failed to seed event");
    let field = ctx
        .db
        .seed_field(calendar.id, "Room", FieldType::Text)
        .await
        .expect("Failed to seed field");
    ctx.db
        .seed_text_value(event.id, field.id, "Hall B")
        .await
        .expect("Failed to seed value");

    #[expect(unused_must_use)]
    ctx.send(TestRequest::delete(&format!("/api/v1/events/{}", event.id)))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(ctx.db.field_values_of(event.id).await.expect("values").is_empty());
}
