//! Resources of other users are invisible, whichever route shape addresses them.

use salvo::http::StatusCode;

use super::helpers::*;

/// Seeds a second user's calendar tree and returns its ids.
async fn seed_foreign_tree(db: &TestDb) -> (i64, i64, i64, i64) {
    let (other, _) = db
        .seed_authenticated_user("intruder@example.com")
        .await
        .expect("Failed to seed other user");
    let calendar = db
        .seed_calendar(other.id, "Private")
        .await
        .expect("Failed to seed calendar");
    let sub_calendar = db
        .seed_sub_calendar(calendar.id, "Hidden")
        .await
        .expect("Failed to seed sub-calendar");
    let event = db
        .seed_event(sub_calendar.id, "Secret")
        .await
        .expect("Failed to seed event");
    let field = db
        .seed_field(calendar.id, "Room", FieldType::Text)
        .await
        .expect("Failed to seed field");
    (calendar.id, sub_calendar.id, event.id, field.id)
}

#[test_log::test(tokio::test)]
async fn flat_routes_hide_foreign_resources() {
    let ctx = TestContext::new().await;
    let (calendar, sub_calendar, event, field) = seed_foreign_tree(&ctx.db).await;

    for path in [
        format!("/api/v1/calendars/{calendar}"),
        format!("/api/v1/sub-calendars/{sub_calendar}"),
        format!("/api/v1/events/{event}"),
        format!("/api/v1/custom-event-fields/{field}"),
    ] {
        let response = ctx
            .send(TestRequest::get(&path))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json(), json!({ "message": "Not found." }), "{path}");
    }

    #[expect(unused_must_use)]
    ctx.send(TestRequest::delete(&format!("/api/v1/events/{event}")))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn nested_routes_check_every_parent() {
    let ctx = TestContext::new().await;
    let (foreign_calendar, foreign_sub_calendar, foreign_event, _) =
        seed_foreign_tree(&ctx.db).await;

    let own_calendar = ctx
        .db
        .seed_calendar(ctx.user.id, "Mine")
        .await
        .expect("Failed to seed calendar");
    let own_sub_calendar = ctx
        .db
        .seed_sub_calendar(own_calendar.id, "Work")
        .await
        .expect("Failed to seed sub-calendar");
    let own_event = ctx
        .db
        .seed_event(own_sub_calendar.id, "Standup")
        .await
        .expect("Failed to seed event");

    // Own parents with a foreign leaf.
    #[expect(unused_must_use)]
    ctx.send(TestRequest::get(&format!(
        "/api/v1/calendars/{}/sub-calendars/{}/events/{foreign_event}",
        own_calendar.id, own_sub_calendar.id
    )))
    .await
    .assert_status(StatusCode::NOT_FOUND);

    // Foreign parent with an own leaf.
    #[expect(unused_must_use)]
    ctx.send(TestRequest::get(&format!(
        "/api/v1/calendars/{foreign_calendar}/sub-calendars/{}/events/{}",
        own_sub_calendar.id, own_event.id
    )))
    .await
    .assert_status(StatusCode::NOT_FOUND);

    // A foreign sub-calendar under an own calendar.
    #[expect(unused_must_use)]
    ctx.send(TestRequest::get(&format!(
        "/api/v1/calendars/{}/sub-calendars/{foreign_sub_calendar}",
        own_calendar.id
    )))
    .await
    .assert_status(StatusCode::NOT_FOUND);

    let response = ctx
        .send(TestRequest::get(&format!(
            "/api/v1/calendars/{}/sub-calendars/{}/events/{}",
            own_calendar.id, own_sub_calendar.id, own_event.id
        )))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.json()["title"], "Standup");
}

#[test_log::test(tokio::test)]
async fn mismatched_lineage_is_not_found() {
    let ctx = TestContext::new().await;
    let first = ctx
        .db
        .seed_calendar(ctx.user.id, "First")
        .await
        .expect("Failed to seed calendar");
    let second = ctx
        .db
        .seed_calendar(ctx.user.id, "Second")
        .await
        .expect("Failed to seed calendar");
    let sub_calendar = ctx
        .db
        .seed_sub_calendar(second.id, "Belongs to second")
        .await
        .expect("Failed to seed sub-calendar");

    #[expect(unused_must_use)]
    ctx.send(TestRequest::get(&format!(
        "/api/v1/calendars/{}/sub-calendars/{}",
        first.id, sub_calendar.id
    )))
    .await
    .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn malformed_path_ids_are_not_found() {
    let ctx = TestContext::new().await;

    for path in ["/api/v1/calendars/abc", "/api/v1/calendars/0", "/api/v1/events/-4"] {
        #[expect(unused_must_use)]
        ctx.send(TestRequest::get(path))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

#[test_log::test(tokio::test)]
async fn foreign_ids_in_a_body_are_rejected() {
    let ctx = TestContext::new().await;
    let (foreign_calendar, foreign_sub_calendar, _, _) = seed_foreign_tree(&ctx.db).await;

    #[expect(unused_must_use)]
    ctx.send(
        TestRequest::post("/api/v1/sub-calendars")
            .json(&json!({ "calendar_id": foreign_calendar, "name": "Sneaky" })),
    )
    .await
    .assert_validation_error("calendar_id", "The selected calendar_id is invalid.");

    #[expect(unused_must_use)]
    ctx.send(TestRequest::post("/api/v1/events").json(&json!({
        "sub_calendar_id": foreign_sub_calendar,
        "title": "Sneaky",
        "start_date": "2026-05-01 09:00",
        "end_date": "2026-05-01 10:00",
    })))
    .await
    .assert_validation_error("sub_calendar_id", "The selected sub_calendar_id is invalid.");
}

#[test_log::test(tokio::test)]
async fn listings_only_show_own_rows() {
    let ctx = TestContext::new().await;
    seed_foreign_tree(&ctx.db).await;
    let own = ctx
        .db
        .seed_calendar(ctx.user.id, "Mine")
        .await
        .expect("Failed to seed calendar");

    let calendars = ctx
        .send(TestRequest::get("/api/v1/calendars"))
        .await
        .assert_status(StatusCode::OK)
        .json();
    let ids: Vec<i64> = calendars
        .as_array()
        .expect("array of calendars")
        .iter()
        .filter_map(|calendar| calendar["id"].as_i64())
        .collect();
    assert_eq!(ids, [own.id]);

    let events = ctx
        .send(TestRequest::get("/api/v1/events"))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(events, json!([]));
}
