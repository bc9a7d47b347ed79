//! Field catalog endpoints.

use salvo::http::StatusCode;

use super::helpers::*;

async fn owned_calendar(ctx: &TestContext) -> i64 {
    ctx.db
        .seed_calendar(ctx.user.id, "Club")
        .await
        .expect("Failed to seed calendar")
        .id
}

#[test_log::test(tokio::test)]
async fn nested_create_returns_the_field_with_options() {
    let ctx = TestContext::new().await;
    let calendar_id = owned_calendar(&ctx).await;

    let response = ctx
        .send(
            TestRequest::post(&format!("/api/v1/calendars/{calendar_id}/custom-event-fields"))
                .json(&json!({
                    "name": "Status",
                    "type": "s_select",
                    "options": [{ "name": "Planned" }, { "name": " Confirmed " }],
                })),
        )
        .await
        .assert_status(StatusCode::CREATED);

    let body = response.json();
    assert_eq!(body["calendar_id"], calendar_id);
    assert_eq!(body["type"], "s_select");
    let names: Vec<&str> = body["options"]
        .as_array()
        .expect("options array")
        .iter()
        .filter_map(|option| option["name"].as_str())
        .collect();
    assert_eq!(names, ["Planned", "Confirmed"]);

    let listed = ctx
        .send(TestRequest::get(&format!(
            "/api/v1/custom-event-fields?calendar_id={calendar_id}"
        )))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[test_log::test(tokio::test)]
async fn select_types_need_options_and_types_are_closed() {
    let ctx = TestContext::new().await;
    let calendar_id = owned_calendar(&ctx).await;

    #[expect(unused_must_use)]
    ctx.send(TestRequest::post("/api/v1/custom-event-fields").json(&json!({
        "calendar_id": calendar_id,
        "name": "Tags",
        "type": "m_select",
    })))
    .await
    .assert_validation_error("options", "The options field is required when type is m_select.");

    #[expect(unused_must_use)]
    ctx.send(TestRequest::post("/api/v1/custom-event-fields").json(&json!({
        "calendar_id": calendar_id,
        "name": "When",
        "type": "date",
    })))
    .await
    .assert_validation_error("type", "The selected type is invalid.");
}

#[test_log::test(tokio::test)]
async fn type_change_is_blocked_while_values_exist() {
    let ctx = TestContext::new().await;
    let calendar_id = owned_calendar(&ctx).await;
    let sub_calendar = ctx
        .db
        .seed_sub_calendar(calendar_id, "Meetings")
        .await
        .expect("Failed to seed sub-calendar");
    let event = ctx
        .db
        .seed_event(sub_calendar.id, "Meeting")
        .await
        .expect("Failed to seed event");
    let field = ctx
        .db
        .seed_field(calendar_id, "Room", FieldType::Text)
        .await
        .expect("Failed to seed field");
    let path = format!("/api/v1/custom-event-fields/{}", field.id);

    ctx.db
        .seed_text_value(event.id, field.id, "Hall B")
        .await
        .expect("Failed to seed value");

    #[expect(unused_must_use)]
    ctx.send(TestRequest::put(&path).json(&json!({
        "type": "s_select",
        "options": [{ "name": "Hall A" }],
    })))
    .await
    .assert_validation_error(
        "type",
        "The type cannot be changed while events have values for this field.",
    );

    // A rename is still allowed.
    let renamed = ctx
        .send(TestRequest::patch(&path).json(&json!({ "name": "Location" })))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(renamed["name"], "Location");
    assert_eq!(renamed["type"], "text");
}

#[test_log::test(tokio::test)]
async fn option_updates_rename_add_and_drop() {
    let ctx = TestContext::new().await;
    let calendar_id = owned_calendar(&ctx).await;
    let field = ctx
        .db
        .seed_field(calendar_id, "Status", FieldType::SingleSelect)
        .await
        .expect("Failed to seed field");
    let options = ctx
        .db
        .seed_options(field.id, &["Planned", "Maybe"])
        .await
        .expect("Failed to seed options");

    let body = ctx
        .send(
            TestRequest::patch(&format!("/api/v1/custom-event-fields/{}", field.id)).json(&json!({
                "options": [
                    { "id": options[0].id, "name": "Scheduled" },
                    { "name": "Cancelled" },
                ],
            })),
        )
        .await
        .assert_status(StatusCode::OK)
        .json();

    let options_after = body["options"].as_array().expect("options array");
    assert_eq!(options_after.len(), 2);
    assert_eq!(options_after[0]["id"], options[0].id);
    assert_eq!(options_after[0]["name"], "Scheduled");
    assert_eq!(options_after[1]["name"], "Cancelled");

    #[expect(unused_must_use)]
    ctx.send(
        TestRequest::patch(&format!("/api/v1/custom-event-fields/{}", field.id))
            .json(&json!({ "options": [{ "id": options[1].id, "name": "Gone" }] })),
    )
    .await
    .assert_validation_error("options", "One or more options are invalid.");
}

#[test_log::test(tokio::test)]
async fn deleting_a_field_removes_its_values() {
    let ctx = TestContext::new().await;
    let calendar_id = owned_calendar(&ctx).await;
    let sub_calendar = ctx
        .db
        .seed_sub_calendar(calendar_id, "Meetings")
        .await
        .expect("Failed to seed sub-calendar");
    let event = ctx
        .db
        .seed_event(sub_calendar.id, "Meeting")
        .await
        .expect("Failed to seed event");
    let field = ctx
        .db
        .seed_field(calendar_id, "Room", FieldType::Text)
        .await
        .expect("Failed to seed field");
    ctx.db
        .seed_text_value(event.id, field.id, "Hall B")
        .await
        .expect("Failed to seed value");

    #[expect(unused_must_use)]
    ctx.send(TestRequest::delete(&format!(
        "/api/v1/calendars/{calendar_id}/custom-event-fields/{}",
        field.id
    )))
    .await
    .assert_status(StatusCode::NO_CONTENT);

    assert!(ctx.db.field_values_of(event.id).await.expect("values").is_empty());

    let shown = ctx
        .send(TestRequest::get(&format!("/api/v1/events/{}", event.id)))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(shown["custom_event_fields"], json!({}));
}
