//! Custom field values written through the event endpoints.

use salvo::http::StatusCode;

use super::helpers::*;

const FIELD_VALUES: &str = "custom_event_field_values";

/// A calendar with one field of each supported type.
struct Catalog {
    ctx: TestContext,
    calendar_id: i64,
    sub_calendar_id: i64,
    text: i64,
    single: i64,
    multi: i64,
    single_options: Vec<i64>,
    multi_options: Vec<i64>,
}

impl Catalog {
    async fn new() -> Self {
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

        let text = ctx
            .db
            .seed_field(calendar.id, "Room", FieldType::Text)
            .await
            .expect("Failed to seed text field");
        let single = ctx
            .db
            .seed_field(calendar.id, "Status", FieldType::SingleSelect)
            .await
            .expect("Failed to seed single-select field");
        let multi = ctx
            .db
            .seed_field(calendar.id, "Tags", FieldType::MultiSelect)
            .await
            .expect("Failed to seed multi-select field");

        let single_options = ctx
            .db
            .seed_options(single.id, &["Planned", "Confirmed"])
            .await
            .expect("Failed to seed options")
            .into_iter()
            .map(|option| option.id)
            .collect();
        let multi_options = ctx
            .db
            .seed_options(multi.id, &["Kids", "Outdoor", "Free"])
            .await
            .expect("Failed to seed options")
            .into_iter()
            .map(|option| option.id)
            .collect();

        Self {
            ctx,
            calendar_id: calendar.id,
            sub_calendar_id: sub_calendar.id,
            text: text.id,
            single: single.id,
            multi: multi.id,
            single_options,
            multi_options,
        }
    }

    async fn create_event(&self, values: serde_json::Value) -> TestResponse {
        self.ctx
            .send(TestRequest::post("/api/v1/events").json(&json!({
                "sub_calendar_id": self.sub_calendar_id,
                "title": "Monthly meeting",
                "start_date": "2026-06-01 18:00",
                "end_date": "2026-06-01 20:00",
                FIELD_VALUES: values,
            })))
            .await
    }

    async fn update_event(&self, event_id: i64, body: &serde_json::Value) -> TestResponse {
        self.ctx
            .send(TestRequest::patch(&format!("/api/v1/events/{event_id}")).json(body))
            .await
    }

    async fn stored_text(&self, event_id: i64) -> Vec<Option<String>> {
        self.ctx
            .db
            .field_values_of(event_id)
            .await
            .expect("Failed to load values")
            .into_iter()
            .filter(|row| row.custom_event_field_id == self.text)
            .map(|row| row.value)
            .collect()
    }

    async fn stored_options(&self, event_id: i64, field_id: i64) -> Vec<i64> {
        self.ctx
            .db
            .field_values_of(event_id)
            .await
            .expect("Failed to load values")
            .into_iter()
            .filter(|row| row.custom_event_field_id == field_id)
            .filter_map(|row| row.custom_event_field_option_id)
            .collect()
    }
}

#[test_log::test(tokio::test)]
async fn create_stores_and_shapes_every_field_type() {
    let catalog = Catalog::new().await;

    let response = catalog
        .create_event(json!([
            { "custom_event_field_id": catalog.text, "value": "  Hall B  " },
            { "custom_event_field_id": catalog.single, "custom_event_field_option_id": catalog.single_options[1] },
            {
                "custom_event_field_id": catalog.multi,
                "custom_event_field_option_ids": [catalog.multi_options[2], catalog.multi_options[0]],
            },
        ]))
        .await
        .assert_status(StatusCode::CREATED);

    let body = response.json();
    assert_eq!(body["calendar_id"], catalog.calendar_id);

    let fields = &body["custom_event_fields"];
    assert_eq!(fields[catalog.text.to_string()]["value"], "Hall B");
    assert_eq!(fields[catalog.text.to_string()]["type"], "text");

    let single = &fields[catalog.single.to_string()];
    assert_eq!(single["option_id"], catalog.single_options[1]);
    assert_eq!(single["option"]["name"], "Confirmed");

    let multi = &fields[catalog.multi.to_string()];
    assert_eq!(
        multi["option_ids"],
        json!([catalog.multi_options[2], catalog.multi_options[0]])
    );
    assert_eq!(multi["options"][0]["name"], "Free");
}

#[test_log::test(tokio::test)]
async fn repeated_field_ids_keep_the_last_row() {
    let catalog = Catalog::new().await;

    let event_id = catalog
        .create_event(json!([
            { "custom_event_field_id": catalog.text, "value": "first" },
            { "custom_event_field_id": catalog.text, "value": "second" },
        ]))
        .await
        .assert_status(StatusCode::CREATED)
        .id();

    assert_eq!(catalog.stored_text(event_id).await, [Some("second".to_string())]);
}

#[test_log::test(tokio::test)]
async fn resubmitting_the_same_payload_changes_nothing() {
    let catalog = Catalog::new().await;
    let payload = json!([
        { "custom_event_field_id": catalog.text, "value": "Hall B" },
        {
            "custom_event_field_id": catalog.multi,
            "custom_event_field_option_ids": [catalog.multi_options[0], catalog.multi_options[1]],
        },
    ]);

    let created = catalog
        .create_event(payload.clone())
        .await
        .assert_status(StatusCode::CREATED);
    let event_id = created.id();

    let updated = catalog
        .update_event(event_id, &json!({ FIELD_VALUES: payload }))
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(created.json()["custom_event_fields"], updated.json()["custom_event_fields"]);
    assert_eq!(catalog.stored_text(event_id).await, [Some("Hall B".to_string())]);
    assert_eq!(
        catalog.stored_options(event_id, catalog.multi).await,
        [catalog.multi_options[0], catalog.multi_options[1]]
    );
}

#[test_log::test(tokio::test)]
async fn empty_values_clear_only_the_mentioned_fields() {
    let catalog = Catalog::new().await;
    let event_id = catalog
        .create_event(json!([
            { "custom_event_field_id": catalog.text, "value": "Hall B" },
            { "custom_event_field_id": catalog.single, "custom_event_field_option_id": catalog.single_options[0] },
            { "custom_event_field_id": catalog.multi, "custom_event_field_option_ids": [catalog.multi_options[0]] },
        ]))
        .await
        .assert_status(StatusCode::CREATED)
        .id();

    let response = catalog
        .update_event(
            event_id,
            &json!({ FIELD_VALUES: [
                { "custom_event_field_id": catalog.text, "value": "   " },
                { "custom_event_field_id": catalog.multi, "custom_event_field_option_ids": [] },
            ] }),
        )
        .await
        .assert_status(StatusCode::OK);

    let fields = &response.json()["custom_event_fields"];
    assert!(fields.get(catalog.text.to_string()).is_none());
    assert!(fields.get(catalog.multi.to_string()).is_none());
    assert_eq!(
        fields[catalog.single.to_string()]["option_id"],
        catalog.single_options[0]
    );

    let response = catalog
        .update_event(
            event_id,
            &json!({ FIELD_VALUES: [
                { "custom_event_field_id": catalog.single, "custom_event_field_option_id": null },
            ] }),
        )
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.json()["custom_event_fields"], json!({}));
    assert!(catalog.ctx.db.field_values_of(event_id).await.expect("values").is_empty());
}

#[test_log::test(tokio::test)]
async fn absent_key_leaves_values_alone() {
    let catalog = Catalog::new().await;
    let event_id = catalog
        .create_event(json!([{ "custom_event_field_id": catalog.text, "value": "Hall B" }]))
        .await
        .assert_status(StatusCode::CREATED)
        .id();

    let response = catalog
        .update_event(event_id, &json!({ "title": "Renamed" }))
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(response.json()["title"], "Renamed");
    assert_eq!(catalog.stored_text(event_id).await, [Some("Hall B".to_string())]);
}

#[test_log::test(tokio::test)]
async fn invalid_option_rolls_back_earlier_fields() {
    let catalog = Catalog::new().await;
    let event_id = catalog
        .create_event(json!([
            { "custom_event_field_id": catalog.text, "value": "Hall B" },
            { "custom_event_field_id": catalog.single, "custom_event_field_option_id": catalog.single_options[0] },
        ]))
        .await
        .assert_status(StatusCode::CREATED)
        .id();

    // The text row is reconciled first; the multi-select option belongs to
    // another field, so the whole update must be undone.
    #[expect(unused_must_use)]
    catalog
        .update_event(
            event_id,
            &json!({
                "title": "Should not stick",
                FIELD_VALUES: [
                    { "custom_event_field_id": catalog.text, "value": "Hall C" },
                    { "custom_event_field_id": catalog.single, "custom_event_field_option_id": catalog.multi_options[0] },
                ],
            }),
        )
        .await
        .assert_validation_error(
            FIELD_VALUES,
            &format!("Invalid option for custom_event_field_id {}.", catalog.single),
        );

    assert_eq!(catalog.stored_text(event_id).await, [Some("Hall B".to_string())]);
    assert_eq!(
        catalog.stored_options(event_id, catalog.single).await,
        [catalog.single_options[0]]
    );

    let shown = catalog
        .ctx
        .send(TestRequest::get(&format!("/api/v1/events/{event_id}")))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(shown.json()["title"], "Monthly meeting");
}

#[test_log::test(tokio::test)]
async fn failed_create_leaves_no_event_behind() {
    let catalog = Catalog::new().await;

    #[expect(unused_must_use)]
    catalog
        .create_event(json!([
            { "custom_event_field_id": catalog.multi, "custom_event_field_option_ids": [catalog.multi_options[0], 999_999] },
        ]))
        .await
        .assert_validation_error(
            FIELD_VALUES,
            &format!(
                "One or more options are invalid for custom_event_field_id {}.",
                catalog.multi
            ),
        );

    let events = catalog
        .ctx
        .send(TestRequest::get("/api/v1/events"))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(events, json!([]));
}

#[test_log::test(tokio::test)]
async fn fields_of_another_calendar_are_rejected_before_any_write() {
    let catalog = Catalog::new().await;
    let other_calendar = catalog
        .ctx
        .db
        .seed_calendar(catalog.ctx.user.id, "Other")
        .await
        .expect("Failed to seed calendar");
    let foreign_field = catalog
        .ctx
        .db
        .seed_field(other_calendar.id, "Elsewhere", FieldType::Text)
        .await
        .expect("Failed to seed field");

    let event_id = catalog
        .create_event(json!([{ "custom_event_field_id": catalog.text, "value": "Hall B" }]))
        .await
        .assert_status(StatusCode::CREATED)
        .id();

    #[expect(unused_must_use)]
    catalog
        .update_event(
            event_id,
            &json!({ FIELD_VALUES: [
                { "custom_event_field_id": catalog.text, "value": "Hall C" },
                { "custom_event_field_id": foreign_field.id, "value": "nope" },
            ] }),
        )
        .await
        .assert_validation_error(
            FIELD_VALUES,
            "One or more custom_event_field_id values are invalid for this calendar.",
        );

    assert_eq!(catalog.stored_text(event_id).await, [Some("Hall B".to_string())]);
}

#[test_log::test(tokio::test)]
async fn multi_select_stores_each_option_once() {
    let catalog = Catalog::new().await;
    let &[kids, outdoor, _] = catalog.multi_options.as_slice() else {
        panic!("expected three options");
    };

    let event_id = catalog
        .create_event(json!([
            { "custom_event_field_id": catalog.multi, "custom_event_field_option_ids": [outdoor, kids, outdoor, "0", kids] },
        ]))
        .await
        .assert_status(StatusCode::CREATED)
        .id();

    assert_eq!(
        catalog.stored_options(event_id, catalog.multi).await,
        [outdoor, kids]
    );
}

#[test_log::test(tokio::test)]
async fn malformed_value_lists_are_rejected() {
    let catalog = Catalog::new().await;

    #[expect(unused_must_use)]
    catalog
        .create_event(json!({ "custom_event_field_id": catalog.text }))
        .await
        .assert_validation_error(FIELD_VALUES, "The custom_event_field_values field must be an array.");

    #[expect(unused_must_use)]
    catalog
        .create_event(serde_json::Value::Null)
        .await
        .assert_validation_error(FIELD_VALUES, "The custom_event_field_values field must be an array.");

    #[expect(unused_must_use)]
    catalog
        .create_event(json!([
            { "custom_event_field_id": catalog.multi, "custom_event_field_option_ids": catalog.multi_options[0] },
        ]))
        .await
        .assert_validation_error(
            FIELD_VALUES,
            "The custom_event_field_values.0.custom_event_field_option_ids field must be an array.",
        );
}

#[test_log::test(tokio::test)]
async fn wrongly_typed_values_leave_stored_values_alone() {
    let catalog = Catalog::new().await;
    let event_id = catalog
        .create_event(json!([
            { "custom_event_field_id": catalog.text, "value": "Hall B" },
            { "custom_event_field_id": catalog.single, "custom_event_field_option_id": catalog.single_options[0] },
        ]))
        .await
        .assert_status(StatusCode::CREATED)
        .id();

    let response = catalog
        .update_event(
            event_id,
            &json!({ FIELD_VALUES: [
                { "custom_event_field_id": catalog.text, "value": 12 },
                { "custom_event_field_id": catalog.single, "custom_event_field_option_id": "nope" },
                { "custom_event_field_id": catalog.multi, "custom_event_field_option_ids": [catalog.multi_options[0], "x"] },
                { "custom_event_field_id": "abc", "value": "garbage" },
            ] }),
        )
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(
        response.validation_messages(FIELD_VALUES),
        [
            "The custom_event_field_values.0.value field must be a string.",
            "The custom_event_field_values.1.custom_event_field_option_id field must be an integer.",
            "The custom_event_field_values.2.custom_event_field_option_ids.1 field must be an integer.",
            "The custom_event_field_values.3.custom_event_field_id field must be an integer.",
        ]
    );
    assert_eq!(catalog.stored_text(event_id).await, [Some("Hall B".to_string())]);
    assert_eq!(
        catalog.stored_options(event_id, catalog.single).await,
        [catalog.single_options[0]]
    );
    assert!(catalog.stored_options(event_id, catalog.multi).await.is_empty());
}

#[test_log::test(tokio::test)]
async fn overlong_text_is_rejected() {
    let catalog = Catalog::new().await;

    #[expect(unused_must_use)]
    catalog
        .create_event(json!([
            { "custom_event_field_id": catalog.text, "value": "x".repeat(65_536) },
        ]))
        .await
        .assert_validation_error(
            FIELD_VALUES,
            "The custom_event_field_values.0.value field must not be greater than 65535 characters.",
        );

    let event_id = catalog
        .create_event(json!([
            { "custom_event_field_id": catalog.text, "value": "x".repeat(65_535) },
        ]))
        .await
        .assert_status(StatusCode::CREATED)
        .id();
    assert_eq!(catalog.stored_text(event_id).await, [Some("x".repeat(65_535))]);
}

#[test_log::test(tokio::test)]
async fn unusable_rows_are_ignored() {
    let catalog = Catalog::new().await;

    let response = catalog
        .create_event(json!([
            "not an object",
            { "value": "no field id" },
            { "custom_event_field_id": 0, "value": "zero" },
            { "custom_event_field_id": catalog.text.to_string(), "value": "string id" },
        ]))
        .await
        .assert_status(StatusCode::CREATED);

    let event_id = response.id();
    assert_eq!(catalog.stored_text(event_id).await, [Some("string id".to_string())]);
}

#[test_log::test(tokio::test)]
async fn moving_to_another_calendar_drops_values() {
    let catalog = Catalog::new().await;
    let event_id = catalog
        .create_event(json!([{ "custom_event_field_id": catalog.text, "value": "Hall B" }]))
        .await
        .assert_status(StatusCode::CREATED)
        .id();

    let other_calendar = catalog
        .ctx
        .db
        .seed_calendar(catalog.ctx.user.id, "Other")
        .await
        .expect("Failed to seed calendar");
    let other_sub_calendar = catalog
        .ctx
        .db
        .seed_sub_calendar(other_calendar.id, "Elsewhere")
        .await
        .expect("Failed to seed sub-calendar");

    let response = catalog
        .update_event(event_id, &json!({ "sub_calendar_id": other_sub_calendar.id }))
        .await
        .assert_status(StatusCode::OK);

    let body = response.json();
    assert_eq!(body["calendar_id"], other_calendar.id);
    assert_eq!(body["custom_event_fields"], json!({}));
    assert!(catalog.ctx.db.field_values_of(event_id).await.expect("values").is_empty());
}

#[test_log::test(tokio::test)]
async fn listing_carries_each_events_values() {
    let catalog = Catalog::new().await;
    let with_values = catalog
        .create_event(json!([{ "custom_event_field_id": catalog.text, "value": "Hall B" }]))
        .await
        .assert_status(StatusCode::CREATED)
        .id();
    let without_values = catalog
        .create_event(json!([]))
        .await
        .assert_status(StatusCode::CREATED)
        .id();

    let events = catalog
        .ctx
        .send(TestRequest::get(&format!(
            "/api/v1/calendars/{}/sub-calendars/{}/events",
            catalog.calendar_id, catalog.sub_calendar_id
        )))
        .await
        .assert_status(StatusCode::OK)
        .json();

    let events = events.as_array().expect("array of events");
    assert_eq!(events.len(), 2);
    for event in events {
        let id = event["id"].as_i64().expect("event id");
        let fields = &event["custom_event_fields"];
        if id == with_values {
            assert_eq!(fields[catalog.text.to_string()]["value"], "Hall B");
        } else {
            assert_eq!(id, without_values);
            assert_eq!(fields, &json!({}));
        }
    }
}
