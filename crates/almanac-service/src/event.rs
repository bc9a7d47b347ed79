//! Event service.
//!
//! Creates and updates run the event write and the custom field reconciliation
//! in one transaction, so a rejected `custom_event_field_values` payload leaves
//! neither the event row nor any stored value changed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use almanac_core::util::serde::double_option;
use almanac_db::db::connection::DbConnection;
use almanac_db::db::query::custom_field as field_query;
use almanac_db::db::query::event::{self as event_query, EventFilter};
use almanac_db::model::custom_field::LoadedFieldValue;
use almanac_db::model::event::{Event, EventChangeset, NewEvent};
use almanac_db::model::sub_calendar::SubCalendar;

use crate::custom_field::{FIELD_VALUES_KEY, ShapedFields, reconcile, shape_field_values};
use crate::error::{ServiceError, ServiceResult, ValidationErrors};
use crate::scope::ScopedEvent;
use crate::sub_calendar::owned_sub_calendar_from_input;
use crate::validation;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInput {
    pub sub_calendar_id: Option<i64>,
    pub title: Option<String>,
    pub all_day: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub rrule: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub about: Option<Option<String>>,
    #[serde(default, rename = "where", deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub who: Option<Option<String>>,
    /// Absent leaves stored values untouched; present must be an array.
    #[serde(
        default,
        alias = "customEventFieldValues",
        deserialize_with = "double_option"
    )]
    pub custom_event_field_values: Option<Option<Value>>,
}

/// Query string of the event list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    pub calendar_id: Option<i64>,
    pub sub_calendar_id: Option<i64>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    pub id: i64,
    pub calendar_id: i64,
    pub sub_calendar_id: i64,
    pub title: String,
    pub all_day: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rrule: Option<String>,
    pub about: Option<String>,
    #[serde(rename = "where")]
    pub location: Option<String>,
    pub who: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub custom_event_fields: ShapedFields,
}

impl EventView {
    #[must_use]
    pub fn new(event: Event, calendar_id: i64, custom_event_fields: ShapedFields) -> Self {
        Self {
            id: event.id,
            calendar_id,
            sub_calendar_id: event.sub_calendar_id,
            title: event.title,
            all_day: event.all_day,
            start_date: event.start_date,
            end_date: event.end_date,
            rrule: event.rrule,
            about: event.about,
            location: event.location,
            who: event.who,
            created_at: event.created_at,
            updated_at: event.updated_at,
            custom_event_fields,
        }
    }
}

/// Trims an optional text column; blank becomes `NULL`.
fn nullable_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Extracts the value rows from a present `custom_event_field_values` key,
/// recording an error if it is `null` or not an array.
fn field_value_rows<'a>(errors: &mut ValidationErrors, raw: Option<&'a Value>) -> Option<&'a [Value]> {
    if let Some(Value::Array(rows)) = raw {
        return Some(rows);
    }
    errors.add(
        FIELD_VALUES_KEY,
        "The custom_event_field_values field must be an array.",
    );
    None
}

fn check_rrule(
    errors: &mut ValidationErrors,
    rrule: Option<&str>,
    start: Option<DateTime<Utc>>,
) -> Option<String> {
    let rrule = nullable_text(rrule)?;
    if let Some(start) = start
        && !validation::rrule(errors, "rrule", &rrule, start)
    {
        return None;
    }
    Some(rrule)
}

async fn load_views(
    conn: &mut DbConnection<'_>,
    events: Vec<(Event, i64)>,
) -> ServiceResult<Vec<EventView>> {
    let ids: Vec<i64> = events.iter().map(|(event, _)| event.id).collect();
    let mut by_event: HashMap<i64, Vec<LoadedFieldValue>> = HashMap::new();
    for row in field_query::load_values_for_events(conn, &ids).await? {
        by_event.entry(row.value.event_id).or_default().push(row);
    }

    Ok(events
        .into_iter()
        .map(|(event, calendar_id)| {
            let fields = by_event
                .get(&event.id)
                .map(Vec::as_slice)
                .map(shape_field_values)
                .unwrap_or_default();
            EventView::new(event, calendar_id, fields)
        })
        .collect())
}

/// ## Summary
/// Parses the list query into an ownership-independent filter.
///
/// ## Errors
/// Returns `ServiceError::Validation` if `start` or `end` is not a date.
pub fn parse_filter(query: &EventQuery) -> ServiceResult<EventFilter> {
    let mut errors = ValidationErrors::new();
    let start = query
        .start
        .as_deref()
        .and_then(|raw| validation::date(&mut errors, "start", raw));
    let end = query
        .end
        .as_deref()
        .and_then(|raw| validation::date(&mut errors, "end", raw));
    errors.into_result()?;

    Ok(EventFilter {
        calendar_id: query.calendar_id,
        sub_calendar_id: query.sub_calendar_id,
        start,
        end,
    })
}

/// ## Summary
/// Lists the user's events with their custom field payloads.
///
/// ## Errors
/// Returns an error if a query fails.
pub async fn list_events(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    filter: EventFilter,
) -> ServiceResult<Vec<EventView>> {
    let events = event_query::list_owned(conn, user_id, filter).await?;
    load_views(conn, events).await
}

/// ## Summary
/// Builds the response view of a single owned event.
///
/// ## Errors
/// Returns an error if loading its values fails.
pub async fn show_event(
    conn: &mut DbConnection<'_>,
    scoped: &ScopedEvent,
) -> ServiceResult<EventView> {
    let mut views = load_views(conn, vec![(scoped.event.clone(), scoped.calendar_id)]).await?;
    views
        .pop()
        .ok_or(ServiceError::InvariantViolation("event view missing"))
}

/// ## Summary
/// Creates an event in `sub_calendar` and reconciles its custom field values.
///
/// ## Side Effects
/// Inserts the event row and its value rows in one transaction.
///
/// ## Errors
/// Returns `ServiceError::Validation` for invalid event fields or a rejected
/// `custom_event_field_values` payload. Nothing is written in either case.
#[tracing::instrument(skip(conn, sub_calendar, input), fields(sub_calendar_id = sub_calendar.id))]
pub async fn create_event(
    conn: &mut DbConnection<'_>,
    sub_calendar: &SubCalendar,
    input: &EventInput,
) -> ServiceResult<EventView> {
    let mut errors = ValidationErrors::new();
    let title = validation::required_name(&mut errors, "title", input.title.as_deref());
    let start = match input.start_date.as_deref() {
        Some(raw) => validation::date(&mut errors, "start_date", raw),
        None => {
            errors.add("start_date", "The start_date field is required.");
            None
        }
    };
    let end = match input.end_date.as_deref() {
        Some(raw) => validation::date(&mut errors, "end_date", raw),
        None => {
            errors.add("end_date", "The end_date field is required.");
            None
        }
    };
    if let (Some(start), Some(end)) = (start, end) {
        validation::date_order(&mut errors, start, end);
    }
    let rrule = check_rrule(&mut errors, input.rrule.as_ref().and_then(Option::as_deref), start);
    let rows = input
        .custom_event_field_values
        .as_ref()
        .and_then(|raw| field_value_rows(&mut errors, raw.as_ref()))
        .map(<[Value]>::to_vec);
    errors.into_result()?;

    let (Some(title), Some(start_date), Some(end_date)) = (title, start, end) else {
        return Err(ServiceError::InvariantViolation("validated event fields missing"));
    };

    let new_event = NewEvent {
        sub_calendar_id: sub_calendar.id,
        title: title.to_owned(),
        all_day: input.all_day.unwrap_or(false),
        start_date,
        end_date,
        rrule,
        about: nullable_text(input.about.as_ref().and_then(Option::as_deref)),
        location: nullable_text(input.location.as_ref().and_then(Option::as_deref)),
        who: nullable_text(input.who.as_ref().and_then(Option::as_deref)),
    };
    let calendar_id = sub_calendar.calendar_id;

    let event = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let event = event_query::create(tx, &new_event).await?;
                if let Some(rows) = &rows {
                    reconcile(tx, event.id, calendar_id, rows).await?;
                }
                Ok(event)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(event_id = event.id, "Event created");
    let mut views = load_views(conn, vec![(event, calendar_id)]).await?;
    views
        .pop()
        .ok_or(ServiceError::InvariantViolation("event view missing"))
}

/// ## Summary
/// Applies a partial update to an owned event.
///
/// A `sub_calendar_id` must name a sub-calendar the user owns. When the move
/// crosses into another calendar every stored value of the event is deleted
/// first, since they reference the old calendar's fields. Stored values are
/// otherwise only touched when `custom_event_field_values` is present.
///
/// ## Errors
/// Returns `ServiceError::Validation` for invalid fields or a rejected
/// `custom_event_field_values` payload, in which case nothing is written.
#[tracing::instrument(skip(conn, scoped, input), fields(event_id = scoped.event.id))]
pub async fn update_event(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    scoped: &ScopedEvent,
    input: &EventInput,
) -> ServiceResult<EventView> {
    let existing = &scoped.event;
    let mut errors = ValidationErrors::new();
    let mut changes = EventChangeset {
        all_day: input.all_day,
        updated_at: Some(Utc::now()),
        ..EventChangeset::default()
    };

    if input.title.is_some() {
        changes.title = validation::required_name(&mut errors, "title", input.title.as_deref())
            .map(str::to_owned);
    }
    if let Some(raw) = input.start_date.as_deref() {
        changes.start_date = validation::date(&mut errors, "start_date", raw);
    }
    if let Some(raw) = input.end_date.as_deref() {
        changes.end_date = validation::date(&mut errors, "end_date", raw);
    }
    let start = changes.start_date.unwrap_or(existing.start_date);
    let end = changes.end_date.unwrap_or(existing.end_date);
    if (changes.start_date.is_some() || changes.end_date.is_some())
        && errors.messages("start_date").is_empty()
        && errors.messages("end_date").is_empty()
    {
        validation::date_order(&mut errors, start, end);
    }
    if let Some(rrule) = &input.rrule {
        changes.rrule = Some(check_rrule(&mut errors, rrule.as_deref(), Some(start)));
    }
    changes.about = input.about.as_ref().map(|v| nullable_text(v.as_deref()));
    changes.location = input.location.as_ref().map(|v| nullable_text(v.as_deref()));
    changes.who = input.who.as_ref().map(|v| nullable_text(v.as_deref()));

    let rows = input
        .custom_event_field_values
        .as_ref()
        .and_then(|raw| field_value_rows(&mut errors, raw.as_ref()))
        .map(<[Value]>::to_vec);
    errors.into_result()?;

    let mut calendar_id = scoped.calendar_id;
    if let Some(sub_calendar_id) = input.sub_calendar_id
        && sub_calendar_id != existing.sub_calendar_id
    {
        let target = owned_sub_calendar_from_input(conn, user_id, Some(sub_calendar_id)).await?;
        changes.sub_calendar_id = Some(target.id);
        calendar_id = target.calendar_id;
    }
    let crosses_calendar = calendar_id != scoped.calendar_id;
    let event_id = existing.id;

    let event = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let event = event_query::update(tx, event_id, &changes).await?;
                if crosses_calendar {
                    let removed = event_query::delete_field_values(tx, event_id).await?;
                    tracing::debug!(removed, "Cleared values of event moved across calendars");
                }
                if let Some(rows) = &rows {
                    reconcile(tx, event_id, calendar_id, rows).await?;
                }
                Ok(event)
            }
            .scope_boxed()
        })
        .await?;

    let mut views = load_views(conn, vec![(event, calendar_id)]).await?;
    views
        .pop()
        .ok_or(ServiceError::InvariantViolation("event view missing"))
}

/// ## Summary
/// Deletes an owned event. Its stored values cascade.
///
/// ## Errors
/// Returns an error if the delete fails.
#[tracing::instrument(skip(conn, scoped), fields(event_id = scoped.event.id))]
pub async fn delete_event(conn: &mut DbConnection<'_>, scoped: &ScopedEvent) -> ServiceResult<()> {
    event_query::delete(conn, scoped.event.id).await?;
    tracing::info!("Event deleted");
    Ok(())
}
