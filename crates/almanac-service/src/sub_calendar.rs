//! Sub-calendar service.

use chrono::Utc;
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use serde::Deserialize;

use almanac_core::constants::DEFAULT_SUB_CALENDAR_COLOR;
use almanac_db::db::connection::DbConnection;
use almanac_db::db::query::sub_calendar;
use almanac_db::model::calendar::Calendar;
use almanac_db::model::sub_calendar::{NewSubCalendar, SubCalendar, SubCalendarChangeset};

use crate::calendar::owned_calendar_from_input;
use crate::error::{ServiceError, ServiceResult, ValidationErrors};
use crate::validation;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubCalendarInput {
    pub calendar_id: Option<i64>,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub overlap: Option<bool>,
    pub color: Option<String>,
}

/// ## Summary
/// Lists the user's sub-calendars, optionally restricted to one calendar.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn list_sub_calendars(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    calendar_id: Option<i64>,
) -> ServiceResult<Vec<SubCalendar>> {
    Ok(sub_calendar::list_owned(conn, user_id, calendar_id).await?)
}

/// ## Summary
/// Creates a sub-calendar in `calendar`.
///
/// ## Errors
/// Returns `ServiceError::Validation` if the name or color is invalid.
#[tracing::instrument(skip(conn, calendar, input), fields(calendar_id = calendar.id))]
pub async fn create_sub_calendar(
    conn: &mut DbConnection<'_>,
    calendar: &Calendar,
    input: &SubCalendarInput,
) -> ServiceResult<SubCalendar> {
    let mut errors = ValidationErrors::new();
    let name = validation::required_name(&mut errors, "name", input.name.as_deref());
    let color = input.color.as_deref().unwrap_or(DEFAULT_SUB_CALENDAR_COLOR);
    validation::color(&mut errors, "color", color);
    errors.into_result()?;

    let name = name.ok_or(ServiceError::InvariantViolation("validated name missing"))?;
    let created = sub_calendar::create(
        conn,
        &NewSubCalendar {
            calendar_id: calendar.id,
            name,
            active: input.active.unwrap_or(true),
            overlap: input.overlap.unwrap_or(false),
            color,
        },
    )
    .await?;

    tracing::info!(sub_calendar_id = created.id, "Sub-calendar created");
    Ok(created)
}

/// ## Summary
/// Applies a partial update to an owned sub-calendar.
///
/// Moving it to another owned calendar is refused while any of its events has
/// custom field values, because those values reference the old calendar's
/// fields. A successful move drops the access-key permissions granted on it.
///
/// ## Errors
/// Returns `ServiceError::Validation` for invalid input or a blocked move.
#[tracing::instrument(skip(conn, existing, input), fields(sub_calendar_id = existing.id))]
pub async fn update_sub_calendar(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    existing: &SubCalendar,
    input: &SubCalendarInput,
) -> ServiceResult<SubCalendar> {
    let mut errors = ValidationErrors::new();
    let mut changes = SubCalendarChangeset {
        active: input.active,
        overlap: input.overlap,
        updated_at: Some(Utc::now()),
        ..SubCalendarChangeset::default()
    };

    if input.name.is_some() {
        changes.name = validation::required_name(&mut errors, "name", input.name.as_deref())
            .map(str::to_owned);
    }
    if let Some(color) = &input.color
        && validation::color(&mut errors, "color", color)
    {
        changes.color = Some(color.clone());
    }
    errors.into_result()?;

    if let Some(calendar_id) = input.calendar_id
        && calendar_id != existing.calendar_id
    {
        let target = owned_calendar_from_input(conn, user_id, Some(calendar_id)).await?;
        if sub_calendar::has_field_values(conn, existing.id).await? {
            return Err(ServiceError::validation(
                "calendar_id",
                "The calendar cannot be changed while events in this sub-calendar have custom field values.",
            ));
        }
        changes.calendar_id = Some(target.id);
    }

    let id = existing.id;
    let moving = changes.calendar_id.is_some();
    let updated = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                if moving {
                    let dropped = sub_calendar::delete_permissions(tx, id).await?;
                    tracing::debug!(dropped, "Dropped permissions of moved sub-calendar");
                }
                Ok(sub_calendar::update(tx, id, &changes).await?)
            }
            .scope_boxed()
        })
        .await?;

    Ok(updated)
}

/// ## Summary
/// Deletes an owned sub-calendar. Its events and permissions cascade.
///
/// ## Errors
/// Returns an error if the delete fails.
#[tracing::instrument(skip(conn, existing), fields(sub_calendar_id = existing.id))]
pub async fn delete_sub_calendar(
    conn: &mut DbConnection<'_>,
    existing: &SubCalendar,
) -> ServiceResult<()> {
    sub_calendar::delete(conn, existing.id).await?;
    tracing::info!("Sub-calendar deleted");
    Ok(())
}

/// ## Summary
/// Resolves a `sub_calendar_id` taken from a request body to a sub-calendar the user owns.
///
/// ## Errors
/// Returns `ServiceError::Validation` on `sub_calendar_id` if it is missing or not owned.
pub async fn owned_sub_calendar_from_input(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    sub_calendar_id: Option<i64>,
) -> ServiceResult<SubCalendar> {
    let Some(sub_calendar_id) = sub_calendar_id else {
        return Err(ServiceError::validation(
            "sub_calendar_id",
            "The sub_calendar_id field is required.",
        ));
    };

    sub_calendar::find_owned(conn, user_id, sub_calendar_id)
        .await?
        .ok_or_else(|| {
            ServiceError::validation("sub_calendar_id", "The selected sub_calendar_id is invalid.")
        })
}
