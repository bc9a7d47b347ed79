//! Calendar service.

use serde::Deserialize;

use almanac_core::constants::DEFAULT_TIMEZONE;
use almanac_db::db::connection::DbConnection;
use almanac_db::db::query::calendar;
use almanac_db::model::calendar::{Calendar, CalendarChangeset, NewCalendar};

use crate::error::{ServiceError, ServiceResult, ValidationErrors};
use crate::validation;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarInput {
    pub name: Option<String>,
    pub timezone: Option<String>,
}

/// ## Summary
/// Lists the user's calendars, newest first.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn list_calendars(
    conn: &mut DbConnection<'_>,
    user_id: i64,
) -> ServiceResult<Vec<Calendar>> {
    Ok(calendar::list_owned(conn, user_id).await?)
}

/// ## Summary
/// Creates a calendar for the user.
///
/// ## Errors
/// Returns `ServiceError::Validation` if the name or timezone is invalid.
#[tracing::instrument(skip(conn, input))]
pub async fn create_calendar(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    input: &CalendarInput,
) -> ServiceResult<Calendar> {
    let mut errors = ValidationErrors::new();
    let name = validation::required_name(&mut errors, "name", input.name.as_deref());
    let timezone = input.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE);
    validation::timezone(&mut errors, "timezone", timezone);
    errors.into_result()?;

    let name = name.ok_or(ServiceError::InvariantViolation("validated name missing"))?;
    let created = calendar::create(
        conn,
        &NewCalendar {
            user_id,
            name,
            timezone,
        },
    )
    .await?;

    tracing::info!(calendar_id = created.id, "Calendar created");
    Ok(created)
}

/// ## Summary
/// Applies a partial update to an owned calendar.
///
/// ## Errors
/// Returns `ServiceError::Validation` if a supplied value is invalid.
#[tracing::instrument(skip(conn, existing, input), fields(calendar_id = existing.id))]
pub async fn update_calendar(
    conn: &mut DbConnection<'_>,
    existing: &Calendar,
    input: &CalendarInput,
) -> ServiceResult<Calendar> {
    let mut errors = ValidationErrors::new();
    let mut changes = CalendarChangeset {
        updated_at: Some(chrono::Utc::now()),
        ..CalendarChangeset::default()
    };

    if input.name.is_some() {
        changes.name = validation::required_name(&mut errors, "name", input.name.as_deref())
            .map(str::to_owned);
    }
    if let Some(timezone) = &input.timezone
        && validation::timezone(&mut errors, "timezone", timezone)
    {
        changes.timezone = Some(timezone.clone());
    }
    errors.into_result()?;

    Ok(calendar::update(conn, existing.id, &changes).await?)
}

/// ## Summary
/// Deletes an owned calendar and everything beneath it.
///
/// ## Errors
/// Returns an error if the delete fails.
#[tracing::instrument(skip(conn, existing), fields(calendar_id = existing.id))]
pub async fn delete_calendar(conn: &mut DbConnection<'_>, existing: &Calendar) -> ServiceResult<()> {
    calendar::delete(conn, existing.id).await?;
    tracing::info!("Calendar deleted");
    Ok(())
}

/// ## Summary
/// Resolves a `calendar_id` taken from a request body to a calendar the user owns.
///
/// ## Errors
/// Returns `ServiceError::Validation` on `calendar_id` if it is missing or not owned.
pub async fn owned_calendar_from_input(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    calendar_id: Option<i64>,
) -> ServiceResult<Calendar> {
    let Some(calendar_id) = calendar_id else {
        return Err(ServiceError::validation(
            "calendar_id",
            "The calendar_id field is required.",
        ));
    };

    calendar::find_owned(conn, user_id, calendar_id)
        .await?
        .ok_or_else(|| {
            ServiceError::validation("calendar_id", "The selected calendar_id is invalid.")
        })
}

