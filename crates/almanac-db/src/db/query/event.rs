//! Query builders for events.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::query::{calendar, sub_calendar};
use crate::db::schema::{custom_event_field_value, event, sub_calendar as sub_calendar_table};
use crate::model::event::{Event, EventChangeset, NewEvent};

/// Optional restrictions applied when listing events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub calendar_id: Option<i64>,
    pub sub_calendar_id: Option<i64>,
    /// Keep events ending at or after this instant.
    pub start: Option<DateTime<Utc>>,
    /// Keep events starting at or before this instant.
    pub end: Option<DateTime<Utc>>,
}

/// ## Summary
/// Returns a query selecting the events whose calendar is owned by a user.
#[must_use]
pub fn owned_by(user_id: i64) -> event::BoxedQuery<'static, diesel::pg::Pg> {
    event::table
        .filter(event::sub_calendar_id.eq_any(sub_calendar::owned_ids(user_id)))
        .into_boxed()
}

/// ## Summary
/// Finds an event by ID if its calendar is owned by `user_id`, together with
/// the id of that calendar.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_owned(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    id: i64,
) -> QueryResult<Option<(Event, i64)>> {
    event::table
        .inner_join(sub_calendar_table::table)
        .filter(event::id.eq(id))
        .filter(sub_calendar_table::calendar_id.eq_any(calendar::owned_ids(user_id)))
        .select((Event::as_select(), sub_calendar_table::calendar_id))
        .first::<(Event, i64)>(conn)
        .await
        .optional()
}

/// ## Summary
/// Lists a user's events, newest first, each with the id of its calendar.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_owned(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    filter: EventFilter,
) -> QueryResult<Vec<(Event, i64)>> {
    let mut query = event::table
        .inner_join(sub_calendar_table::table)
        .filter(sub_calendar_table::calendar_id.eq_any(calendar::owned_ids(user_id)))
        .select((Event::as_select(), sub_calendar_table::calendar_id))
        .into_boxed();

    if let Some(calendar_id) = filter.calendar_id {
        query = query.filter(sub_calendar_table::calendar_id.eq(calendar_id));
    }
    if let Some(sub_calendar_id) = filter.sub_calendar_id {
        query = query.filter(event::sub_calendar_id.eq(sub_calendar_id));
    }
    if let Some(start) = filter.start {
        query = query.filter(event::end_date.ge(start));
    }
    if let Some(end) = filter.end {
        query = query.filter(event::start_date.le(end));
    }

    query
        .order(event::id.desc())
        .load::<(Event, i64)>(conn)
        .await
}

/// ## Summary
/// Inserts an event and returns it.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create(conn: &mut DbConnection<'_>, new: &NewEvent) -> QueryResult<Event> {
    diesel::insert_into(event::table)
        .values(new)
        .returning(Event::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Applies a changeset to an event and returns the updated row.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: i64,
    changes: &EventChangeset,
) -> QueryResult<Event> {
    diesel::update(event::table.filter(event::id.eq(id)))
        .set(changes)
        .returning(Event::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes an event. Its custom field values cascade.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete(conn: &mut DbConnection<'_>, id: i64) -> QueryResult<usize> {
    diesel::delete(event::table.filter(event::id.eq(id)))
        .execute(conn)
        .await
}

/// ## Summary
/// Deletes every custom field value stored for an event.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_field_values(conn: &mut DbConnection<'_>, id: i64) -> QueryResult<usize> {
    diesel::delete(
        custom_event_field_value::table.filter(custom_event_field_value::event_id.eq(id)),
    )
    .execute(conn)
    .await
}
