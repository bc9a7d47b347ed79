//! Query builders for sub-calendars.

use diesel::dsl;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::query::calendar;
use crate::db::schema::{custom_event_field_value, event, sub_calendar, sub_calendar_permission};
use crate::model::sub_calendar::{NewSubCalendar, SubCalendar, SubCalendarChangeset};

pub type OwnedIds = dsl::Filter<
    dsl::Select<sub_calendar::table, sub_calendar::id>,
    dsl::EqAny<sub_calendar::calendar_id, calendar::OwnedIds>,
>;

/// ## Summary
/// Returns a query selecting the sub-calendars whose calendar is owned by a user.
#[must_use]
pub fn owned_by(user_id: i64) -> sub_calendar::BoxedQuery<'static, diesel::pg::Pg> {
    sub_calendar::table
        .filter(sub_calendar::calendar_id.eq_any(calendar::owned_ids(user_id)))
        .into_boxed()
}

/// ## Summary
/// Returns a query selecting only the ids of the sub-calendars owned by a user.
#[must_use]
pub fn owned_ids(user_id: i64) -> OwnedIds {
    sub_calendar::table
        .select(sub_calendar::id)
        .filter(sub_calendar::calendar_id.eq_any(calendar::owned_ids(user_id)))
}

/// ## Summary
/// Finds a sub-calendar by ID if its calendar is owned by `user_id`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_owned(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    id: i64,
) -> QueryResult<Option<SubCalendar>> {
    owned_by(user_id)
        .filter(sub_calendar::id.eq(id))
        .select(SubCalendar::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Lists a user's sub-calendars, newest first, optionally restricted to one calendar.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_owned(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    calendar_id: Option<i64>,
) -> QueryResult<Vec<SubCalendar>> {
    let mut query = owned_by(user_id);
    if let Some(calendar_id) = calendar_id {
        query = query.filter(sub_calendar::calendar_id.eq(calendar_id));
    }

    query
        .order(sub_calendar::id.desc())
        .select(SubCalendar::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Lists the sub-calendars of a calendar that are among `ids`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_in_calendar(
    conn: &mut DbConnection<'_>,
    calendar_id: i64,
    ids: &[i64],
) -> QueryResult<Vec<SubCalendar>> {
    sub_calendar::table
        .filter(sub_calendar::calendar_id.eq(calendar_id))
        .filter(sub_calendar::id.eq_any(ids))
        .select(SubCalendar::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts a sub-calendar and returns it.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create(
    conn: &mut DbConnection<'_>,
    new: &NewSubCalendar<'_>,
) -> QueryResult<SubCalendar> {
    diesel::insert_into(sub_calendar::table)
        .values(new)
        .returning(SubCalendar::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Applies a changeset to a sub-calendar and returns the updated row.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: i64,
    changes: &SubCalendarChangeset,
) -> QueryResult<SubCalendar> {
    diesel::update(sub_calendar::table.filter(sub_calendar::id.eq(id)))
        .set(changes)
        .returning(SubCalendar::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes a sub-calendar. Events and permissions cascade.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete(conn: &mut DbConnection<'_>, id: i64) -> QueryResult<usize> {
    diesel::delete(sub_calendar::table.filter(sub_calendar::id.eq(id)))
        .execute(conn)
        .await
}

/// ## Summary
/// Whether any event of the sub-calendar carries custom field values.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn has_field_values(conn: &mut DbConnection<'_>, id: i64) -> QueryResult<bool> {
    diesel::select(dsl::exists(
        custom_event_field_value::table.filter(
            custom_event_field_value::event_id.eq_any(
                event::table
                    .select(event::id)
                    .filter(event::sub_calendar_id.eq(id)),
            ),
        ),
    ))
    .get_result(conn)
    .await
}

/// ## Summary
/// Removes every access-key permission granted on the sub-calendar.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_permissions(conn: &mut DbConnection<'_>, id: i64) -> QueryResult<usize> {
    diesel::delete(
        sub_calendar_permission::table.filter(sub_calendar_permission::sub_calendar_id.eq(id)),
    )
    .execute(conn)
    .await
}
