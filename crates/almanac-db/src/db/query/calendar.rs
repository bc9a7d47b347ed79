//! Query builders for calendars.

use diesel::dsl;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::calendar;
use crate::model::calendar::{Calendar, CalendarChangeset, NewCalendar};

/// ## Summary
/// Returns a query selecting the calendars owned by a user.
#[must_use]
pub fn owned_by(user_id: i64) -> calendar::BoxedQuery<'static, diesel::pg::Pg> {
    calendar::table
        .filter(calendar::user_id.eq(user_id))
        .into_boxed()
}

pub type OwnedIds =
    dsl::Filter<dsl::Select<calendar::table, calendar::id>, dsl::Eq<calendar::user_id, i64>>;

/// ## Summary
/// Returns a query selecting only the ids of the calendars owned by a user.
///
/// Used as a subselect by the ownership builders of child tables.
#[must_use]
pub fn owned_ids(user_id: i64) -> OwnedIds {
    calendar::table
        .select(calendar::id)
        .filter(calendar::user_id.eq(user_id))
}

/// ## Summary
/// Finds a calendar by ID if it is owned by `user_id`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_owned(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    id: i64,
) -> QueryResult<Option<Calendar>> {
    owned_by(user_id)
        .filter(calendar::id.eq(id))
        .select(Calendar::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Lists a user's calendars, newest first.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_owned(conn: &mut DbConnection<'_>, user_id: i64) -> QueryResult<Vec<Calendar>> {
    owned_by(user_id)
        .order(calendar::id.desc())
        .select(Calendar::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts a calendar and returns it.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create(conn: &mut DbConnection<'_>, new: &NewCalendar<'_>) -> QueryResult<Calendar> {
    diesel::insert_into(calendar::table)
        .values(new)
        .returning(Calendar::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Applies a changeset to a calendar and returns the updated row.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: i64,
    changes: &CalendarChangeset,
) -> QueryResult<Calendar> {
    diesel::update(calendar::table.filter(calendar::id.eq(id)))
        .set(changes)
        .returning(Calendar::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes a calendar. Sub-calendars, events, fields and keys cascade.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete(conn: &mut DbConnection<'_>, id: i64) -> QueryResult<usize> {
    diesel::delete(calendar::table.filter(calendar::id.eq(id)))
        .execute(conn)
        .await
}
