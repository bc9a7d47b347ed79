//! Query builders for access keys and their sub-calendar permissions.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::query::calendar;
use crate::db::schema::{access_key, sub_calendar_permission};
use crate::model::access_key::{
    AccessKey, AccessKeyChangeset, NewAccessKey, NewSubCalendarPermission, SubCalendarPermission,
};

/// ## Summary
/// Returns a query selecting the access keys whose calendar is owned by a user.
#[must_use]
pub fn owned_by(user_id: i64) -> access_key::BoxedQuery<'static, diesel::pg::Pg> {
    access_key::table
        .filter(access_key::calendar_id.eq_any(calendar::owned_ids(user_id)))
        .into_boxed()
}

/// ## Summary
/// Finds an access key by ID if its calendar is owned by `user_id`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_owned(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    id: i64,
) -> QueryResult<Option<AccessKey>> {
    owned_by(user_id)
        .filter(access_key::id.eq(id))
        .select(AccessKey::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Lists a user's access keys, newest first, optionally restricted to one calendar.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_owned(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    calendar_id: Option<i64>,
) -> QueryResult<Vec<AccessKey>> {
    let mut query = owned_by(user_id);
    if let Some(calendar_id) = calendar_id {
        query = query.filter(access_key::calendar_id.eq(calendar_id));
    }

    query
        .order(access_key::id.desc())
        .select(AccessKey::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts an access key and returns it.
///
/// ## Errors
/// Returns a database error if the insert fails, including a key collision.
pub async fn create(conn: &mut DbConnection<'_>, new: &NewAccessKey) -> QueryResult<AccessKey> {
    diesel::insert_into(access_key::table)
        .values(new)
        .returning(AccessKey::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Applies a changeset to an access key and returns the updated row.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: i64,
    changes: &AccessKeyChangeset,
) -> QueryResult<AccessKey> {
    diesel::update(access_key::table.filter(access_key::id.eq(id)))
        .set(changes)
        .returning(AccessKey::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes an access key. Its permissions cascade.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete(conn: &mut DbConnection<'_>, id: i64) -> QueryResult<usize> {
    diesel::delete(access_key::table.filter(access_key::id.eq(id)))
        .execute(conn)
        .await
}

/// ## Summary
/// Loads the permissions of every key in `key_ids`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn permissions_for_keys(
    conn: &mut DbConnection<'_>,
    key_ids: &[i64],
) -> QueryResult<Vec<SubCalendarPermission>> {
    sub_calendar_permission::table
        .filter(sub_calendar_permission::access_key_id.eq_any(key_ids))
        .order(sub_calendar_permission::id.asc())
        .select(SubCalendarPermission::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Replaces the full permission set of a key.
///
/// ## Errors
/// Returns a database error if the delete or insert fails.
pub async fn replace_permissions(
    conn: &mut DbConnection<'_>,
    key_id: i64,
    permissions: &[NewSubCalendarPermission],
) -> QueryResult<Vec<SubCalendarPermission>> {
    diesel::delete(
        sub_calendar_permission::table.filter(sub_calendar_permission::access_key_id.eq(key_id)),
    )
    .execute(conn)
    .await?;

    if permissions.is_empty() {
        return Ok(Vec::new());
    }

    diesel::insert_into(sub_calendar_permission::table)
        .values(permissions)
        .returning(SubCalendarPermission::as_returning())
        .get_results(conn)
        .await
}
