//! Query builders for custom event fields, their options and stored values.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::query::calendar;
use crate::db::schema::{custom_event_field, custom_event_field_option, custom_event_field_value};
use crate::model::custom_field::{
    CustomEventField, CustomEventFieldChangeset, CustomEventFieldOption, CustomEventFieldValue,
    LoadedFieldValue, NewCustomEventField, NewCustomEventFieldOption, NewCustomEventFieldValue,
};

/// ## Summary
/// Returns a query selecting the fields whose calendar is owned by a user.
#[must_use]
pub fn owned_by(user_id: i64) -> custom_event_field::BoxedQuery<'static, diesel::pg::Pg> {
    custom_event_field::table
        .filter(custom_event_field::calendar_id.eq_any(calendar::owned_ids(user_id)))
        .into_boxed()
}

/// ## Summary
/// Returns a query selecting the options of a field in creation order.
#[must_use]
pub fn options_of(field_id: i64) -> custom_event_field_option::BoxedQuery<'static, diesel::pg::Pg> {
    custom_event_field_option::table
        .filter(custom_event_field_option::custom_event_field_id.eq(field_id))
        .order(custom_event_field_option::id.asc())
        .into_boxed()
}

/// ## Summary
/// Finds a field by ID if its calendar is owned by `user_id`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_owned(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    id: i64,
) -> QueryResult<Option<CustomEventField>> {
    owned_by(user_id)
        .filter(custom_event_field::id.eq(id))
        .select(CustomEventField::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Lists a user's fields, newest first, optionally restricted to one calendar.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_owned(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    calendar_id: Option<i64>,
) -> QueryResult<Vec<CustomEventField>> {
    let mut query = owned_by(user_id);
    if let Some(calendar_id) = calendar_id {
        query = query.filter(custom_event_field::calendar_id.eq(calendar_id));
    }

    query
        .order(custom_event_field::id.desc())
        .select(CustomEventField::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads the fields of one calendar whose ids are among `ids`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_calendar_and_ids(
    conn: &mut DbConnection<'_>,
    calendar_id: i64,
    ids: &[i64],
) -> QueryResult<Vec<CustomEventField>> {
    custom_event_field::table
        .filter(custom_event_field::calendar_id.eq(calendar_id))
        .filter(custom_event_field::id.eq_any(ids))
        .select(CustomEventField::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads the options of every field in `field_ids`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn options_for_fields(
    conn: &mut DbConnection<'_>,
    field_ids: &[i64],
) -> QueryResult<Vec<CustomEventFieldOption>> {
    custom_event_field_option::table
        .filter(custom_event_field_option::custom_event_field_id.eq_any(field_ids))
        .order(custom_event_field_option::id.asc())
        .select(CustomEventFieldOption::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Counts how many of `option_ids` are options of `field_id`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn count_options_of_field(
    conn: &mut DbConnection<'_>,
    field_id: i64,
    option_ids: &[i64],
) -> QueryResult<i64> {
    custom_event_field_option::table
        .filter(custom_event_field_option::custom_event_field_id.eq(field_id))
        .filter(custom_event_field_option::id.eq_any(option_ids))
        .count()
        .get_result(conn)
        .await
}

/// ## Summary
/// Inserts a field and returns it.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create(
    conn: &mut DbConnection<'_>,
    new: &NewCustomEventField<'_>,
) -> QueryResult<CustomEventField> {
    diesel::insert_into(custom_event_field::table)
        .values(new)
        .returning(CustomEventField::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Applies a changeset to a field and returns the updated row.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: i64,
    changes: &CustomEventFieldChangeset,
) -> QueryResult<CustomEventField> {
    diesel::update(custom_event_field::table.filter(custom_event_field::id.eq(id)))
        .set(changes)
        .returning(CustomEventField::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes a field. Its options and values cascade.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete(conn: &mut DbConnection<'_>, id: i64) -> QueryResult<usize> {
    diesel::delete(custom_event_field::table.filter(custom_event_field::id.eq(id)))
        .execute(conn)
        .await
}

/// ## Summary
/// Inserts options and returns them in insertion order.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_options(
    conn: &mut DbConnection<'_>,
    new: &[NewCustomEventFieldOption<'_>],
) -> QueryResult<Vec<CustomEventFieldOption>> {
    if new.is_empty() {
        return Ok(Vec::new());
    }

    diesel::insert_into(custom_event_field_option::table)
        .values(new)
        .returning(CustomEventFieldOption::as_returning())
        .get_results(conn)
        .await
}

/// ## Summary
/// Renames an option of `field_id`. Returns the number of rows touched.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn rename_option(
    conn: &mut DbConnection<'_>,
    field_id: i64,
    option_id: i64,
    name: &str,
) -> QueryResult<usize> {
    diesel::update(
        custom_event_field_option::table
            .filter(custom_event_field_option::id.eq(option_id))
            .filter(custom_event_field_option::custom_event_field_id.eq(field_id)),
    )
    .set((
        custom_event_field_option::name.eq(name),
        custom_event_field_option::updated_at.eq(Utc::now()),
    ))
    .execute(conn)
    .await
}

/// ## Summary
/// Deletes every option of `field_id` whose id is not in `keep`.
/// Values referencing a deleted option cascade.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_options_except(
    conn: &mut DbConnection<'_>,
    field_id: i64,
    keep: &[i64],
) -> QueryResult<usize> {
    diesel::delete(
        custom_event_field_option::table
            .filter(custom_event_field_option::custom_event_field_id.eq(field_id))
            .filter(custom_event_field_option::id.ne_all(keep)),
    )
    .execute(conn)
    .await
}

/// ## Summary
/// Counts the stored values of a field across all events.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn count_values_of_field(conn: &mut DbConnection<'_>, field_id: i64) -> QueryResult<i64> {
    custom_event_field_value::table
        .filter(custom_event_field_value::custom_event_field_id.eq(field_id))
        .count()
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes every stored value of one field for one event.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_values(
    conn: &mut DbConnection<'_>,
    event_id: i64,
    field_id: i64,
) -> QueryResult<usize> {
    diesel::delete(
        custom_event_field_value::table
            .filter(custom_event_field_value::event_id.eq(event_id))
            .filter(custom_event_field_value::custom_event_field_id.eq(field_id)),
    )
    .execute(conn)
    .await
}

/// ## Summary
/// Inserts value rows.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert_values(
    conn: &mut DbConnection<'_>,
    rows: &[NewCustomEventFieldValue],
) -> QueryResult<usize> {
    if rows.is_empty() {
        return Ok(0);
    }

    diesel::insert_into(custom_event_field_value::table)
        .values(rows)
        .execute(conn)
        .await
}

/// ## Summary
/// Loads the stored values of the given events with their field definitions and
/// referenced options, in insertion order.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn load_values_for_events(
    conn: &mut DbConnection<'_>,
    event_ids: &[i64],
) -> QueryResult<Vec<LoadedFieldValue>> {
    if event_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = custom_event_field_value::table
        .inner_join(custom_event_field::table)
        .left_join(
            custom_event_field_option::table.on(custom_event_field_value::custom_event_field_option_id
                .eq(custom_event_field_option::id.nullable())),
        )
        .filter(custom_event_field_value::event_id.eq_any(event_ids))
        .order(custom_event_field_value::id.asc())
        .select((
            CustomEventFieldValue::as_select(),
            CustomEventField::as_select(),
            Option::<CustomEventFieldOption>::as_select(),
        ))
        .load::<(CustomEventFieldValue, CustomEventField, Option<CustomEventFieldOption>)>(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(value, field, option)| LoadedFieldValue {
            value,
            field,
            option,
        })
        .collect())
}
