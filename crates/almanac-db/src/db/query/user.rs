//! Query builders for users and bearer tokens.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{api_token, app_user};
use crate::model::user::{ApiToken, NewApiToken, NewUser, User};

/// ## Summary
/// Returns a query to find a user by ID.
#[must_use]
pub fn by_id(id: i64) -> app_user::BoxedQuery<'static, diesel::pg::Pg> {
    app_user::table.filter(app_user::id.eq(id)).into_boxed()
}

/// ## Summary
/// Returns a query to find a user by email address.
///
/// Emails are stored lowercased; the lookup lowercases its input to match.
#[must_use]
pub fn by_email(email: &str) -> app_user::BoxedQuery<'static, diesel::pg::Pg> {
    app_user::table
        .filter(app_user::email.eq(email.to_lowercase()))
        .into_boxed()
}

/// ## Summary
/// Returns a query to find a token by the digest of its plaintext.
#[must_use]
pub fn token_by_hash(token_hash: &str) -> api_token::BoxedQuery<'static, diesel::pg::Pg> {
    api_token::table
        .filter(api_token::token_hash.eq(token_hash.to_owned()))
        .into_boxed()
}

/// ## Summary
/// Inserts a user and returns it.
///
/// ## Errors
/// Returns a database error if the insert fails, including unique violations on email.
pub async fn create_user(conn: &mut DbConnection<'_>, new_user: &NewUser<'_>) -> QueryResult<User> {
    diesel::insert_into(app_user::table)
        .values(new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Inserts a token row and returns it.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_token(
    conn: &mut DbConnection<'_>,
    new_token: &NewApiToken<'_>,
) -> QueryResult<ApiToken> {
    diesel::insert_into(api_token::table)
        .values(new_token)
        .returning(ApiToken::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Resolves a token digest to its token row and owning user.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_user_by_token_hash(
    conn: &mut DbConnection<'_>,
    token_hash: &str,
) -> QueryResult<Option<(ApiToken, User)>> {
    token_by_hash(token_hash)
        .inner_join(app_user::table)
        .select((ApiToken::as_select(), User::as_select()))
        .first::<(ApiToken, User)>(conn)
        .await
        .optional()
}

/// ## Summary
/// Records that a token was just used.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn touch_token(conn: &mut DbConnection<'_>, token_id: i64) -> QueryResult<()> {
    diesel::update(api_token::table.filter(api_token::id.eq(token_id)))
        .set(api_token::last_used_at.eq(Some(Utc::now())))
        .execute(conn)
        .await?;
    Ok(())
}

/// ## Summary
/// Deletes a token.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_token(conn: &mut DbConnection<'_>, token_id: i64) -> QueryResult<usize> {
    diesel::delete(api_token::table.filter(api_token::id.eq(token_id)))
        .execute(conn)
        .await
}
