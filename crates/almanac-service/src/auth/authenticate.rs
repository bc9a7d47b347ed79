use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use almanac_core::config::{AuthMethod, Settings};
use almanac_db::db::connection::DbConnection;
use almanac_db::db::query::user as user_query;
use almanac_db::model::user::{NewUser, User};

use crate::auth::token::token_digest;
use crate::error::{ServiceError, ServiceResult};

/// Outcome of a successful authentication.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    /// The bearer token row used for the request, absent in single-user mode.
    pub token_id: Option<i64>,
}

/// Get the user configured in settings for single user authentication.
///
/// If it doesn't exist, insert it into the database.
///
/// ## Errors
///
/// Returns an error if the user cannot be created or retrieved from the database.
#[tracing::instrument(skip(conn, config))]
async fn authenticate_single_user(
    conn: &mut DbConnection<'_>,
    config: &Settings,
) -> ServiceResult<User> {
    let single_user = config
        .auth
        .single_user
        .as_ref()
        .ok_or(ServiceError::InvalidConfiguration(
            "Single user config is missing".to_string(),
        ))?;

    if let Some(user) = user_query::by_email(&single_user.email)
        .select(User::as_select())
        .first::<User>(conn)
        .await
        .optional()?
    {
        return Ok(user);
    }

    let email = single_user.email.to_lowercase();
    let user = user_query::create_user(
        conn,
        &NewUser {
            name: &single_user.name,
            email: &email,
            password_hash: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, user_email = %user.email, "Single user created");
    Ok(user)
}

/// ## Summary
/// Resolves `Authorization: Bearer <token>` to its user and marks the token used.
///
/// ## Errors
/// Returns `NotAuthenticated` if the header is missing, malformed, or names an
/// unknown token.
#[tracing::instrument(skip(req, conn))]
async fn authenticate_token(
    req: &salvo::Request,
    conn: &mut DbConnection<'_>,
) -> ServiceResult<Authenticated> {
    let token = req
        .headers()
        .get(salvo::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(ServiceError::NotAuthenticated)?;

    let (api_token, user) = user_query::find_user_by_token_hash(conn, &token_digest(token))
        .await?
        .ok_or_else(|| {
            tracing::debug!("Unknown bearer token");
            ServiceError::NotAuthenticated
        })?;

    user_query::touch_token(conn, api_token.id).await?;

    Ok(Authenticated {
        user,
        token_id: Some(api_token.id),
    })
}

/// Extracts the credential from a `Bearer` authorization value.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// ## Summary
/// Authenticate a request based on the configured authentication method.
///
/// ## Errors
/// Returns an error if authentication fails.
#[tracing::instrument(skip(req, conn, config))]
pub async fn authenticate(
    req: &salvo::Request,
    conn: &mut DbConnection<'_>,
    config: &Settings,
) -> ServiceResult<Authenticated> {
    tracing::trace!(auth_method = ?config.auth.method, "Authenticating request");

    match config.auth.method {
        AuthMethod::SingleUser => Ok(Authenticated {
            user: authenticate_single_user(conn, config).await?,
            token_id: None,
        }),
        AuthMethod::Token => authenticate_token(req, conn).await,
    }
}
