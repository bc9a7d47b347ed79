//! Account registration, login and logout.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};

use almanac_core::constants::MIN_PASSWORD_LENGTH;
use almanac_db::db::connection::DbConnection;
use almanac_db::db::query::user as user_query;
use almanac_db::model::user::{NewApiToken, NewUser, User};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{generate_api_token, token_digest};
use crate::error::{ServiceError, ServiceResult, ValidationErrors};
use crate::validation;

const TOKEN_NAME: &str = "auth_token";
const BAD_CREDENTIALS: &str = "The provided credentials are incorrect.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A user together with a freshly issued plaintext token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub user: User,
    pub token: String,
}

async fn issue_token(conn: &mut DbConnection<'_>, user: User) -> ServiceResult<IssuedToken> {
    let token = generate_api_token();
    let digest = token_digest(&token);
    user_query::create_token(
        conn,
        &NewApiToken {
            user_id: user.id,
            name: TOKEN_NAME,
            token_hash: &digest,
        },
    )
    .await?;

    Ok(IssuedToken { user, token })
}

fn check_password(errors: &mut ValidationErrors, input: &RegisterInput) {
    match input.password.as_deref() {
        None | Some("") => errors.add("password", "The password field is required."),
        Some(password) => {
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                errors.add(
                    "password",
                    format!("The password field must be at least {MIN_PASSWORD_LENGTH} characters."),
                );
            }
            if input.password_confirmation.as_deref() != Some(password) {
                errors.add("password", "The password field confirmation does not match.");
            }
        }
    }
}

/// ## Summary
/// Creates an account and issues its first bearer token.
///
/// ## Side Effects
/// - Inserts a user row
/// - Inserts a token row
///
/// ## Errors
/// Returns `ServiceError::Validation` if a field is invalid or the email is taken.
#[tracing::instrument(skip(conn, input))]
pub async fn register(
    conn: &mut DbConnection<'_>,
    input: &RegisterInput,
) -> ServiceResult<IssuedToken> {
    let mut errors = ValidationErrors::new();
    let name = validation::required_name(&mut errors, "name", input.name.as_deref());

    let email = input.email.as_deref().map(str::trim).unwrap_or_default().to_lowercase();
    if email.is_empty() {
        errors.add("email", "The email field is required.");
    } else if validation::email(&mut errors, "email", &email)
        && validation::max_length(&mut errors, "email", &email)
        && user_query::by_email(&email)
            .select(User::as_select())
            .first::<User>(conn)
            .await
            .optional()?
            .is_some()
    {
        errors.add("email", "The email has already been taken.");
    }

    check_password(&mut errors, input);
    errors.into_result()?;

    let name = name.ok_or(ServiceError::InvariantViolation("validated name missing"))?;
    let password = input
        .password
        .as_deref()
        .ok_or(ServiceError::InvariantViolation("validated password missing"))?;
    let password_hash = hash_password(password)?;

    let user = user_query::create_user(
        conn,
        &NewUser {
            name,
            email: &email,
            password_hash: Some(&password_hash),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");
    issue_token(conn, user).await
}

/// ## Summary
/// Checks credentials and issues a new bearer token.
///
/// ## Errors
/// Returns `ServiceError::Validation` on `email` if the credentials do not match.
#[tracing::instrument(skip(conn, input))]
pub async fn login(conn: &mut DbConnection<'_>, input: &LoginInput) -> ServiceResult<IssuedToken> {
    let mut errors = ValidationErrors::new();
    let email = input.email.as_deref().map(str::trim).unwrap_or_default();
    let password = input.password.as_deref().unwrap_or_default();
    if email.is_empty() {
        errors.add("email", "The email field is required.");
    }
    if password.is_empty() {
        errors.add("password", "The password field is required.");
    }
    errors.into_result()?;

    let user = user_query::by_email(email)
        .select(User::as_select())
        .first::<User>(conn)
        .await
        .optional()?;

    let Some((user, password_hash)) = user.and_then(|user| {
        let hash = user.password_hash.clone()?;
        Some((user, hash))
    }) else {
        tracing::debug!("Login for unknown or password-less account");
        return Err(ServiceError::validation("email", BAD_CREDENTIALS));
    };

    match verify_password(password, &password_hash) {
        Ok(()) => {}
        Err(ServiceError::NotAuthenticated) => {
            return Err(ServiceError::validation("email", BAD_CREDENTIALS));
        }
        Err(e) => return Err(e),
    }

    tracing::info!(user_id = user.id, "User logged in");
    issue_token(conn, user).await
}

/// ## Summary
/// Revokes the bearer token used for the current request.
///
/// Single-user requests carry no token and this is a no-op for them.
///
/// ## Errors
/// Returns an error if the delete fails.
#[tracing::instrument(skip(conn))]
pub async fn logout(conn: &mut DbConnection<'_>, token_id: Option<i64>) -> ServiceResult<()> {
    if let Some(token_id) = token_id {
        user_query::delete_token(conn, token_id).await?;
    }
    Ok(())
}
