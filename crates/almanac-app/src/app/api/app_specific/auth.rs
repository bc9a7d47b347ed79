use salvo::prelude::Json;
use salvo::{Depot, Request, Router, handler};

use almanac_service::auth::{
    IssuedToken, LoginInput, RegisterInput, get_token_id_from_depot, login, logout, register,
};

use crate::app::api::request::parse_body;
use crate::app::api::response::{Created, NoContent};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::middleware::auth::AuthMiddleware;

/// ## Summary
/// POST /api/auth/register - Creates an account and returns it with a bearer token.
///
/// ## Errors
/// Returns 422 if a field is invalid or the email is already registered.
#[handler]
async fn register_handler(req: &mut Request, depot: &mut Depot) -> AppResult<Created<IssuedToken>> {
    tracing::debug!("Processing user registration request");

    let input: RegisterInput = parse_body(req).await?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Created(register(&mut conn, &input).await?))
}

/// ## Summary
/// POST /api/auth/login - Exchanges email and password for a new bearer token.
///
/// ## Errors
/// Returns 422 on `email` if the credentials are incorrect.
#[handler]
async fn login_handler(req: &mut Request, depot: &mut Depot) -> AppResult<Json<IssuedToken>> {
    tracing::debug!("Processing login request");

    let input: LoginInput = parse_body(req).await?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(login(&mut conn, &input).await?))
}

/// ## Summary
/// POST /api/auth/logout - Revokes the bearer token that authenticated the request.
#[handler]
async fn logout_handler(depot: &mut Depot) -> AppResult<NoContent> {
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    logout(&mut conn, get_token_id_from_depot(depot)).await?;
    Ok(NoContent)
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(Router::with_path("register").post(register_handler))
        .push(Router::with_path("login").post(login_handler))
        .push(
            Router::with_path("logout")
                .hoop(AuthMiddleware)
                .post(logout_handler),
        )
}
