use salvo::prelude::Json;
use salvo::{Depot, Router, handler};

use almanac_db::model::user::User;
use almanac_service::auth::get_user_from_depot;

use crate::error::AppResult;
use crate::middleware::auth::AuthMiddleware;

/// ## Summary
/// Returns the authenticated user's information as JSON.
/// The user is retrieved from the depot set by the `AuthMiddleware`.
#[handler]
async fn whoami(depot: &Depot) -> AppResult<Json<User>> {
    Ok(Json(get_user_from_depot(depot)?.clone()))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("whoami").hoop(AuthMiddleware).get(whoami)
}
