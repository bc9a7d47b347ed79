//! Depot helpers for reading the authenticated user from Salvo requests.

use almanac_db::model::user::User;

use crate::error::{ServiceError, ServiceResult};

pub mod depot_keys {
    pub const AUTHENTICATED_PRINCIPAL: &str = "__authenticated_principal";
    pub const CURRENT_TOKEN: &str = "__current_token";

    pub const SCOPE: &str = "__scope";
}

/// Get the authenticated user from the depot.
///
/// ## Errors
///
/// Returns `NotAuthenticated` if the auth middleware did not run or rejected the request.
pub fn get_user_from_depot(depot: &salvo::Depot) -> ServiceResult<&User> {
    depot
        .get::<User>(depot_keys::AUTHENTICATED_PRINCIPAL)
        .map_err(|_e| ServiceError::NotAuthenticated)
}

/// The id of the bearer token that authenticated the request, if any.
#[must_use]
pub fn get_token_id_from_depot(depot: &salvo::Depot) -> Option<i64> {
    depot.get::<i64>(depot_keys::CURRENT_TOKEN).ok().copied()
}
