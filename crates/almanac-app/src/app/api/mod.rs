mod app_specific;
pub mod request;
pub mod response;
mod v1;

use salvo::Router;

pub use almanac_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, APP_ROUTE_PREFIX, AUTH_ROUTE_PREFIX, V1_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the main API router: account endpoints, app endpoints and the
/// versioned resource API.
///
/// ## Errors
/// Returns an error if any child route handler fails to initialize.
pub fn routes() -> anyhow::Result<Router> {
    Ok(Router::with_path(API_ROUTE_COMPONENT)
        .push(app_specific::routes())
        .push(v1::routes()))
}
