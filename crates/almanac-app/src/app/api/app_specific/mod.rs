use salvo::Router;

use almanac_core::constants::{APP_ROUTE_COMPONENT, AUTH_ROUTE_COMPONENT};

mod auth;
mod healthcheck;
mod whoami;

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(Router::with_path(AUTH_ROUTE_COMPONENT).push(auth::routes()))
        .push(
            Router::with_path(APP_ROUTE_COMPONENT)
                .push(healthcheck::routes())
                .push(whoami::routes()),
        )
}
