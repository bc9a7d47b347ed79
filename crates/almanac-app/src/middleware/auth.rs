use salvo::{Depot, Scribe};

use almanac_service::auth::{authenticate, depot_keys};

use crate::config::get_config_from_depot;
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;

/// ## Summary
/// Middleware handler for authentication.
/// Hoop it on a router to require an authenticated user for every route below.
pub struct AuthMiddleware;

impl AuthMiddleware {
    async fn authenticate(req: &salvo::Request, depot: &mut Depot) -> AppResult<()> {
        let config = get_config_from_depot(depot)?;
        let provider = get_db_from_depot(depot)?;
        let mut conn = provider.get_connection().await?;

        let authenticated = authenticate(req, &mut conn, &config).await?;
        tracing::debug!(user_id = authenticated.user.id, "User authenticated");

        depot.insert(depot_keys::AUTHENTICATED_PRINCIPAL, authenticated.user);
        if let Some(token_id) = authenticated.token_id {
            depot.insert(depot_keys::CURRENT_TOKEN, token_id);
        }
        Ok(())
    }
}

/// ## Summary
/// Authenticates the request and stores the user in the depot.
///
/// ## Side Effects
/// Inserts the authenticated user under `AUTHENTICATED_PRINCIPAL` and, for
/// bearer tokens, the token id under `CURRENT_TOKEN`.
///
/// ## Errors
/// Renders 401 if authentication fails and skips the rest of the chain.
#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        tracing::trace!("Authenticating request");

        if let Err(err) = Self::authenticate(req, depot).await {
            err.render(res);
            ctrl.skip_rest();
        }
    }
}
