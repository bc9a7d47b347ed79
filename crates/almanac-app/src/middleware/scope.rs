//! Resolves the resource ids in the request path before any handler runs.

use salvo::{Depot, Scribe};

use almanac_service::auth::{depot_keys, get_user_from_depot};
use almanac_service::error::ServiceError;
use almanac_service::scope::{ResolvedScope, ScopePath, resolve_scope};

use crate::db_handler::get_db_from_depot;
use crate::error::{AppError, AppResult};

pub const CALENDAR_ID: &str = "calendar_id";
pub const SUB_CALENDAR_ID: &str = "sub_calendar_id";
pub const EVENT_ID: &str = "event_id";
pub const CUSTOM_EVENT_FIELD_ID: &str = "custom_event_field_id";
pub const ACCESS_KEY_ID: &str = "access_key_id";

/// Guards every route below it with the ownership scope check.
///
/// Must run after `AuthMiddleware`.
pub struct ScopeMiddleware;

/// ## Summary
/// Reads one id path parameter.
///
/// ## Errors
/// Returns `NotFound` if the parameter is present but not a positive integer.
fn path_id(req: &salvo::Request, name: &'static str) -> AppResult<Option<i64>> {
    let Some(raw) = req.param::<String>(name) else {
        return Ok(None);
    };
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .map(Some)
        .ok_or(AppError::ServiceError(ServiceError::NotFound(name)))
}

/// ## Summary
/// Builds the scope path from the request's path parameters.
///
/// ## Errors
/// Returns `NotFound` if any id parameter is malformed.
pub fn scope_path(req: &salvo::Request) -> AppResult<ScopePath> {
    Ok(ScopePath {
        calendar_id: path_id(req, CALENDAR_ID)?,
        sub_calendar_id: path_id(req, SUB_CALENDAR_ID)?,
        event_id: path_id(req, EVENT_ID)?,
        custom_event_field_id: path_id(req, CUSTOM_EVENT_FIELD_ID)?,
        access_key_id: path_id(req, ACCESS_KEY_ID)?,
    })
}

impl ScopeMiddleware {
    async fn resolve(req: &salvo::Request, depot: &mut Depot) -> AppResult<()> {
        let path = scope_path(req)?;
        let user_id = get_user_from_depot(depot)?.id;

        let scope = if path == ScopePath::default() {
            ResolvedScope::default()
        } else {
            let provider = get_db_from_depot(depot)?;
            let mut conn = provider.get_connection().await?;
            resolve_scope(&mut conn, user_id, path).await?
        };

        depot.insert(depot_keys::SCOPE, scope);
        Ok(())
    }
}

#[salvo::async_trait]
impl salvo::Handler for ScopeMiddleware {
    #[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        if let Err(err) = Self::resolve(req, depot).await {
            err.render(res);
            ctrl.skip_rest();
        }
    }
}

/// ## Summary
/// Retrieves the resolved scope from the depot.
///
/// ## Errors
/// Returns an invariant violation if `ScopeMiddleware` did not run.
pub fn get_scope_from_depot(depot: &Depot) -> AppResult<&ResolvedScope> {
    depot
        .get::<ResolvedScope>(depot_keys::SCOPE)
        .map_err(|_err| ServiceError::InvariantViolation("Scope not resolved").into())
}
