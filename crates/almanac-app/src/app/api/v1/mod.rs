//! Versioned resource API.
//!
//! Every route here is authenticated and passes through the ownership scope
//! guard, so a handler only ever sees resources the caller owns. Each
//! resource's handlers are mounted twice: under a flat path
//! (`events/{event_id}`) and under the nested path of its parents
//! (`calendars/{calendar_id}/sub-calendars/{sub_calendar_id}/events/{event_id}`).

mod access_keys;
mod calendars;
mod custom_event_fields;
mod events;
mod sub_calendars;

use salvo::Router;

use almanac_core::constants::V1_ROUTE_COMPONENT;

use crate::middleware::auth::AuthMiddleware;
use crate::middleware::scope::ScopeMiddleware;

#[must_use]
pub fn routes() -> Router {
    Router::with_path(V1_ROUTE_COMPONENT)
        .hoop(AuthMiddleware)
        .hoop(ScopeMiddleware)
        .push(calendars::routes())
        .push(sub_calendars::routes())
        .push(events::routes())
        .push(custom_event_fields::routes())
        .push(access_keys::routes())
}
