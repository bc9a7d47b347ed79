use salvo::prelude::Json;
use salvo::{Depot, Request, Router, handler};

use almanac_service::auth::get_user_from_depot;
use almanac_service::event::{
    EventInput, EventQuery, EventView, create_event, delete_event, list_events, parse_filter,
    show_event, update_event,
};
use almanac_service::sub_calendar::owned_sub_calendar_from_input;

use crate::app::api::request::{parse_body, query_id};
use crate::app::api::response::{Created, NoContent};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::middleware::scope::get_scope_from_depot;

/// Lists events, restricted to the path's sub-calendar on the nested route.
///
/// Query parameters: `calendar_id`, `sub_calendar_id`, and `start`/`end` for
/// events overlapping that window.
#[handler]
pub async fn list(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<EventView>>> {
    let user_id = get_user_from_depot(depot)?.id;
    let scope = get_scope_from_depot(depot)?;

    let query = EventQuery {
        calendar_id: scope
            .calendar
            .as_ref()
            .map(|calendar| calendar.id)
            .or_else(|| query_id(req, "calendar_id")),
        sub_calendar_id: scope
            .sub_calendar
            .as_ref()
            .map(|sub_calendar| sub_calendar.id)
            .or_else(|| query_id(req, "sub_calendar_id")),
        start: req.query::<String>("start"),
        end: req.query::<String>("end"),
    };
    let filter = parse_filter(&query)?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(list_events(&mut conn, user_id, filter).await?))
}

/// Creates an event in the path's sub-calendar, or in the body's
/// `sub_calendar_id` on the flat route.
#[handler]
pub async fn create(req: &mut Request, depot: &mut Depot) -> AppResult<Created<EventView>> {
    let input: EventInput = parse_body(req).await?;
    let user_id = get_user_from_depot(depot)?.id;
    let scope = get_scope_from_depot(depot)?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    let sub_calendar = match &scope.sub_calendar {
        Some(sub_calendar) => sub_calendar.clone(),
        None => owned_sub_calendar_from_input(&mut conn, user_id, input.sub_calendar_id).await?,
    };

    Ok(Created(create_event(&mut conn, &sub_calendar, &input).await?))
}

#[handler]
pub async fn show(depot: &mut Depot) -> AppResult<Json<EventView>> {
    let scoped = get_scope_from_depot(depot)?.event()?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(show_event(&mut conn, scoped).await?))
}

#[handler]
pub async fn update(req: &mut Request, depot: &mut Depot) -> AppResult<Json<EventView>> {
    let input: EventInput = parse_body(req).await?;
    let user_id = get_user_from_depot(depot)?.id;
    let scoped = get_scope_from_depot(depot)?.event()?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(update_event(&mut conn, user_id, scoped, &input).await?))
}

#[handler]
pub async fn destroy(depot: &mut Depot) -> AppResult<NoContent> {
    let scoped = get_scope_from_depot(depot)?.event()?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    delete_event(&mut conn, scoped).await?;
    Ok(NoContent)
}

fn collection(path: &str) -> Router {
    Router::with_path(path)
        .get(list)
        .post(create)
        .push(
            Router::with_path("{event_id}")
                .get(show)
                .put(update)
                .patch(update)
                .delete(destroy),
        )
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(collection("events"))
        .push(collection(
            "calendars/{calendar_id}/sub-calendars/{sub_calendar_id}/events",
        ))
}
