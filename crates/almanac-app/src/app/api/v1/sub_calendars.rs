use salvo::prelude::Json;
use salvo::{Depot, Request, Router, handler};

use almanac_db::model::sub_calendar::SubCalendar;
use almanac_service::auth::get_user_from_depot;
use almanac_service::calendar::owned_calendar_from_input;
use almanac_service::sub_calendar::{
    SubCalendarInput, create_sub_calendar, delete_sub_calendar, list_sub_calendars,
    update_sub_calendar,
};

use crate::app::api::request::{parse_body, query_id};
use crate::app::api::response::{Created, NoContent};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::middleware::scope::get_scope_from_depot;

/// Lists sub-calendars of the path's calendar, or of `?calendar_id=` on the flat route.
#[handler]
pub async fn list(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<SubCalendar>>> {
    let user_id = get_user_from_depot(depot)?.id;
    let calendar_id = get_scope_from_depot(depot)?
        .calendar
        .as_ref()
        .map(|calendar| calendar.id)
        .or_else(|| query_id(req, "calendar_id"));
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(list_sub_calendars(&mut conn, user_id, calendar_id).await?))
}

/// Creates a sub-calendar in the path's calendar, or in the body's `calendar_id` on the flat route.
#[handler]
pub async fn create(req: &mut Request, depot: &mut Depot) -> AppResult<Created<SubCalendar>> {
    let input: SubCalendarInput = parse_body(req).await?;
    let user_id = get_user_from_depot(depot)?.id;
    let scope = get_scope_from_depot(depot)?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    let calendar = match &scope.calendar {
        Some(calendar) => calendar.clone(),
        None => owned_calendar_from_input(&mut conn, user_id, input.calendar_id).await?,
    };

    Ok(Created(create_sub_calendar(&mut conn, &calendar, &input).await?))
}

#[handler]
pub async fn show(depot: &mut Depot) -> AppResult<Json<SubCalendar>> {
    Ok(Json(get_scope_from_depot(depot)?.sub_calendar()?.clone()))
}

#[handler]
pub async fn update(req: &mut Request, depot: &mut Depot) -> AppResult<Json<SubCalendar>> {
    let input: SubCalendarInput = parse_body(req).await?;
    let user_id = get_user_from_depot(depot)?.id;
    let existing = get_scope_from_depot(depot)?.sub_calendar()?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(
        update_sub_calendar(&mut conn, user_id, existing, &input).await?,
    ))
}

#[handler]
pub async fn destroy(depot: &mut Depot) -> AppResult<NoContent> {
    let existing = get_scope_from_depot(depot)?.sub_calendar()?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    delete_sub_calendar(&mut conn, existing).await?;
    Ok(NoContent)
}

fn collection(path: &str) -> Router {
    Router::with_path(path)
        .get(list)
        .post(create)
        .push(
            Router::with_path("{sub_calendar_id}")
                .get(show)
                .put(update)
                .patch(update)
                .delete(destroy),
        )
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(collection("sub-calendars"))
        .push(collection("calendars/{calendar_id}/sub-calendars"))
}
