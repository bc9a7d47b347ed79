use salvo::prelude::Json;
use salvo::{Depot, Request, Router, handler};

use almanac_db::model::calendar::Calendar;
use almanac_service::auth::get_user_from_depot;
use almanac_service::calendar::{
    CalendarInput, create_calendar, delete_calendar, list_calendars, update_calendar,
};

use crate::app::api::request::parse_body;
use crate::app::api::response::{Created, NoContent};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::middleware::scope::get_scope_from_depot;

#[handler]
pub async fn list(depot: &mut Depot) -> AppResult<Json<Vec<Calendar>>> {
    let user_id = get_user_from_depot(depot)?.id;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(list_calendars(&mut conn, user_id).await?))
}

#[handler]
pub async fn create(req: &mut Request, depot: &mut Depot) -> AppResult<Created<Calendar>> {
    let input: CalendarInput = parse_body(req).await?;
    let user_id = get_user_from_depot(depot)?.id;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Created(create_calendar(&mut conn, user_id, &input).await?))
}

#[handler]
pub async fn show(depot: &mut Depot) -> AppResult<Json<Calendar>> {
    Ok(Json(get_scope_from_depot(depot)?.calendar()?.clone()))
}

#[handler]
pub async fn update(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Calendar>> {
    let input: CalendarInput = parse_body(req).await?;
    let existing = get_scope_from_depot(depot)?.calendar()?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(update_calendar(&mut conn, existing, &input).await?))
}

#[handler]
pub async fn destroy(depot: &mut Depot) -> AppResult<NoContent> {
    let existing = get_scope_from_depot(depot)?.calendar()?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    delete_calendar(&mut conn, existing).await?;
    Ok(NoContent)
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("calendars")
        .get(list)
        .post(create)
        .push(
            Router::with_path("{calendar_id}")
                .get(show)
                .put(update)
                .patch(update)
                .delete(destroy),
        )
}
