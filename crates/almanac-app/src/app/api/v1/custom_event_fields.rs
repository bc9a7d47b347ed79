use salvo::prelude::Json;
use salvo::{Depot, Request, Router, handler};

use almanac_service::auth::get_user_from_depot;
use almanac_service::calendar::owned_calendar_from_input;
use almanac_service::custom_field::catalog::{
    FieldInput, FieldView, create_field, delete_field, list_fields, show_field, update_field,
};

use crate::app::api::request::{parse_body, query_id};
use crate::app::api::response::{Created, NoContent};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::middleware::scope::get_scope_from_depot;

#[handler]
pub async fn list(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<FieldView>>> {
    let user_id = get_user_from_depot(depot)?.id;
    let calendar_id = get_scope_from_depot(depot)?
        .calendar
        .as_ref()
        .map(|calendar| calendar.id)
        .or_else(|| query_id(req, "calendar_id"));
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(list_fields(&mut conn, user_id, calendar_id).await?))
}

#[handler]
pub async fn create(req: &mut Request, depot: &mut Depot) -> AppResult<Created<FieldView>> {
    let input: FieldInput = parse_body(req).await?;
    let user_id = get_user_from_depot(depot)?.id;
    let scope = get_scope_from_depot(depot)?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    let calendar = match &scope.calendar {
        Some(calendar) => calendar.clone(),
        None => owned_calendar_from_input(&mut conn, user_id, input.calendar_id).await?,
    };

    Ok(Created(create_field(&mut conn, &calendar, &input).await?))
}

#[handler]
pub async fn show(depot: &mut Depot) -> AppResult<Json<FieldView>> {
    let field = get_scope_from_depot(depot)?.custom_event_field()?.clone();
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(show_field(&mut conn, field).await?))
}

#[handler]
pub async fn update(req: &mut Request, depot: &mut Depot) -> AppResult<Json<FieldView>> {
    let input: FieldInput = parse_body(req).await?;
    let user_id = get_user_from_depot(depot)?.id;
    let existing = get_scope_from_depot(depot)?.custom_event_field()?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(update_field(&mut conn, user_id, existing, &input).await?))
}

#[handler]
pub async fn destroy(depot: &mut Depot) -> AppResult<NoContent> {
    let existing = get_scope_from_depot(depot)?.custom_event_field()?;
    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    delete_field(&mut conn, existing).await?;
    Ok(NoContent)
}

fn collection(path: &str) -> Router {
    Router::with_path(path)
        .get(list)
        .post(create)
        .push(
            Router::with_path("{custom_event_field_id}")
                .get(show)
                .put(update)
                .patch(update)
                .delete(destroy),
        )
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(collection("custom-event-fields"))
        .push(collection("calendars/{calendar_id}/custom-event-fields"))
}
