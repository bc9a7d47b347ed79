//! Field and option definitions.

use std::collections::HashMap;

use chrono::Utc;
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use serde::{Deserialize, Serialize};

use almanac_db::db::connection::DbConnection;
use almanac_db::db::enums::FieldType;
use almanac_db::db::query::custom_field;
use almanac_db::model::calendar::Calendar;
use almanac_db::model::custom_field::{
    CustomEventField, CustomEventFieldChangeset, CustomEventFieldOption, NewCustomEventField,
    NewCustomEventFieldOption,
};

use crate::calendar::owned_calendar_from_input;
use crate::error::{ServiceError, ServiceResult, ValidationErrors};
use crate::validation;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldInput {
    pub calendar_id: Option<i64>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub options: Option<Vec<OptionInput>>,
}

/// An option in a create or update payload. Without `id` a new option is created.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionInput {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    #[serde(flatten)]
    pub field: CustomEventField,
    pub options: Vec<CustomEventFieldOption>,
}

/// Validated option list: `(existing id, name)` pairs in payload order.
type OptionPlan = Vec<(Option<i64>, String)>;

fn parse_type(errors: &mut ValidationErrors, raw: Option<&str>) -> Option<FieldType> {
    let Some(raw) = raw else {
        errors.add("type", "The type field is required.");
        return None;
    };
    let parsed = FieldType::parse_known(raw);
    if parsed.is_none() {
        errors.add("type", "The selected type is invalid.");
    }
    parsed
}

fn plan_options(errors: &mut ValidationErrors, options: &[OptionInput]) -> OptionPlan {
    let mut plan = Vec::with_capacity(options.len());
    for (index, option) in options.iter().enumerate() {
        let key = format!("options.{index}.name");
        if let Some(name) = validation::required_name(errors, &key, option.name.as_deref()) {
            plan.push((option.id, name.to_owned()));
        }
    }
    plan
}

fn require_options(errors: &mut ValidationErrors, field_type: &FieldType, plan: Option<&OptionPlan>) {
    if field_type.is_select() && plan.is_none_or(Vec::is_empty) {
        errors.add(
            "options",
            format!("The options field is required when type is {field_type}."),
        );
    }
}

/// ## Summary
/// Lists the user's fields with their options, optionally restricted to one calendar.
///
/// ## Errors
/// Returns an error if a query fails.
pub async fn list_fields(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    calendar_id: Option<i64>,
) -> ServiceResult<Vec<FieldView>> {
    let fields = custom_field::list_owned(conn, user_id, calendar_id).await?;
    let field_ids: Vec<i64> = fields.iter().map(|f| f.id).collect();

    let mut options_by_field: HashMap<i64, Vec<CustomEventFieldOption>> = HashMap::new();
    for option in custom_field::options_for_fields(conn, &field_ids).await? {
        options_by_field
            .entry(option.custom_event_field_id)
            .or_default()
            .push(option);
    }

    Ok(fields
        .into_iter()
        .map(|field| {
            let options = options_by_field.remove(&field.id).unwrap_or_default();
            FieldView { field, options }
        })
        .collect())
}

/// ## Summary
/// Loads the options of an owned field.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn show_field(
    conn: &mut DbConnection<'_>,
    field: CustomEventField,
) -> ServiceResult<FieldView> {
    let options = custom_field::options_for_fields(conn, &[field.id]).await?;
    Ok(FieldView { field, options })
}

/// ## Summary
/// Creates a field in `calendar`. Select types must come with at least one option.
///
/// ## Side Effects
/// Inserts the field and its options in one transaction.
///
/// ## Errors
/// Returns `ServiceError::Validation` if the name, type or options are invalid.
#[tracing::instrument(skip(conn, calendar, input), fields(calendar_id = calendar.id))]
pub async fn create_field(
    conn: &mut DbConnection<'_>,
    calendar: &Calendar,
    input: &FieldInput,
) -> ServiceResult<FieldView> {
    let mut errors = ValidationErrors::new();
    let name = validation::required_name(&mut errors, "name", input.name.as_deref());
    let field_type = parse_type(&mut errors, input.field_type.as_deref());
    let plan = input
        .options
        .as_deref()
        .map(|options| plan_options(&mut errors, options));
    if let Some(field_type) = &field_type {
        require_options(&mut errors, field_type, plan.as_ref());
    }
    errors.into_result()?;

    let (Some(name), Some(field_type)) = (name, field_type) else {
        return Err(ServiceError::InvariantViolation("validated field input missing"));
    };
    let option_names: Vec<String> = if field_type.is_select() {
        plan.unwrap_or_default()
            .into_iter()
            .map(|(_, name)| name)
            .collect()
    } else {
        Vec::new()
    };
    let name = name.to_owned();
    let calendar_id = calendar.id;

    let view = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let field = custom_field::create(
                    tx,
                    &NewCustomEventField {
                        calendar_id,
                        name: &name,
                        field_type,
                    },
                )
                .await?;

                let new_options: Vec<NewCustomEventFieldOption<'_>> = option_names
                    .iter()
                    .map(|name| NewCustomEventFieldOption {
                        custom_event_field_id: field.id,
                        name,
                    })
                    .collect();
                let options = custom_field::create_options(tx, &new_options).await?;

                Ok(FieldView { field, options })
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(field_id = view.field.id, "Custom event field created");
    Ok(view)
}

/// ## Summary
/// Applies a partial update to an owned field.
///
/// When `options` is supplied for a select field, listed options with an `id`
/// are renamed, options without one are created and unlisted options are
/// deleted together with any values referencing them. Changing the type or
/// moving the field to another calendar is refused while values exist.
///
/// ## Errors
/// Returns `ServiceError::Validation` for invalid input or a blocked change.
#[tracing::instrument(skip(conn, existing, input), fields(field_id = existing.id))]
pub async fn update_field(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    existing: &CustomEventField,
    input: &FieldInput,
) -> ServiceResult<FieldView> {
    let mut errors = ValidationErrors::new();
    let mut changes = CustomEventFieldChangeset {
        updated_at: Some(Utc::now()),
        ..CustomEventFieldChangeset::default()
    };

    if input.name.is_some() {
        changes.name = validation::required_name(&mut errors, "name", input.name.as_deref())
            .map(str::to_owned);
    }

    let new_type = match input.field_type.as_deref() {
        Some(raw) => parse_type(&mut errors, Some(raw)),
        None => Some(existing.field_type.clone()),
    };
    let plan = input
        .options
        .as_deref()
        .map(|options| plan_options(&mut errors, options));
    errors.into_result()?;

    let new_type = new_type.ok_or(ServiceError::InvariantViolation("validated type missing"))?;
    let type_changed = new_type != existing.field_type;

    let new_calendar_id = match input.calendar_id {
        Some(calendar_id) if calendar_id != existing.calendar_id => {
            Some(owned_calendar_from_input(conn, user_id, Some(calendar_id)).await?.id)
        }
        _ => None,
    };

    if (type_changed || new_calendar_id.is_some())
        && custom_field::count_values_of_field(conn, existing.id).await? > 0
    {
        let mut blocked = ValidationErrors::new();
        if type_changed {
            blocked.add(
                "type",
                "The type cannot be changed while events have values for this field.",
            );
        }
        if new_calendar_id.is_some() {
            blocked.add(
                "calendar_id",
                "The calendar cannot be changed while events have values for this field.",
            );
        }
        return Err(ServiceError::Validation(blocked));
    }

    let current_options = custom_field::options_for_fields(conn, &[existing.id]).await?;
    if new_type.is_select() {
        let mut errors = ValidationErrors::new();
        match &plan {
            Some(plan) => {
                require_options(&mut errors, &new_type, Some(plan));
                let unknown = plan.iter().filter_map(|(id, _)| *id).any(|id| {
                    !current_options.iter().any(|option| option.id == id)
                });
                if unknown {
                    errors.add("options", "One or more options are invalid.");
                }
            }
            None if type_changed || current_options.is_empty() => {
                require_options(&mut errors, &new_type, None);
            }
            None => {}
        }
        errors.into_result()?;
    }

    if type_changed {
        changes.field_type = Some(new_type.clone());
    }
    changes.calendar_id = new_calendar_id;

    let field_id = existing.id;
    let is_select = new_type.is_select();
    let view = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let field = custom_field::update(tx, field_id, &changes).await?;

                if !is_select {
                    custom_field::delete_options_except(tx, field_id, &[]).await?;
                } else if let Some(plan) = plan {
                    let keep: Vec<i64> = plan.iter().filter_map(|(id, _)| *id).collect();
                    custom_field::delete_options_except(tx, field_id, &keep).await?;

                    for (id, name) in plan.iter().filter_map(|(id, name)| id.map(|id| (id, name))) {
                        custom_field::rename_option(tx, field_id, id, name).await?;
                    }

                    let new_options: Vec<NewCustomEventFieldOption<'_>> = plan
                        .iter()
                        .filter(|(id, _)| id.is_none())
                        .map(|(_, name)| NewCustomEventFieldOption {
                            custom_event_field_id: field_id,
                            name,
                        })
                        .collect();
                    custom_field::create_options(tx, &new_options).await?;
                }

                let options = custom_field::options_for_fields(tx, &[field_id]).await?;
                Ok(FieldView { field, options })
            }
            .scope_boxed()
        })
        .await?;

    Ok(view)
}

/// ## Summary
/// Deletes an owned field. Its options and stored values cascade.
///
/// ## Errors
/// Returns an error if the delete fails.
#[tracing::instrument(skip(conn, existing), fields(field_id = existing.id))]
pub async fn delete_field(
    conn: &mut DbConnection<'_>,
    existing: &CustomEventField,
) -> ServiceResult<()> {
    custom_field::delete(conn, existing.id).await?;
    tracing::info!("Custom event field deleted");
    Ok(())
}
