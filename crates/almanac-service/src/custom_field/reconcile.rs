//! Full-replace synchronization of an event's custom field values.
//!
//! ## Summary
//! An incoming payload is a list of loosely-typed rows:
//!
//! ```json
//! [{ "custom_event_field_id": 1, "value": "Room 4" },
//!  { "custom_event_field_id": 2, "custom_event_field_option_id": 7 },
//!  { "custom_event_field_id": 3, "custom_event_field_option_ids": [8, 9] }]
//! ```
//!
//! Rows are type-checked and folded by field id (last occurrence wins), every
//! field id is checked against the event's calendar before anything is written, and then
//! each mentioned field has its stored values deleted and rewritten according
//! to its type. Fields not mentioned are left untouched.
//!
//! The caller owns the transaction: a failure part-way through must roll back
//! the deletions already issued for earlier fields.

use std::collections::HashMap;

use serde_json::{Map, Value};

use almanac_core::constants::MAX_FIELD_VALUE_LENGTH;
use almanac_db::db::enums::FieldType;
use almanac_db::model::custom_field::{CustomEventField, NewCustomEventFieldValue};

use super::FIELD_VALUES_KEY;
use super::store::FieldValueStore;
use crate::error::{ServiceError, ServiceResult, ValidationErrors};

const FIELD_ID_KEY: &str = "custom_event_field_id";
const VALUE_KEY: &str = "value";
const OPTION_ID_KEY: &str = "custom_event_field_option_id";
const OPTION_IDS_KEY: &str = "custom_event_field_option_ids";

/// One payload row after its keys have been type-checked.
///
/// All three payload keys are kept because their meaning depends on the
/// field's catalog type, which is unknown until the catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingRow {
    pub field_id: i64,
    value: Option<String>,
    option_id: Option<i64>,
    option_ids: Option<Vec<i64>>,
}

impl IncomingRow {
    /// Returns `None` for a row without a positive field id.
    fn from_object(
        index: usize,
        object: &Map<String, Value>,
        errors: &mut ValidationErrors,
    ) -> Option<Self> {
        let field_id = match object.get(FIELD_ID_KEY) {
            None | Some(Value::Null) => return None,
            Some(raw) => match as_id(raw) {
                Some(id) => id,
                None => {
                    errors.add(FIELD_VALUES_KEY, must_be(index, FIELD_ID_KEY, "an integer"));
                    return None;
                }
            },
        };

        let value = match object.get(VALUE_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) if text.chars().count() > MAX_FIELD_VALUE_LENGTH => {
                errors.add(
                    FIELD_VALUES_KEY,
                    format!(
                        "The {FIELD_VALUES_KEY}.{index}.{VALUE_KEY} field must not be greater than {MAX_FIELD_VALUE_LENGTH} characters."
                    ),
                );
                None
            }
            Some(Value::String(text)) => Some(text.clone()),
            Some(_) => {
                errors.add(FIELD_VALUES_KEY, must_be(index, VALUE_KEY, "a string"));
                None
            }
        };

        let option_id = match object.get(OPTION_ID_KEY) {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let id = as_id(raw);
                if id.is_none() {
                    errors.add(FIELD_VALUES_KEY, must_be(index, OPTION_ID_KEY, "an integer"));
                }
                id
            }
        };

        let option_ids = match object.get(OPTION_IDS_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => {
                let mut ids = Vec::with_capacity(items.len());
                for (position, item) in items.iter().enumerate() {
                    match as_id(item) {
                        Some(id) => ids.push(id),
                        None => errors.add(
                            FIELD_VALUES_KEY,
                            must_be(index, &format!("{OPTION_IDS_KEY}.{position}"), "an integer"),
                        ),
                    }
                }
                Some(ids)
            }
            Some(_) => {
                errors.add(FIELD_VALUES_KEY, must_be(index, OPTION_IDS_KEY, "an array"));
                None
            }
        };

        (field_id > 0).then_some(Self {
            field_id,
            value,
            option_id,
            option_ids,
        })
    }

    /// Trimmed text, or `None` when the row clears the field.
    fn text(&self) -> Option<String> {
        let trimmed = self.value.as_deref()?.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }

    /// Selected option, or `None` when the row clears the field.
    fn option(&self) -> Option<i64> {
        self.option_id.filter(|&id| id != 0)
    }

    /// Distinct positive option ids in first-seen order.
    fn options(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = Vec::new();
        for &id in self.option_ids.iter().flatten().filter(|&&id| id > 0) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

fn must_be(index: usize, key: &str, kind: &str) -> String {
    format!("The {FIELD_VALUES_KEY}.{index}.{key} field must be {kind}.")
}

/// Reads an integer id from a JSON integer or an integer string.
fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// ## Summary
/// Type-checks a raw payload and folds the usable rows by field id.
///
/// Non-object rows and rows without a positive field id are dropped. When a
/// field id repeats, the last row wins but keeps the position of the first.
///
/// ## Errors
/// Returns `ServiceError::Validation` keyed on `custom_event_field_values`
/// if any row carries a non-integer field id, a non-string or overlong
/// `value`, a non-integer `custom_event_field_option_id`, or a
/// `custom_event_field_option_ids` that is not an array of integers.
pub fn fold_rows(rows: &[Value]) -> ServiceResult<Vec<IncomingRow>> {
    let mut errors = ValidationErrors::new();
    let mut folded: Vec<IncomingRow> = Vec::new();
    let mut positions: HashMap<i64, usize> = HashMap::new();

    for (index, object) in rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| Some((index, row.as_object()?)))
    {
        let Some(row) = IncomingRow::from_object(index, object, &mut errors) else {
            continue;
        };
        match positions.get(&row.field_id) {
            Some(&at) => folded[at] = row,
            None => {
                positions.insert(row.field_id, folded.len());
                folded.push(row);
            }
        }
    }

    errors.into_result()?;
    Ok(folded)
}

/// ## Summary
/// Replaces the stored values of every field mentioned in `rows` for one event.
///
/// ## Side Effects
/// For each mentioned field: deletes all stored values for (`event_id`, field),
/// then inserts zero or more rows depending on the field type.
///
/// ## Errors
/// Returns `ServiceError::Validation` keyed on `custom_event_field_values` if a
/// row is malformed (see [`fold_rows`]), a field id is not in `calendar_id`,
/// an option does not belong to its field, or a field has an unsupported type.
/// Malformed rows and unknown field ids are detected before any write.
#[tracing::instrument(skip(store, rows), fields(row_count = rows.len()))]
pub async fn reconcile<S: FieldValueStore>(
    store: &mut S,
    event_id: i64,
    calendar_id: i64,
    rows: &[Value],
) -> ServiceResult<()> {
    let rows = fold_rows(rows)?;
    if rows.is_empty() {
        return Ok(());
    }

    let field_ids: Vec<i64> = rows.iter().map(|row| row.field_id).collect();
    let fields: HashMap<i64, CustomEventField> = store
        .find_fields(calendar_id, &field_ids)
        .await?
        .into_iter()
        .map(|field| (field.id, field))
        .collect();

    if field_ids.iter().any(|id| !fields.contains_key(id)) {
        tracing::warn!(?field_ids, "Rejected field ids outside the event's calendar");
        return Err(ServiceError::validation(
            FIELD_VALUES_KEY,
            "One or more custom_event_field_id values are invalid for this calendar.",
        ));
    }

    for row in &rows {
        let field = fields
            .get(&row.field_id)
            .ok_or(ServiceError::InvariantViolation("field vanished after lookup"))?;

        store.delete_values(event_id, field.id).await?;

        let new_rows = values_for_field(store, event_id, field, row).await?;
        tracing::debug!(
            field_id = field.id,
            field_type = %field.field_type,
            stored = new_rows.len(),
            "Replaced field values"
        );

        if !new_rows.is_empty() {
            store.insert_values(&new_rows).await?;
        }
    }

    Ok(())
}

/// Builds the rows to store for one field, validating option references.
async fn values_for_field<S: FieldValueStore>(
    store: &mut S,
    event_id: i64,
    field: &CustomEventField,
    row: &IncomingRow,
) -> ServiceResult<Vec<NewCustomEventFieldValue>> {
    match &field.field_type {
        FieldType::Text => Ok(row
            .text()
            .map(|text| vec![NewCustomEventFieldValue::text(event_id, field.id, text)])
            .unwrap_or_default()),

        FieldType::SingleSelect => {
            let Some(option_id) = row.option() else {
                return Ok(Vec::new());
            };
            if store.count_options(field.id, &[option_id]).await? != 1 {
                return Err(ServiceError::validation(
                    FIELD_VALUES_KEY,
                    format!("Invalid option for custom_event_field_id {}.", field.id),
                ));
            }
            Ok(vec![NewCustomEventFieldValue::option(
                event_id, field.id, option_id,
            )])
        }

        FieldType::MultiSelect => {
            let option_ids = row.options();
            if option_ids.is_empty() {
                return Ok(Vec::new());
            }
            if store.count_options(field.id, &option_ids).await? != option_ids.len() {
                return Err(ServiceError::validation(
                    FIELD_VALUES_KEY,
                    format!(
                        "One or more options are invalid for custom_event_field_id {}.",
                        field.id
                    ),
                ));
            }
            Ok(option_ids
                .into_iter()
                .map(|option_id| NewCustomEventFieldValue::option(event_id, field.id, option_id))
                .collect())
        }

        FieldType::Other(_) => Err(ServiceError::validation(
            FIELD_VALUES_KEY,
            format!("Unsupported field type for custom_event_field_id {}.", field.id),
        )),
    }
}
