//! Grouping stored value rows back into one payload entry per field.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use almanac_db::db::enums::FieldType;
use almanac_db::model::custom_field::{CustomEventFieldOption, LoadedFieldValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionRef {
    pub id: i64,
    pub name: String,
}

impl From<&CustomEventFieldOption> for OptionRef {
    fn from(option: &CustomEventFieldOption) -> Self {
        Self {
            id: option.id,
            name: option.name.clone(),
        }
    }
}

/// A stored row dumped verbatim for field types this release does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawValue {
    pub id: i64,
    pub value: Option<String>,
    pub custom_event_field_option_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapedPayload {
    Text {
        value: Option<String>,
    },
    SingleSelect {
        option_id: Option<i64>,
        option: Option<OptionRef>,
    },
    MultiSelect {
        option_ids: Vec<i64>,
        options: Vec<OptionRef>,
    },
    Raw {
        raw: Vec<RawValue>,
    },
}

/// One field's values for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedField {
    pub id: i64,
    pub name: String,
    pub field_type: FieldType,
    pub payload: ShapedPayload,
}

impl Serialize for ShapedField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", &self.field_type)?;
        match &self.payload {
            ShapedPayload::Text { value } => {
                map.serialize_entry("value", value)?;
            }
            ShapedPayload::SingleSelect { option_id, option } => {
                map.serialize_entry("option_id", option_id)?;
                map.serialize_entry("option", option)?;
            }
            ShapedPayload::MultiSelect {
                option_ids,
                options,
            } => {
                map.serialize_entry("option_ids", option_ids)?;
                map.serialize_entry("options", options)?;
            }
            ShapedPayload::Raw { raw } => {
                map.serialize_entry("raw", raw)?;
            }
        }
        map.end()
    }
}

/// The shaped fields of one event, serialized as an object keyed by field id
/// in the order the fields were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapedFields(pub Vec<ShapedField>);

impl ShapedFields {
    #[must_use]
    pub fn get(&self, field_id: i64) -> Option<&ShapedField> {
        self.0.iter().find(|field| field.id == field_id)
    }
}

impl Serialize for ShapedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in &self.0 {
            map.serialize_entry(&field.id.to_string(), field)?;
        }
        map.end()
    }
}

/// ## Summary
/// Groups one event's stored value rows by field and builds the per-type payload.
///
/// Only fields with at least one stored row appear. Text and single-select
/// read their first row; multi-select collects the distinct referenced options
/// in first-seen order.
#[must_use]
pub fn shape_field_values(rows: &[LoadedFieldValue]) -> ShapedFields {
    let mut groups: Vec<(i64, Vec<&LoadedFieldValue>)> = Vec::new();
    for row in rows {
        let field_id = row.field.id;
        match groups.iter_mut().find(|(id, _)| *id == field_id) {
            Some((_, group)) => group.push(row),
            None => groups.push((field_id, vec![row])),
        }
    }

    ShapedFields(
        groups
            .into_iter()
            .filter_map(|(_, group)| shape_group(&group))
            .collect(),
    )
}

fn shape_group(group: &[&LoadedFieldValue]) -> Option<ShapedField> {
    let first = group.first()?;
    let field = &first.field;

    let payload = match &field.field_type {
        FieldType::Text => ShapedPayload::Text {
            value: first.value.value.clone(),
        },
        FieldType::SingleSelect => ShapedPayload::SingleSelect {
            option_id: first.value.custom_event_field_option_id,
            option: first.option.as_ref().map(OptionRef::from),
        },
        FieldType::MultiSelect => {
            let mut options: Vec<OptionRef> = Vec::new();
            for option in group.iter().filter_map(|row| row.option.as_ref()) {
                if !options.iter().any(|seen| seen.id == option.id) {
                    options.push(option.into());
                }
            }
            ShapedPayload::MultiSelect {
                option_ids: options.iter().map(|option| option.id).collect(),
                options,
            }
        }
        FieldType::Other(_) => ShapedPayload::Raw {
            raw: group
                .iter()
                .map(|row| RawValue {
                    id: row.value.id,
                    value: row.value.value.clone(),
                    custom_event_field_option_id: row.value.custom_event_field_option_id,
                })
                .collect(),
        },
    };

    Some(ShapedField {
        id: field.id,
        name: field.name.clone(),
        field_type: field.field_type.clone(),
        payload,
    })
}
