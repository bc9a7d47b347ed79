use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::enums::FieldType;
use crate::db::schema;
use crate::model::calendar::Calendar;
use crate::model::event::Event;

/// A calendar-scoped custom attribute definition.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Associations, Serialize,
)]
#[diesel(table_name = schema::custom_event_field)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(Calendar, foreign_key = calendar_id))]
pub struct CustomEventField {
    pub id: i64,
    pub calendar_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::custom_event_field)]
pub struct NewCustomEventField<'a> {
    pub calendar_id: i64,
    pub name: &'a str,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::custom_event_field)]
pub struct CustomEventFieldChangeset {
    pub calendar_id: Option<i64>,
    pub name: Option<String>,
    pub field_type: Option<FieldType>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One selectable value of a select-type field.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Associations, Serialize,
)]
#[diesel(table_name = schema::custom_event_field_option)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(CustomEventField, foreign_key = custom_event_field_id))]
pub struct CustomEventFieldOption {
    pub id: i64,
    pub custom_event_field_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::custom_event_field_option)]
pub struct NewCustomEventFieldOption<'a> {
    pub custom_event_field_id: i64,
    pub name: &'a str,
}

/// One persisted (event, field, selection) fact.
///
/// Text fields carry `value` and no option. Select fields carry an option and
/// no `value`; multi-select stores one row per selected option.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Associations, Serialize,
)]
#[diesel(table_name = schema::custom_event_field_value)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(Event, foreign_key = event_id))]
#[diesel(belongs_to(CustomEventField, foreign_key = custom_event_field_id))]
pub struct CustomEventFieldValue {
    pub id: i64,
    pub event_id: i64,
    pub custom_event_field_id: i64,
    pub value: Option<String>,
    pub custom_event_field_option_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = schema::custom_event_field_value)]
pub struct NewCustomEventFieldValue {
    pub event_id: i64,
    pub custom_event_field_id: i64,
    pub value: Option<String>,
    pub custom_event_field_option_id: Option<i64>,
}

impl NewCustomEventFieldValue {
    #[must_use]
    pub const fn text(event_id: i64, field_id: i64, value: String) -> Self {
        Self {
            event_id,
            custom_event_field_id: field_id,
            value: Some(value),
            custom_event_field_option_id: None,
        }
    }

    #[must_use]
    pub const fn option(event_id: i64, field_id: i64, option_id: i64) -> Self {
        Self {
            event_id,
            custom_event_field_id: field_id,
            value: None,
            custom_event_field_option_id: Some(option_id),
        }
    }
}

/// A stored value row together with its field definition and referenced option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFieldValue {
    pub value: CustomEventFieldValue,
    pub field: CustomEventField,
    pub option: Option<CustomEventFieldOption>,
}
