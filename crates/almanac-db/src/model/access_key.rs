use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::enums::AccessType;
use crate::db::schema;
use crate::model::calendar::Calendar;

/// A shareable key granting access to selected sub-calendars of one calendar.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Associations, Serialize,
)]
#[diesel(table_name = schema::access_key)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(Calendar, foreign_key = calendar_id))]
pub struct AccessKey {
    pub id: i64,
    pub calendar_id: i64,
    pub key: String,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccessKey {
    #[must_use]
    pub const fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::access_key)]
pub struct NewAccessKey {
    pub calendar_id: i64,
    pub key: String,
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::access_key)]
pub struct AccessKeyChangeset {
    pub key: Option<String>,
    pub name: Option<Option<String>>,
    pub password_hash: Option<Option<String>>,
    pub active: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Associations, Serialize,
)]
#[diesel(table_name = schema::sub_calendar_permission)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(AccessKey, foreign_key = access_key_id))]
pub struct SubCalendarPermission {
    pub id: i64,
    pub access_key_id: i64,
    pub sub_calendar_id: i64,
    pub access_type: AccessType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::sub_calendar_permission)]
pub struct NewSubCalendarPermission {
    pub access_key_id: i64,
    pub sub_calendar_id: i64,
    pub access_type: AccessType,
}
