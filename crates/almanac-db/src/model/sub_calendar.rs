use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;
use crate::model::calendar::Calendar;

#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Associations, Serialize,
)]
#[diesel(table_name = schema::sub_calendar)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(Calendar, foreign_key = calendar_id))]
pub struct SubCalendar {
    pub id: i64,
    pub calendar_id: i64,
    pub name: String,
    pub active: bool,
    pub overlap: bool,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::sub_calendar)]
pub struct NewSubCalendar<'a> {
    pub calendar_id: i64,
    pub name: &'a str,
    pub active: bool,
    pub overlap: bool,
    pub color: &'a str,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::sub_calendar)]
pub struct SubCalendarChangeset {
    pub calendar_id: Option<i64>,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub overlap: Option<bool>,
    pub color: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
