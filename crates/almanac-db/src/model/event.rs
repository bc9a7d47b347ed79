use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};

use crate::db::schema;
use crate::model::sub_calendar::SubCalendar;

#[derive(Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = schema::event)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(SubCalendar, foreign_key = sub_calendar_id))]
pub struct Event {
    pub id: i64,
    pub sub_calendar_id: i64,
    pub title: String,
    pub all_day: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rrule: Option<String>,
    pub about: Option<String>,
    pub location: Option<String>,
    pub who: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::event)]
pub struct NewEvent {
    pub sub_calendar_id: i64,
    pub title: String,
    pub all_day: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rrule: Option<String>,
    pub about: Option<String>,
    pub location: Option<String>,
    pub who: Option<String>,
}

/// Partial update. `Some(None)` on a nullable column writes `NULL`.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::event)]
pub struct EventChangeset {
    pub sub_calendar_id: Option<i64>,
    pub title: Option<String>,
    pub all_day: Option<bool>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub rrule: Option<Option<String>>,
    pub about: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub who: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}
