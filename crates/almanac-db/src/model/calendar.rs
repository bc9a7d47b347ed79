use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;
use crate::model::user::User;

#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Associations, Serialize,
)]
#[diesel(table_name = schema::calendar)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(User, foreign_key = user_id))]
pub struct Calendar {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::calendar)]
pub struct NewCalendar<'a> {
    pub user_id: i64,
    pub name: &'a str,
    pub timezone: &'a str,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::calendar)]
pub struct CalendarChangeset {
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
