pub mod access_key;
pub mod calendar;
pub mod custom_field;
pub mod event;
pub mod sub_calendar;
pub mod user;
