pub mod access_key;
pub mod auth;
pub mod calendar;
pub mod custom_field;
pub mod error;
pub mod event;
pub mod scope;
pub mod sub_calendar;
pub mod validation;
