//! Query builders and query functions, one module per aggregate.
//!
//! Builders named `owned_by` restrict a table to rows that transitively belong
//! to one user (`... -> calendar.user_id`). Every ownership check in the
//! service layer goes through them.

pub mod access_key;
pub mod calendar;
pub mod custom_field;
pub mod event;
pub mod sub_calendar;
pub mod user;
