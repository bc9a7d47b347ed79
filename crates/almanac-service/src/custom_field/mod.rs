//! Custom event fields.
//!
//! ## Module Organization
//!
//! - `catalog`: field and option definitions (create, update, delete, list)
//! - `reconcile`: full-replace synchronization of an event's stored values
//! - `shape`: grouping stored value rows back into a per-field payload
//! - `store`: storage seam used by the reconciler

pub mod catalog;
pub mod reconcile;
pub mod shape;
pub mod store;

pub use reconcile::reconcile;
pub use shape::{ShapedField, ShapedFields, shape_field_values};
pub use store::FieldValueStore;

/// Error key under which every reconciliation failure is reported.
pub const FIELD_VALUES_KEY: &str = "custom_event_field_values";
