pub mod datetime;
pub mod serde;
