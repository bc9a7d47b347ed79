//! Serde helpers for partial-update payloads.

use serde::{Deserialize, Deserializer};

/// ## Summary
/// Distinguishes an absent key from an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]` on an
/// `Option<Option<T>>` field: absent becomes `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(value))`.
///
/// ## Errors
/// Propagates the inner deserializer's error.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
