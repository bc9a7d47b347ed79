//! Database enum types with Diesel serialization.
//!
//! This module provides type-safe enum wrappers for text columns with a fixed
//! vocabulary. Each enum implements `ToSql` and `FromSql` for automatic
//! conversion between Rust and `PostgreSQL`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::Write;

/// Custom event field type.
///
/// Maps to `custom_event_field.field_type`. Values written by a newer release
/// are preserved as `Other` rather than failing the whole row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum FieldType {
    Text,
    SingleSelect,
    MultiSelect,
    Other(String),
}

impl ToSql<Text, Pg> for FieldType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for FieldType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let s = std::str::from_utf8(bytes.as_bytes())?;
        Ok(Self::from_wire(s))
    }
}

impl FieldType {
    /// Returns the database and wire string representation of this field type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::SingleSelect => "s_select",
            Self::MultiSelect => "m_select",
            Self::Other(s) => s,
        }
    }

    /// Maps any stored string onto a field type, keeping unknown values.
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        Self::parse_known(s).unwrap_or_else(|| Self::Other(s.to_owned()))
    }

    /// Maps a client-supplied string onto one of the supported field types.
    #[must_use]
    pub fn parse_known(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "s_select" => Some(Self::SingleSelect),
            "m_select" => Some(Self::MultiSelect),
            _ => None,
        }
    }

    /// Whether values of this type reference options.
    #[must_use]
    pub const fn is_select(&self) -> bool {
        matches!(self, Self::SingleSelect | Self::MultiSelect)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Access level an access key grants on one sub-calendar.
///
/// Maps to `sub_calendar_permission.access_type` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    ReadOnly,
    Modify,
}

impl ToSql<Text, Pg> for AccessType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for AccessType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"read_only" => Ok(Self::ReadOnly),
            b"modify" => Ok(Self::Modify),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl AccessType {
    /// Returns the database string representation of this access type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "read_only",
            Self::Modify => "modify",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
