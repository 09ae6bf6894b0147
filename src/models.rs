//! Core data models for fabric catalog reports.
//!
//! Series selection, the column values read back from SQLite, and the
//! records that flow from the query executor to the output sinks.

use rusqlite::types::ValueRef;
use serde::{Serialize, Serializer};
use std::fmt;

// ============================================================================
// Series
// ============================================================================

/// The two fabric catalog series. They share one numbering space and are
/// told apart by the `fabric_live` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Series {
    #[default]
    Fabric,
    FabricLive,
}

impl Series {
    pub fn from_live(live: bool) -> Self {
        if live {
            Series::FabricLive
        } else {
            Series::Fabric
        }
    }

    /// Value bound to the `fabric_live` query parameter.
    pub fn is_live(self) -> bool {
        matches!(self, Series::FabricLive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Series::Fabric => "fabric",
            Series::FabricLive => "fabriclive",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Field values
// ============================================================================

/// A single column value as supplied by the query engine.
///
/// Dates live in SQLite as TEXT and stay that way; no coercion happens
/// beyond string conversion at display time.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Field {
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Field::Integer(_) | Field::Real(_))
    }

    /// Text used by CSV and table output. Null renders as an empty cell.
    pub fn display_text(&self) -> String {
        match self {
            Field::Null => String::new(),
            Field::Integer(i) => i.to_string(),
            Field::Real(r) => r.to_string(),
            Field::Text(s) => s.clone(),
            Field::Blob(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }
}

impl From<ValueRef<'_>> for Field {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Field::Null,
            ValueRef::Integer(i) => Field::Integer(i),
            ValueRef::Real(r) => Field::Real(r),
            ValueRef::Text(t) => Field::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Field::Blob(b.to_vec()),
        }
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Text(s.to_string())
    }
}

impl From<i64> for Field {
    fn from(i: i64) -> Self {
        Field::Integer(i)
    }
}

/// Tuple-style rendering: strings quoted, numbers bare, null as `NULL`.
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Null => f.write_str("NULL"),
            Field::Integer(i) => write!(f, "{}", i),
            Field::Real(r) => write!(f, "{}", r),
            Field::Text(s) => write!(f, "{:?}", s),
            Field::Blob(b) => write!(f, "{:?}", String::from_utf8_lossy(b)),
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Null => serializer.serialize_none(),
            Field::Integer(i) => serializer.serialize_i64(*i),
            Field::Real(r) => serializer.serialize_f64(*r),
            Field::Text(s) => serializer.serialize_str(s),
            Field::Blob(b) => serializer.serialize_str(&String::from_utf8_lossy(b)),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// One element of a query result sequence: the column names (only when
/// requested, and always first) or a data row.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Header(Vec<String>),
    Row(Vec<Field>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_flag() {
        assert!(!Series::Fabric.is_live());
        assert!(Series::FabricLive.is_live());
        assert_eq!(Series::from_live(true), Series::FabricLive);
        assert_eq!(Series::from_live(false), Series::Fabric);
        assert_eq!(Series::FabricLive.to_string(), "fabriclive");
    }

    #[test]
    fn test_field_from_value_ref() {
        assert_eq!(Field::from(ValueRef::Null), Field::Null);
        assert_eq!(Field::from(ValueRef::Integer(7)), Field::Integer(7));
        assert_eq!(Field::from(ValueRef::Text(b"2004-01-05")), Field::from("2004-01-05"));
    }

    #[test]
    fn test_display_text() {
        assert_eq!(Field::Null.display_text(), "");
        assert_eq!(Field::Integer(42).display_text(), "42");
        assert_eq!(Field::Real(1.5).display_text(), "1.5");
        assert_eq!(Field::from("a, b").display_text(), "a, b");
    }

    #[test]
    fn test_tuple_display() {
        assert_eq!(Field::Null.to_string(), "NULL");
        assert_eq!(Field::Integer(3).to_string(), "3");
        assert_eq!(Field::from("say \"hi\"").to_string(), r#""say \"hi\"""#);
    }

    #[test]
    fn test_serialize() {
        let row = vec![Field::Integer(1), Field::Null, Field::from("x")];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"[1,null,"x"]"#);
    }
}
