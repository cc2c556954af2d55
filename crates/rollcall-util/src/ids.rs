//! Strongly-typed identifiers for rollcall
//!
//! Sessions, records and classes are keyed by database-assigned integers;
//! students carry the external student code printed on their ID cards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// External student code (e.g. "STU-2024-0117")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentId(String);

impl StudentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for StudentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StudentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

macro_rules! row_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

row_id! {
    /// Identifier of a school class
    ClassId
}

row_id! {
    /// Identifier of a concrete attendance session
    SessionId
}

row_id! {
    /// Identifier of a persisted attendance record
    RecordId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_id_equality() {
        let a = StudentId::new("STU-001");
        let b = StudentId::new("STU-001");
        let c = StudentId::new("STU-002");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn row_ids_are_distinct_types() {
        let class = ClassId::new(1);
        let session = SessionId::new(1);
        assert_eq!(class.as_i64(), session.as_i64());
    }

    #[test]
    fn ids_serialize_transparently() {
        let session = SessionId::new(42);
        let json = serde_json::to_string(&session).unwrap();
        assert_eq!(json, "42");

        let student = StudentId::new("STU-001");
        let json = serde_json::to_string(&student).unwrap();
        assert_eq!(json, "\"STU-001\"");

        let parsed: StudentId = serde_json::from_str(&json).unwrap();
        assert_eq!(student, parsed);
    }
}
