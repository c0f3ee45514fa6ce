//! # Identifier Newtypes
//!
//! Newtype wrappers for every identifier the report map passes around.
//! A `CellId` cannot be handed to a lookup expecting a `RegressionId`,
//! even though both are strings on the wire.
//!
//! Report generators emit table and regression ids either as JSON strings
//! or as bare numbers (`"tabid": 2` and `"tabid": "2"` both occur). The
//! deserializers accept both and normalize to the string form, so ids are
//! always compared as text.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Wire form of an identifier before normalization.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl RawId {
    fn into_text(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

macro_rules! text_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier, trimming surrounding whitespace.
            pub fn new(id: impl Into<String>) -> Self {
                let id: String = id.into();
                let trimmed = id.trim();
                if trimmed.len() == id.len() {
                    Self(id)
                } else {
                    Self(trimmed.to_string())
                }
            }

            /// Access the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True if the identifier is empty after trimming.
            pub fn is_blank(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self::new(raw.into_text()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

text_id!(
    /// Stable id of a value-bearing table cell (e.g. `c1_r1_c1`).
    CellId
);

text_id!(
    /// Id of one estimated model within a table.
    RegressionId
);

text_id!(
    /// Id of a rendered table.
    TableId
);

text_id!(
    /// Id of one script execution whose console output was captured.
    RunId
);

text_id!(
    /// Map family offered by the report (e.g. `regression`, `reg_classify`).
    MapType
);

text_id!(
    /// Version label of a map within a map family.
    MapVersion
);

/// Display color attached to a regression group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    /// Access the color string as supplied by the report generator.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_normalize_to_same_text() {
        let a: TableId = serde_json::from_str("2").unwrap();
        let b: TableId = serde_json::from_str("\"2\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "2");
    }

    #[test]
    fn ids_are_trimmed() {
        let id: CellId = serde_json::from_str("\" c1_r2_c3 \"").unwrap();
        assert_eq!(id.as_str(), "c1_r2_c3");
        assert_eq!(CellId::new("  x "), CellId::new("x"));
    }

    #[test]
    fn blank_detection() {
        assert!(CellId::new("   ").is_blank());
        assert!(!CellId::new("c1").is_blank());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = RegressionId::new("R1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"R1\"");
    }

    #[test]
    fn negative_numeric_id_accepted() {
        let id: RunId = serde_json::from_str("-3").unwrap();
        assert_eq!(id.as_str(), "-3");
    }

    #[test]
    fn borrow_allows_str_lookup() {
        let mut map = std::collections::HashMap::new();
        map.insert(CellId::new("c1"), 1);
        assert_eq!(map.get("c1"), Some(&1));
    }
}
