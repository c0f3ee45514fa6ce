//! # Code Locations
//!
//! A `CodeLocation` names one physical line in one script, optionally tied
//! to the run whose log captured that line's output. The viewer addresses
//! lines by the key `s<script>_l<line>`; [`CodeKey`] is the typed form of
//! that key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MalformedSnapshot;
use crate::identity::RunId;

/// One line in one script execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeLocation {
    /// Run whose log covers this line. `None` for static-only mappings.
    pub run_id: Option<RunId>,
    /// Index of the script within the report.
    pub script_index: u32,
    /// Line number within the script.
    pub line: u32,
}

impl CodeLocation {
    /// A location with no associated run.
    pub fn new(script_index: u32, line: u32) -> Self {
        Self {
            run_id: None,
            script_index,
            line,
        }
    }

    /// Attach a run id.
    pub fn with_run(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// The `(script, line)` key of this location.
    pub fn key(&self) -> CodeKey {
        CodeKey {
            script_index: self.script_index,
            line: self.line,
        }
    }
}

/// `(script, line)` pair, rendered as `s<script>_l<line>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodeKey {
    /// Index of the script within the report.
    pub script_index: u32,
    /// Line number within the script.
    pub line: u32,
}

impl CodeKey {
    /// Build a key from its parts.
    pub fn new(script_index: u32, line: u32) -> Self {
        Self { script_index, line }
    }
}

impl fmt::Display for CodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}_l{}", self.script_index, self.line)
    }
}

impl FromStr for CodeKey {
    type Err = MalformedSnapshot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || MalformedSnapshot::BadCodeKey(s.to_string());
        let rest = s.strip_prefix('s').ok_or_else(bad)?;
        let (script, line) = rest.split_once("_l").ok_or_else(bad)?;
        Ok(Self {
            script_index: script.parse().map_err(|_| bad())?,
            line: line.parse().map_err(|_| bad())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_renders_viewer_format() {
        assert_eq!(CodeLocation::new(2, 40).key().to_string(), "s2_l40");
    }

    #[test]
    fn key_parses_back() {
        let key: CodeKey = "s12_l7".parse().unwrap();
        assert_eq!(key, CodeKey::new(12, 7));
    }

    #[test]
    fn malformed_keys_rejected() {
        for bad in ["", "s2", "l40", "s_l", "sx_l1", "s1_lx", "2_l40", "s-1_l3"] {
            assert!(
                matches!(bad.parse::<CodeKey>(), Err(MalformedSnapshot::BadCodeKey(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn run_is_optional() {
        let loc = CodeLocation::new(1, 3);
        assert!(loc.run_id.is_none());
        let loc = loc.with_run(RunId::new("run_7"));
        assert_eq!(loc.run_id.as_ref().map(|r| r.as_str()), Some("run_7"));
    }
}
