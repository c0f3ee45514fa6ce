//! # Error Types
//!
//! The error taxonomy shared by every rrmap crate. All errors derive
//! `Display`/`Error` through `thiserror`.
//!
//! - [`MalformedSnapshot`]: a mapping payload violates a cross-reference
//!   invariant. Callers surface it and may fall back to an empty store.
//! - [`FetchFailure`]: a payload could not be read or decoded. Always names
//!   the attempted path.
//! - [`NotANumber`]: a displayed table value holds no parsable number.
//! - [`CanonicalizationError`]: canonical signature bytes could not be
//!   produced.
//!
//! Unresolved dimension inheritance is deliberately not an error; it is a
//! note attached to grouping output (see `rrmap-classify`).

use thiserror::Error;

use crate::identity::{CellId, RegressionId};

/// Top-level error type for the report map core.
#[derive(Error, Debug)]
pub enum RrmapError {
    /// Snapshot payload violates a structural invariant.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(#[from] MalformedSnapshot),

    /// Snapshot or classification payload could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    /// Displayed value holds no number.
    #[error(transparent)]
    NotANumber(#[from] NotANumber),

    /// Canonical serialization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// A mapping payload whose cross-references are inconsistent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedSnapshot {
    /// The payload is not shaped like a snapshot document at all.
    #[error("payload could not be decoded: {0}")]
    Decode(String),

    /// A cell id key is empty.
    #[error("cell map contains a blank cell id")]
    BlankCellId,

    /// The same cell id appears twice in the cell map.
    #[error("cell {0} appears more than once in the cell map")]
    DuplicateCell(CellId),

    /// A cell points at a code location index past the end of the table.
    #[error("cell {cell_id} refers to code location #{index}, but only {available} exist")]
    LocationIndexOutOfRange {
        /// Cell holding the bad index.
        cell_id: CellId,
        /// The index that was referenced.
        index: usize,
        /// Number of code locations in the payload.
        available: usize,
    },

    /// A code location names a script the report does not contain.
    #[error("{owner} refers to script {script_index}, which is not part of the report")]
    UnknownScript {
        /// What referenced the script (a cell, a code index key, a discrepancy).
        owner: String,
        /// The unresolved script index.
        script_index: u32,
    },

    /// Cell coloring would be ambiguous.
    #[error("cell {cell_id} is claimed by regression groups {first} and {second}")]
    CellInMultipleGroups {
        /// The contested cell.
        cell_id: CellId,
        /// Group that claimed the cell first.
        first: RegressionId,
        /// Group that claimed it again.
        second: RegressionId,
    },

    /// A cell's own regression id and the group listing it disagree.
    #[error("cell {cell_id} names regression {record} but is listed by group {group}")]
    CellGroupMismatch {
        /// The cell in question.
        cell_id: CellId,
        /// Regression id carried by the cell map entry.
        record: RegressionId,
        /// Group whose cell list contains the cell.
        group: RegressionId,
    },

    /// The same cell id has two entries in the cell-to-code index.
    #[error("cell {0} appears more than once in the cell-to-code index")]
    DuplicateLocation(CellId),

    /// A regression group carries an empty cell list.
    #[error("regression group {0} lists no cells")]
    EmptyGroup(RegressionId),

    /// A code index key is not `s<script>_l<line>`.
    #[error("code index key '{0}' is not of the form s<script>_l<line>")]
    BadCodeKey(String),

    /// A discrepancy entry has no cell id.
    #[error("discrepancy #{0} has no cell id")]
    DiscrepancyWithoutCell(usize),
}

/// A payload could not be retrieved from its source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load {path}: {reason}")]
pub struct FetchFailure {
    /// Path (or URL) that was attempted.
    pub path: String,
    /// Why the attempt failed.
    pub reason: String,
}

impl FetchFailure {
    /// Build a failure for `path` with a displayable cause.
    pub fn new(path: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// A displayed value with no parsable number in it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{input}' is not a number")]
pub struct NotANumber {
    /// The displayed text as received.
    pub input: String,
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical signatures; structural
    /// fields are text.
    #[error("float values are not permitted in canonical signatures: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
