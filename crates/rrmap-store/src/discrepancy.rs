//! # Discrepancy Index
//!
//! Known mismatches between the value printed in a table and the value
//! found in the execution log. The index is built once per snapshot from
//! the payload's `wrong_number_info` and never mutated; switching snapshots
//! replaces it along with everything else.
//!
//! The index also assembles the per-cell annotation list shown as a cell
//! title: structural conflicts across map versions first, then the
//! discrepancy, then any externally supplied issues.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use rrmap_core::{CellId, CodeLocation, RunId, TableId};

use crate::payload::OrderedEntries;

/// A detected mismatch between table and log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscrepancyCase {
    /// Affected cell.
    pub cell_id: CellId,
    /// Table of the cell.
    pub table_id: TableId,
    /// Value as printed in the table.
    pub displayed_value: String,
    /// Value found in the log.
    pub log_value: String,
    /// Run whose log was compared.
    pub run_id: Option<RunId>,
    /// Line that printed the value.
    pub code_location: Option<CodeLocation>,
}

impl DiscrepancyCase {
    /// One-line description used in cell annotations.
    pub fn summary(&self) -> String {
        format!(
            "Table shows {} but the log shows {}",
            self.displayed_value, self.log_value
        )
    }
}

/// Discrepancies by cell and by table.
#[derive(Debug, Clone, Default)]
pub struct DiscrepancyIndex {
    by_table: HashMap<TableId, Vec<DiscrepancyCase>>,
    by_cell: HashMap<CellId, (TableId, usize)>,
    len: usize,
}

impl DiscrepancyIndex {
    /// Index `cases`. Per-table lists keep input order; when a cell appears
    /// twice the first case is the one returned by cell lookup.
    pub fn build(cases: Vec<DiscrepancyCase>) -> Self {
        let mut index = Self {
            len: cases.len(),
            ..Self::default()
        };
        for case in cases {
            let list = index.by_table.entry(case.table_id.clone()).or_default();
            index
                .by_cell
                .entry(case.cell_id.clone())
                .or_insert_with(|| (case.table_id.clone(), list.len()));
            list.push(case);
        }
        index
    }

    /// Discrepancies of one table, in input order.
    pub fn for_table(&self, table_id: &TableId) -> &[DiscrepancyCase] {
        self.by_table.get(table_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The discrepancy recorded for a cell.
    pub fn for_cell(&self, cell_id: &CellId) -> Option<&DiscrepancyCase> {
        let (table_id, pos) = self.by_cell.get(cell_id)?;
        self.by_table.get(table_id)?.get(*pos)
    }

    /// Tables that have at least one discrepancy.
    pub fn tables(&self) -> impl Iterator<Item = &TableId> {
        self.by_table.keys()
    }

    /// Total number of cases.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no discrepancies were recorded.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Annotation lines for a cell, in display order.
    pub fn annotations(&self, cell_id: &CellId, sources: &AnnotationSources<'_>) -> Vec<CellAnnotation> {
        let mut out = Vec::new();
        if let Some(notes) = sources.conflicts {
            out.extend(notes.get(cell_id).iter().map(|text| CellAnnotation {
                kind: AnnotationKind::StructuralConflict,
                text: text.clone(),
            }));
        }
        if let Some(case) = self.for_cell(cell_id) {
            out.push(CellAnnotation {
                kind: AnnotationKind::Discrepancy,
                text: case.summary(),
            });
        }
        if let Some(notes) = sources.issues {
            out.extend(notes.get(cell_id).iter().map(|text| CellAnnotation {
                kind: AnnotationKind::Issue,
                text: text.clone(),
            }));
        }
        out
    }

    /// Annotation lines joined into one tooltip, or `None` when there are none.
    pub fn tooltip(&self, cell_id: &CellId, sources: &AnnotationSources<'_>) -> Option<String> {
        let lines = self.annotations(cell_id, sources);
        if lines.is_empty() {
            return None;
        }
        Some(
            lines
                .iter()
                .map(|a| a.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

/// Origin of an annotation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// Structure differs between map versions.
    StructuralConflict,
    /// Table and log disagree.
    Discrepancy,
    /// Issue raised by an external evaluator.
    Issue,
}

/// One annotation line for a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellAnnotation {
    /// Where the line came from.
    pub kind: AnnotationKind,
    /// Text to show.
    pub text: String,
}

/// Free-text notes keyed by cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellNotes {
    notes: HashMap<CellId, Vec<String>>,
}

impl CellNotes {
    /// Empty note map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a note for a cell.
    pub fn add(&mut self, cell_id: CellId, note: impl Into<String>) {
        self.notes.entry(cell_id).or_default().push(note.into());
    }

    /// Notes of a cell, in insertion order.
    pub fn get(&self, cell_id: &CellId) -> &[String] {
        self.notes.get(cell_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of annotated cells.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// True if no cell carries a note.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Each cell maps to a single note or a list of notes.
impl<'de> Deserialize<'de> for CellNotes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawNotes {
            One(String),
            Many(Vec<String>),
        }

        let entries = OrderedEntries::<CellId, RawNotes>::deserialize(deserializer)?.0;
        let mut notes = Self::new();
        for (cell_id, raw) in entries {
            let items = match raw {
                RawNotes::One(s) => vec![s],
                RawNotes::Many(v) => v,
            };
            for item in items.into_iter().filter(|s| !s.trim().is_empty()) {
                notes.add(cell_id.clone(), item);
            }
        }
        Ok(notes)
    }
}

/// Externally supplied annotation maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationSources<'a> {
    /// Structural cross-version conflicts.
    pub conflicts: Option<&'a CellNotes>,
    /// Per-cell issues from an evaluator.
    pub issues: Option<&'a CellNotes>,
}
