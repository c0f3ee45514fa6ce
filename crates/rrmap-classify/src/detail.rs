//! # Regression Detail and Table Overview
//!
//! Data behind the classification panel: the overview of a table (its
//! structural groups) when no regression is selected, and the detail of one
//! regression otherwise. Rendering is left to the viewer.

use rrmap_core::{CanonicalizationError, CellId, RegressionId, TableId};

use crate::dataset::{ClassificationDataset, ClassificationState};
use crate::grouper::{group, DimensionSource, GroupingReport, SiblingIndex};
use crate::record::{DimensionSpec, RegressionStructuralRecord, TagKind};

/// Detail view of one regression.
#[derive(Debug, Clone)]
pub struct RegressionDetail<'a> {
    /// The regression's record.
    pub record: &'a RegressionStructuralRecord,
    /// Dimensions after inheritance.
    pub dimensions: &'a [DimensionSpec],
    /// Where `dimensions` came from.
    pub dimension_source: DimensionSource,
}

impl<'a> RegressionDetail<'a> {
    /// Build the detail of `(table_id, regression_id)`.
    pub fn find(
        dataset: &'a ClassificationDataset,
        table_id: &TableId,
        regression_id: &RegressionId,
    ) -> Option<Self> {
        let record = dataset.record(table_id, regression_id)?;
        let resolved = SiblingIndex::new(dataset.records()).resolve(record);
        Some(Self {
            record,
            dimensions: resolved.dimensions,
            dimension_source: resolved.source,
        })
    }

    /// Tags with their display category.
    pub fn tags(&self) -> Vec<(&'a str, TagKind)> {
        self.record
            .tags
            .iter()
            .map(|t| (t.as_str(), TagKind::of(t)))
            .collect()
    }

    /// Cells referenced by the detail (variable estimates, then reported
    /// statistics), without duplicates. Selecting one of these rows
    /// selects the cell.
    pub fn linked_cells(&self) -> Vec<&'a CellId> {
        let estimates = self.record.variables.iter().filter_map(|v| v.estimate_cell.as_ref());
        let stats = self.record.reported_stats.iter().filter_map(|s| s.cell_id.as_ref());
        let mut out: Vec<&CellId> = Vec::new();
        for cell in estimates.chain(stats) {
            if !out.contains(&cell) {
                out.push(cell);
            }
        }
        out
    }
}

/// What the overview panel can show for a table.
#[derive(Debug, Clone)]
pub enum TableOverview {
    /// The report has no classification data, or it failed to load.
    Unavailable,
    /// The dataset is still being fetched.
    Loading,
    /// The dataset holds no records for the table.
    NoRecords(TableId),
    /// Structural groups of the table.
    Groups(GroupingReport),
}

/// Build the overview of a table from the current classification state.
pub fn table_overview(state: &ClassificationState, table_id: &TableId) -> Result<TableOverview, CanonicalizationError> {
    let dataset = match state {
        ClassificationState::Loaded(dataset) => dataset,
        ClassificationState::Loading { .. } => return Ok(TableOverview::Loading),
        ClassificationState::Absent | ClassificationState::Failed(_) => return Ok(TableOverview::Unavailable),
    };
    let records = dataset.table_records(table_id);
    if records.is_empty() {
        return Ok(TableOverview::NoRecords(table_id.clone()));
    }
    group(&records).map(TableOverview::Groups)
}
