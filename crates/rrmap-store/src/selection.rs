//! # Selection State
//!
//! What the reader is looking at: a table, a regression, a run and a cell.
//! The three panels (code and log, table, classification) all render from
//! this one value. Missing regression or run ids are inferred from the
//! active store when a cell is selected.

use std::collections::BTreeSet;

use rrmap_core::{CellId, CodeLocation, RegressionId, RunId, TableId};
use rrmap_reconcile::{Annotation, LogCache};

use crate::store::{CodeLink, MappingStore};

/// Current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected table.
    pub table_id: Option<TableId>,
    /// Selected regression.
    pub regression_id: Option<RegressionId>,
    /// Run whose log is shown.
    pub run_id: Option<RunId>,
    /// Selected cell.
    pub cell_id: Option<CellId>,
}

/// What the classification panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelFocus {
    /// Detail of one regression.
    Detail {
        /// Table of the regression.
        table_id: TableId,
        /// The regression.
        regression_id: RegressionId,
    },
    /// Overview of a table's regressions.
    Summary {
        /// The table.
        table_id: TableId,
    },
    /// Nothing selected.
    Nothing,
}

/// Entities to highlight for the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlights<'a> {
    /// Code line of the selected cell.
    pub code_location: Option<&'a CodeLocation>,
    /// Cells of the selected regression.
    pub group_cells: Option<&'a BTreeSet<CellId>>,
    /// The selected cell.
    pub cell_id: Option<&'a CellId>,
}

impl Selection {
    /// Select a cell. Regression and run are taken from the store.
    pub fn select_cell(&mut self, store: &MappingStore, table_id: Option<TableId>, cell_id: CellId) {
        if table_id.is_some() {
            self.table_id = table_id;
        }
        self.regression_id = None;
        self.run_id = None;
        self.cell_id = Some(cell_id);
        self.infer_from(store);
    }

    /// Select a regression of a table.
    pub fn select_regression(&mut self, table_id: TableId, regression_id: RegressionId) {
        *self = Self {
            table_id: Some(table_id),
            regression_id: Some(regression_id),
            ..Self::default()
        };
    }

    /// Select a whole table.
    pub fn select_table(&mut self, table_id: TableId) {
        *self = Self {
            table_id: Some(table_id),
            ..Self::default()
        };
    }

    /// Select a code line and return the cells it produced.
    pub fn select_code_line<'s>(&mut self, store: &'s MappingStore, script_index: u32, line: u32) -> Option<&'s CodeLink> {
        let link = store.code_to_cells(script_index, line)?;
        *self = Self {
            table_id: link.table_id.clone().or_else(|| self.table_id.take()),
            regression_id: link.regression_id.clone(),
            ..Self::default()
        };
        Some(link)
    }

    /// Drop the regression and cell, keeping the table.
    pub fn back_to_summary(&mut self) {
        self.regression_id = None;
        self.cell_id = None;
    }

    /// Fill a missing regression or run from the selected cell's record.
    pub fn infer_from(&mut self, store: &MappingStore) {
        let Some(cell) = self.cell_id.as_ref().and_then(|id| store.cell(id)) else {
            return;
        };
        if self.regression_id.is_none() {
            self.regression_id = cell.regression_id.clone();
        }
        if self.run_id.is_none() {
            self.run_id = cell.code_location.as_ref().and_then(|l| l.run_id.clone());
        }
        if self.table_id.is_none() {
            self.table_id = store.group_of_cell(&cell.cell_id).and_then(|g| g.table_id.clone());
        }
    }

    /// What the classification panel should show.
    pub fn focus(&self) -> PanelFocus {
        match (&self.table_id, &self.regression_id) {
            (Some(table_id), Some(regression_id)) => PanelFocus::Detail {
                table_id: table_id.clone(),
                regression_id: regression_id.clone(),
            },
            (Some(table_id), None) => PanelFocus::Summary {
                table_id: table_id.clone(),
            },
            (None, _) => PanelFocus::Nothing,
        }
    }

    /// Entities to highlight in the table and code panels.
    pub fn highlights<'s>(&'s self, store: &'s MappingStore) -> Highlights<'s> {
        Highlights {
            code_location: self.cell_id.as_ref().and_then(|c| store.cell_to_code(c)),
            group_cells: self
                .regression_id
                .as_ref()
                .and_then(|r| store.regression_cells(r)),
            cell_id: self.cell_id.as_ref(),
        }
    }

    /// Highlight the selected cell's value in its run's log.
    ///
    /// `displayed` is the cell text as rendered; when absent the value
    /// recorded in the store is used.
    pub fn highlight_log<'c>(
        &self,
        store: &MappingStore,
        cache: &'c mut LogCache,
        displayed: Option<&str>,
    ) -> Option<&'c Annotation> {
        let run_id = self.run_id.as_ref()?;
        let recorded = self
            .cell_id
            .as_ref()
            .and_then(|c| store.cell(c))
            .and_then(|c| c.raw_display_value.as_deref());
        let displayed = displayed.or(recorded)?;
        cache.highlight(run_id, displayed)
    }
}
