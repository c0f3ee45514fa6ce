//! # Mapping Store
//!
//! The validated cross-reference graph of one `(map_type, version)` pair:
//! cells, their code locations, regression groups, the code-line inverse
//! index and the discrepancy index.
//!
//! ## Validation
//!
//! [`MappingStore::load`] rejects payloads whose cross-references are
//! inconsistent with a [`MalformedSnapshot`]. It never falls back on its
//! own; callers decide whether to continue with [`MappingStore::empty`].
//!
//! ## Code locations
//!
//! A cell's location comes from `cell_to_code_idx` when the cell has an
//! entry there, otherwise from the `script_num`/`code_line` pair in its
//! `cell_map` entry. Code lines that cells point at but that have no
//! `code_to_cells` entry get a derived one.
//!
//! Each cell id may appear once in `cell_map` and once in
//! `cell_to_code_idx`. A cell's `regid` must agree with the group whose
//! `cell_ids` list it.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use rrmap_core::{CellId, CodeKey, CodeLocation, Color, MalformedSnapshot, RegressionId, RunId, TableId};

use crate::discrepancy::{DiscrepancyCase, DiscrepancyIndex};
use crate::payload::{RawCodeLocation, SnapshotPayload};

/// Script indexes present in the report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportScripts {
    indexes: BTreeSet<u32>,
}

impl ReportScripts {
    /// Scripts with the given indexes.
    pub fn new(indexes: impl IntoIterator<Item = u32>) -> Self {
        Self {
            indexes: indexes.into_iter().collect(),
        }
    }

    /// Scripts numbered `1..=count`, the numbering used by report generators.
    pub fn numbered(count: u32) -> Self {
        Self::new(1..=count)
    }

    /// True if the report contains script `index`.
    pub fn contains(&self, index: u32) -> bool {
        self.indexes.contains(&index)
    }

    fn check(&self, location: &CodeLocation, owner: impl FnOnce() -> String) -> Result<(), MalformedSnapshot> {
        if self.contains(location.script_index) {
            Ok(())
        } else {
            Err(MalformedSnapshot::UnknownScript {
                owner: owner(),
                script_index: location.script_index,
            })
        }
    }
}

/// One value-bearing table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellRecord {
    /// Cell id.
    pub cell_id: CellId,
    /// Regression the cell belongs to.
    pub regression_id: Option<RegressionId>,
    /// Line that produced the value.
    pub code_location: Option<CodeLocation>,
    /// Value as rendered in the table.
    pub raw_display_value: Option<String>,
}

/// Cells of one estimated model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegressionGroup {
    /// Regression id.
    pub regression_id: RegressionId,
    /// Table the regression is reported in.
    pub table_id: Option<TableId>,
    /// Static coloring.
    pub color: Option<Color>,
    /// Member cells.
    pub cell_ids: BTreeSet<CellId>,
}

/// Cells produced by one code line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeLink {
    /// Table holding the cells.
    pub table_id: Option<TableId>,
    /// Regression estimated on that line.
    pub regression_id: Option<RegressionId>,
    /// Cells in payload order.
    pub cell_ids: Vec<CellId>,
    /// True if the entry was derived from cell locations rather than read
    /// from the payload.
    pub derived: bool,
}

/// Validated lookups over one mapping payload.
#[derive(Debug, Clone, Default)]
pub struct MappingStore {
    cells: HashMap<CellId, CellRecord>,
    cell_order: Vec<CellId>,
    groups: Vec<RegressionGroup>,
    group_by_id: HashMap<RegressionId, usize>,
    group_by_cell: HashMap<CellId, usize>,
    code_index: HashMap<CodeKey, CodeLink>,
    discrepancies: DiscrepancyIndex,
}

impl MappingStore {
    /// A store in which every lookup reports "not found".
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode and validate a JSON payload.
    pub fn from_json(text: &str, scripts: &ReportScripts) -> Result<Self, MalformedSnapshot> {
        Self::load(&SnapshotPayload::from_json(text)?, scripts)
    }

    /// Validate a payload and build every index.
    pub fn load(payload: &SnapshotPayload, scripts: &ReportScripts) -> Result<Self, MalformedSnapshot> {
        let mut store = Self::empty();
        store.load_cells(payload, scripts)?;
        store.load_groups(payload)?;
        store.load_code_index(payload, scripts)?;
        store.derive_code_links();
        store.discrepancies = DiscrepancyIndex::build(discrepancy_cases(payload, &store, scripts)?);

        tracing::debug!(
            cells = store.cells.len(),
            groups = store.groups.len(),
            code_lines = store.code_index.len(),
            discrepancies = store.discrepancies.len(),
            "mapping snapshot validated"
        );
        Ok(store)
    }

    fn load_cells(&mut self, payload: &SnapshotPayload, scripts: &ReportScripts) -> Result<(), MalformedSnapshot> {
        let mut cell_runs: HashMap<&CellId, &RunId> = HashMap::new();
        for (cell_id, entry) in &payload.cell_map {
            if cell_id.is_blank() {
                return Err(MalformedSnapshot::BlankCellId);
            }
            if self.cells.contains_key(cell_id) {
                return Err(MalformedSnapshot::DuplicateCell(cell_id.clone()));
            }
            if let Some(run_id) = &entry.runid {
                cell_runs.insert(cell_id, run_id);
            }
            let code_location = match (entry.script_num, entry.code_line) {
                (Some(script), Some(line)) => Some(CodeLocation {
                    run_id: entry.runid.clone(),
                    script_index: script,
                    line,
                }),
                _ => None,
            };
            self.insert_cell(CellRecord {
                cell_id: cell_id.clone(),
                regression_id: entry.regid.clone(),
                code_location,
                raw_display_value: entry.value.clone(),
            });
        }

        let available = payload.code_locations.len();
        let mut located: HashSet<&CellId> = HashSet::with_capacity(payload.cell_to_code_idx.len());
        for (cell_id, index) in &payload.cell_to_code_idx {
            if cell_id.is_blank() {
                return Err(MalformedSnapshot::BlankCellId);
            }
            if !located.insert(cell_id) {
                return Err(MalformedSnapshot::DuplicateLocation(cell_id.clone()));
            }
            let RawCodeLocation(run_id, script_index, line) =
                payload
                    .code_locations
                    .get(*index)
                    .ok_or_else(|| MalformedSnapshot::LocationIndexOutOfRange {
                        cell_id: cell_id.clone(),
                        index: *index,
                        available,
                    })?;
            let location = CodeLocation {
                run_id: run_id.clone().or_else(|| cell_runs.get(cell_id).map(|r| (*r).clone())),
                script_index: *script_index,
                line: *line,
            };
            match self.cells.entry(cell_id.clone()) {
                Entry::Occupied(mut slot) => slot.get_mut().code_location = Some(location),
                Entry::Vacant(slot) => {
                    slot.insert(CellRecord {
                        cell_id: cell_id.clone(),
                        regression_id: None,
                        code_location: Some(location),
                        raw_display_value: None,
                    });
                    self.cell_order.push(cell_id.clone());
                }
            }
        }

        for cell_id in &self.cell_order {
            if let Some(location) = self.cells.get(cell_id).and_then(|c| c.code_location.as_ref()) {
                scripts.check(location, || format!("cell {cell_id}"))?;
            }
        }
        Ok(())
    }

    fn insert_cell(&mut self, record: CellRecord) {
        self.cell_order.push(record.cell_id.clone());
        self.cells.insert(record.cell_id.clone(), record);
    }

    fn load_groups(&mut self, payload: &SnapshotPayload) -> Result<(), MalformedSnapshot> {
        for (regression_id, entry) in &payload.reg_info {
            let cell_ids: Vec<CellId> = match &entry.cell_ids {
                Some(ids) if ids.is_empty() => {
                    return Err(MalformedSnapshot::EmptyGroup(regression_id.clone()));
                }
                Some(ids) => ids.clone(),
                None => Vec::new(),
            };
            let slot = match self.group_by_id.get(regression_id) {
                Some(&slot) => slot,
                None => {
                    self.groups.push(RegressionGroup {
                        regression_id: regression_id.clone(),
                        table_id: entry.tabid.clone(),
                        color: entry.color.clone(),
                        cell_ids: BTreeSet::new(),
                    });
                    self.group_by_id.insert(regression_id.clone(), self.groups.len() - 1);
                    self.groups.len() - 1
                }
            };
            for cell_id in cell_ids {
                if let Some(&owner) = self.group_by_cell.get(&cell_id) {
                    if owner != slot {
                        return Err(MalformedSnapshot::CellInMultipleGroups {
                            cell_id,
                            first: self.groups[owner].regression_id.clone(),
                            second: regression_id.clone(),
                        });
                    }
                }
                self.group_by_cell.insert(cell_id.clone(), slot);
                if let Some(cell) = self.cells.get_mut(&cell_id) {
                    if let Some(record) = cell.regression_id.as_ref().filter(|r| *r != regression_id) {
                        return Err(MalformedSnapshot::CellGroupMismatch {
                            cell_id: cell_id.clone(),
                            record: record.clone(),
                            group: regression_id.clone(),
                        });
                    }
                    cell.regression_id.get_or_insert_with(|| regression_id.clone());
                }
                self.groups[slot].cell_ids.insert(cell_id);
            }
        }
        Ok(())
    }

    fn load_code_index(&mut self, payload: &SnapshotPayload, scripts: &ReportScripts) -> Result<(), MalformedSnapshot> {
        for (raw_key, entry) in &payload.code_to_cells {
            let key: CodeKey = raw_key.parse()?;
            scripts.check(&CodeLocation::new(key.script_index, key.line), || {
                format!("code index {raw_key}")
            })?;
            self.code_index.entry(key).or_insert_with(|| CodeLink {
                table_id: entry.tabid.clone(),
                regression_id: entry.regid.clone(),
                cell_ids: entry.cell_ids.clone().unwrap_or_default(),
                derived: false,
            });
        }
        Ok(())
    }

    /// Add inverse entries for lines that cells point at but the payload
    /// does not index.
    fn derive_code_links(&mut self) {
        let mut slots: HashMap<CodeKey, usize> = HashMap::new();
        let mut pending: Vec<(CodeKey, Vec<&CellRecord>)> = Vec::new();
        for cell_id in &self.cell_order {
            let Some(cell) = self.cells.get(cell_id) else {
                continue;
            };
            let Some(location) = &cell.code_location else {
                continue;
            };
            let key = location.key();
            if self.code_index.contains_key(&key) {
                continue;
            }
            match slots.get(&key) {
                Some(&slot) => pending[slot].1.push(cell),
                None => {
                    slots.insert(key, pending.len());
                    pending.push((key, vec![cell]));
                }
            }
        }

        let mut derived = Vec::with_capacity(pending.len());
        for (key, cells) in pending {
            let regressions: HashSet<Option<&RegressionId>> =
                cells.iter().map(|c| c.regression_id.as_ref()).collect();
            let regression_id = match regressions.into_iter().collect::<Vec<_>>().as_slice() {
                [Some(only)] => Some((*only).clone()),
                _ => None,
            };
            let table_id = regression_id
                .as_ref()
                .and_then(|r| self.group_by_id.get(r))
                .and_then(|&slot| self.groups[slot].table_id.clone());
            derived.push((
                key,
                CodeLink {
                    table_id,
                    regression_id,
                    cell_ids: cells.iter().map(|c| c.cell_id.clone()).collect(),
                    derived: true,
                },
            ));
        }
        self.code_index.extend(derived);
    }

    /// Code location of a cell.
    pub fn cell_to_code(&self, cell_id: &CellId) -> Option<&CodeLocation> {
        self.cells.get(cell_id)?.code_location.as_ref()
    }

    /// Cells produced by a code line.
    pub fn code_to_cells(&self, script_index: u32, line: u32) -> Option<&CodeLink> {
        self.code_index.get(&CodeKey::new(script_index, line))
    }

    /// Cells produced by a code line, addressed by key.
    pub fn code_link(&self, key: &CodeKey) -> Option<&CodeLink> {
        self.code_index.get(key)
    }

    /// Cells of a regression.
    pub fn regression_cells(&self, regression_id: &RegressionId) -> Option<&BTreeSet<CellId>> {
        self.regression_group(regression_id).map(|g| &g.cell_ids)
    }

    /// A regression group by id.
    pub fn regression_group(&self, regression_id: &RegressionId) -> Option<&RegressionGroup> {
        self.group_by_id.get(regression_id).map(|&slot| &self.groups[slot])
    }

    /// The group claiming a cell.
    pub fn group_of_cell(&self, cell_id: &CellId) -> Option<&RegressionGroup> {
        self.group_by_cell.get(cell_id).map(|&slot| &self.groups[slot])
    }

    /// Discrepancies of a table, in payload order.
    pub fn discrepancies_for_table(&self, table_id: &TableId) -> &[DiscrepancyCase] {
        self.discrepancies.for_table(table_id)
    }

    /// Discrepancy recorded for a cell.
    pub fn discrepancies_for_cell(&self, cell_id: &CellId) -> Option<&DiscrepancyCase> {
        self.discrepancies.for_cell(cell_id)
    }

    /// The discrepancy index.
    pub fn discrepancies(&self) -> &DiscrepancyIndex {
        &self.discrepancies
    }

    /// A cell record.
    pub fn cell(&self, cell_id: &CellId) -> Option<&CellRecord> {
        self.cells.get(cell_id)
    }

    /// Every cell, in payload order.
    pub fn cells(&self) -> impl Iterator<Item = &CellRecord> {
        self.cell_order.iter().filter_map(|id| self.cells.get(id))
    }

    /// Every regression group, in payload order.
    pub fn groups(&self) -> &[RegressionGroup] {
        &self.groups
    }

    /// Cells to paint with their group's color.
    pub fn colored_cells(&self) -> Vec<(&CellId, &Color)> {
        self.groups
            .iter()
            .filter_map(|g| g.color.as_ref().map(|color| (g, color)))
            .flat_map(|(g, color)| g.cell_ids.iter().map(move |c| (c, color)))
            .collect()
    }

    /// True if the store holds no cells, groups or code links.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.groups.is_empty() && self.code_index.is_empty() && self.discrepancies.is_empty()
    }
}

fn discrepancy_cases(
    payload: &SnapshotPayload,
    store: &MappingStore,
    scripts: &ReportScripts,
) -> Result<Vec<DiscrepancyCase>, MalformedSnapshot> {
    let mut cases = Vec::with_capacity(payload.wrong_number_info.len());
    for (position, entry) in payload.wrong_number_info.iter().enumerate() {
        let cell_id = entry
            .cellid
            .clone()
            .ok_or(MalformedSnapshot::DiscrepancyWithoutCell(position))?;
        let code_location = match (entry.script_num, entry.code_line) {
            (Some(script), Some(line)) => Some(CodeLocation {
                run_id: entry.runid.clone(),
                script_index: script,
                line,
            }),
            _ => store.cell_to_code(&cell_id).cloned(),
        };
        if let Some(location) = &code_location {
            scripts.check(location, || format!("discrepancy for cell {cell_id}"))?;
        }
        let run_id = entry
            .runid
            .clone()
            .or_else(|| code_location.as_ref().and_then(|l| l.run_id.clone()));
        cases.push(DiscrepancyCase {
            cell_id,
            table_id: entry.tabid.clone(),
            displayed_value: entry.wrong_number.clone().unwrap_or_default(),
            log_value: entry.number_in_log.clone().unwrap_or_default(),
            run_id,
            code_location,
        });
    }
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripts() -> ReportScripts {
        ReportScripts::numbered(3)
    }

    fn load(text: &str) -> Result<MappingStore, MalformedSnapshot> {
        MappingStore::from_json(text, &scripts())
    }

    const PAYLOAD: &str = r##"{
        "cell_map": {
            "c1_r1_c1": {"regid": "R1", "runid": "run_2", "value": "0.123"},
            "c1_r2_c1": {"regid": "R1", "script_num": 2, "code_line": 40},
            "c1_r1_c2": {"script_num": 3, "code_line": 12}
        },
        "reg_info": {
            "R1": {"color": "#ffeeaa", "cell_ids": "c1_r1_c1,c1_r2_c1", "tabid": 1},
            "R2": {"cell_ids": ["c1_r1_c2"], "tabid": 1}
        },
        "code_locations": [["run_2", 2, 40], [null, 3, 12]],
        "cell_to_code_idx": {"c1_r1_c1": 0},
        "code_to_cells": {"s2_l40": {"tabid": 1, "regid": "R1", "cell_ids": "c1_r1_c1,c1_r2_c1"}},
        "wrong_number_info": [
            {"cellid": "c1_r1_c1", "tabid": 1, "wrong_number": "0.123", "number_in_log": "0.1234"}
        ]
    }"##;

    #[test]
    fn lookups_on_valid_payload() {
        let store = load(PAYLOAD).unwrap();
        let loc = store.cell_to_code(&CellId::new("c1_r1_c1")).unwrap();
        assert_eq!((loc.script_index, loc.line), (2, 40));
        assert_eq!(loc.run_id.as_ref().map(|r| r.as_str()), Some("run_2"));

        let link = store.code_to_cells(2, 40).unwrap();
        assert_eq!(link.regression_id, Some(RegressionId::new("R1")));
        assert!(!link.derived);

        let cells = store.regression_cells(&RegressionId::new("R1")).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(
            store.group_of_cell(&CellId::new("c1_r1_c2")).map(|g| g.regression_id.as_str()),
            Some("R2")
        );

        let case = store.discrepancies_for_cell(&CellId::new("c1_r1_c1")).unwrap();
        assert_eq!(case.log_value, "0.1234");
        assert_eq!(case.code_location.as_ref().map(|l| l.line), Some(40));
        assert_eq!(store.discrepancies_for_table(&TableId::new("1")).len(), 1);
    }

    #[test]
    fn group_membership_fills_missing_regression() {
        let store = load(PAYLOAD).unwrap();
        let cell = store.cell(&CellId::new("c1_r1_c2")).unwrap();
        assert_eq!(cell.regression_id, Some(RegressionId::new("R2")));
    }

    #[test]
    fn unindexed_lines_get_derived_links() {
        let store = load(PAYLOAD).unwrap();
        let link = store.code_to_cells(3, 12).unwrap();
        assert!(link.derived);
        assert_eq!(link.cell_ids, vec![CellId::new("c1_r1_c2")]);
        assert_eq!(link.regression_id, Some(RegressionId::new("R2")));
        assert_eq!(link.table_id, Some(TableId::new("1")));
    }

    #[test]
    fn derived_link_without_agreement_has_no_regression() {
        let store = load(
            r#"{"cell_map": {
                "a": {"regid": "R1", "script_num": 1, "code_line": 5},
                "b": {"regid": "R2", "script_num": 1, "code_line": 5}
            }}"#,
        )
        .unwrap();
        let link = store.code_to_cells(1, 5).unwrap();
        assert_eq!(link.cell_ids.len(), 2);
        assert!(link.regression_id.is_none());
    }

    #[test]
    fn colored_cells_follow_groups() {
        let store = load(PAYLOAD).unwrap();
        let colored: Vec<(&str, &str)> = store
            .colored_cells()
            .into_iter()
            .map(|(c, color)| (c.as_str(), color.as_str()))
            .collect();
        assert_eq!(colored, vec![("c1_r1_c1", "#ffeeaa"), ("c1_r2_c1", "#ffeeaa")]);
    }

    #[test]
    fn empty_store_finds_nothing() {
        let store = MappingStore::empty();
        assert!(store.is_empty());
        assert!(store.cell_to_code(&CellId::new("c1_r1_c1")).is_none());
        assert!(store.code_to_cells(2, 40).is_none());
        assert!(store.discrepancies_for_table(&TableId::new("1")).is_empty());
        assert!(store.colored_cells().is_empty());
    }

    #[test]
    fn rejects_out_of_range_location_index() {
        let err = load(r#"{"code_locations": [[null, 1, 1]], "cell_to_code_idx": {"c1": 4}}"#).unwrap_err();
        assert_eq!(
            err,
            MalformedSnapshot::LocationIndexOutOfRange {
                cell_id: CellId::new("c1"),
                index: 4,
                available: 1
            }
        );
    }

    #[test]
    fn rejects_unknown_script() {
        let err = load(r#"{"cell_map": {"c1": {"script_num": 9, "code_line": 1}}}"#).unwrap_err();
        assert!(matches!(err, MalformedSnapshot::UnknownScript { script_index: 9, .. }));

        let err = load(r#"{"code_to_cells": {"s7_l1": {"cell_ids": "c1"}}}"#).unwrap_err();
        assert!(matches!(err, MalformedSnapshot::UnknownScript { script_index: 7, .. }));
    }

    #[test]
    fn rejects_cell_in_two_groups() {
        let err = load(r#"{"reg_info": {"R1": {"cell_ids": "c1,c2"}, "R2": {"cell_ids": "c2"}}}"#).unwrap_err();
        assert_eq!(
            err,
            MalformedSnapshot::CellInMultipleGroups {
                cell_id: CellId::new("c2"),
                first: RegressionId::new("R1"),
                second: RegressionId::new("R2")
            }
        );
    }

    #[test]
    fn rejects_cell_whose_regression_disagrees_with_its_group() {
        let err = load(
            r#"{"cell_map": {"c1": {"regid": "R2"}},
                "reg_info": {"R1": {"cell_ids": "c1"}, "R2": {"cell_ids": "c9"}}}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MalformedSnapshot::CellGroupMismatch {
                cell_id: CellId::new("c1"),
                record: RegressionId::new("R2"),
                group: RegressionId::new("R1")
            }
        );

        let store = load(r#"{"cell_map": {"c1": {"regid": "R1"}}, "reg_info": {"R1": {"cell_ids": "c1"}}}"#).unwrap();
        assert_eq!(
            store.group_of_cell(&CellId::new("c1")).map(|g| &g.regression_id),
            store.cell(&CellId::new("c1")).and_then(|c| c.regression_id.as_ref())
        );
    }

    #[test]
    fn rejects_cell_located_twice() {
        let err = load(
            r#"{"code_locations": [[null, 1, 1], [null, 1, 2]],
                "cell_to_code_idx": {"c1": 0, "c2": 1, "c1": 1}}"#,
        )
        .unwrap_err();
        assert_eq!(err, MalformedSnapshot::DuplicateLocation(CellId::new("c1")));
    }

    #[test]
    fn located_only_cells_keep_index_order() {
        let store = load(
            r#"{"cell_map": {"c2": {}},
                "code_locations": [[null, 1, 1], [null, 1, 1], [null, 2, 3]],
                "cell_to_code_idx": {"c3": 0, "c2": 1, "c1": 2}}"#,
        )
        .unwrap();
        let ids: Vec<&str> = store.cells().map(|c| c.cell_id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c3", "c1"]);
        let link = store.code_to_cells(1, 1).unwrap();
        assert!(link.derived);
        assert_eq!(link.cell_ids, vec![CellId::new("c2"), CellId::new("c3")]);
    }

    #[test]
    fn rejects_empty_cell_list() {
        let err = load(r#"{"reg_info": {"R1": {"cell_ids": ""}}}"#).unwrap_err();
        assert_eq!(err, MalformedSnapshot::EmptyGroup(RegressionId::new("R1")));
    }

    #[test]
    fn rejects_duplicate_and_blank_cells() {
        let err = load(r#"{"cell_map": {"c1": {}, "c1": {}}}"#).unwrap_err();
        assert_eq!(err, MalformedSnapshot::DuplicateCell(CellId::new("c1")));
        let err = load(r#"{"cell_map": {" ": {}}}"#).unwrap_err();
        assert_eq!(err, MalformedSnapshot::BlankCellId);
    }

    #[test]
    fn rejects_bad_code_key() {
        let err = load(r#"{"code_to_cells": {"line40": {"cell_ids": "c1"}}}"#).unwrap_err();
        assert_eq!(err, MalformedSnapshot::BadCodeKey("line40".into()));
    }

    #[test]
    fn rejects_discrepancy_without_cell() {
        let err = load(r#"{"wrong_number_info": [{"cellid": "c1", "tabid": 1}, {"cellid": "", "tabid": 1}]}"#).unwrap_err();
        assert_eq!(err, MalformedSnapshot::DiscrepancyWithoutCell(1));
    }
}
