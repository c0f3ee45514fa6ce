//! # End-to-end report scenario
//!
//! One small report walked through the way the viewer uses it: select a
//! snapshot, click a cell, follow it to code and log, inspect the
//! discrepancy and the table's structural groups.

use std::sync::Arc;

use rrmap_classify::{table_overview, ClassificationDataset, ClassificationState, RegressionDetail, TableOverview};
use rrmap_core::{CellId, MapType, MapVersion, RegressionId, RunId, TableId};
use rrmap_reconcile::LogCache;
use rrmap_store::{AnnotationKind, AnnotationSources, CellNotes, PanelFocus, ReportScripts, Selection, SnapshotSource, ViewSession};

const MAPS: &str = r##"{
  "regression": {
    "v1": {
      "cell_map": {
        "c1_r1_c1": {"regid": "R1", "runid": "run_2_40", "script_num": 2, "code_line": 40, "value": "0.123"},
        "c1_r2_c1": {"regid": "R1", "runid": "run_2_40", "script_num": 2, "code_line": 40, "value": "(0.045)"},
        "c1_r1_c2": {"regid": "R2", "runid": "run_2_52", "script_num": 2, "code_line": 52, "value": "0.201***"}
      },
      "reg_info": {
        "R1": {"color": "#fde0dd", "cell_ids": "c1_r1_c1,c1_r2_c1", "tabid": "1"},
        "R2": {"color": "#e0ecf4", "cell_ids": "c1_r1_c2", "tabid": "1"}
      },
      "code_locations": [["run_2_40", 2, 40], ["run_2_52", 2, 52]],
      "cell_to_code_idx": {"c1_r1_c1": 0, "c1_r2_c1": 0, "c1_r1_c2": 1},
      "code_to_cells": {
        "s2_l40": {"tabid": "1", "regid": "R1", "cell_ids": "c1_r1_c1,c1_r2_c1"}
      },
      "wrong_number_info": [
        {"cellid": "c1_r1_c1", "tabid": "1", "wrong_number": "0.123", "number_in_log": "0.1234", "runid": "run_2_40"}
      ]
    }
  }
}"##;

const CLASSIFICATIONS: &str = r#"[
  {"tabid": 1, "regid": "R1", "regression_tags": "main_result",
   "vars": [{"var_type": "d", "var_in_code": "y"},
            {"var_type": "x_eff", "var_in_code": "treat", "cell_id_estimate": "c1_r1_c1"}],
   "dimensions": [{"dim_class": "fe", "dim_type": "unit", "var_in_code": "id"}]},
  {"tabid": 1, "regid": "R2", "regression_tags": "main_result", "dimensions_same_as_regid": "R1",
   "vars": [{"var_type": "d", "var_in_code": "y"},
            {"var_type": "x_eff", "var_in_code": "treat", "cell_id_estimate": "c1_r1_c2"}]}
]"#;

const LOG: &str = ". reg y treat, vce(robust)\n\
    treat |   .1234   .0449   2.75   0.006\n\
    _cons |   1.2     .3\n";

fn open_session() -> ViewSession {
    let source = SnapshotSource::embedded_from_json(MAPS).unwrap();
    ViewSession::new(source, ReportScripts::numbered(2))
}

#[test]
fn cell_resolves_to_code_and_discrepancy() {
    let mut session = open_session();
    let snapshot = session
        .select_snapshot(MapType::new("regression"), MapVersion::new("v1"))
        .unwrap();
    let store = &snapshot.store;
    let cell = CellId::new("c1_r1_c1");

    let location = store.cell_to_code(&cell).unwrap();
    assert_eq!((location.script_index, location.line), (2, 40));

    let case = store.discrepancies_for_cell(&cell).unwrap();
    assert_eq!(case.displayed_value, "0.123");
    assert_eq!(case.log_value, "0.1234");
    assert_eq!(store.discrepancies_for_table(&TableId::new("1")), std::slice::from_ref(case));

    let cells = store.regression_cells(&RegressionId::new("R1")).unwrap();
    assert!(cells.contains(&cell));
}

#[test]
fn click_flow_highlights_log_token() {
    let mut session = open_session();
    let snapshot = session.select_initial().unwrap().unwrap();
    let store = &snapshot.store;

    let mut selection = Selection::default();
    selection.select_cell(store, None, CellId::new("c1_r1_c1"));
    assert_eq!(selection.run_id, Some(RunId::new("run_2_40")));
    assert_eq!(
        selection.focus(),
        PanelFocus::Detail {
            table_id: TableId::new("1"),
            regression_id: RegressionId::new("R1")
        }
    );

    let mut logs = LogCache::new();
    logs.insert(RunId::new("run_2_40"), LOG);
    let annotation = selection.highlight_log(store, &mut logs, None).unwrap();
    let token = annotation.outcome.as_match().unwrap();
    assert_eq!(token.text, ".1234");
    assert_eq!(&LOG[token.start..token.end], ".1234");

    // The standard error prints in parentheses; read as negative it finds nothing.
    selection.select_cell(store, None, CellId::new("c1_r2_c1"));
    let annotation = selection.highlight_log(store, &mut logs, None).unwrap();
    assert!(!annotation.outcome.is_match());
    assert_eq!(logs.annotation(&RunId::new("run_2_40")).unwrap().displayed, "(0.045)");
}

#[test]
fn code_click_selects_regression_cells() {
    let mut session = open_session();
    let snapshot = session.select_initial().unwrap().unwrap();
    let mut selection = Selection::default();

    let link = selection.select_code_line(&snapshot.store, 2, 40).unwrap();
    assert_eq!(link.cell_ids.len(), 2);
    assert_eq!(selection.regression_id, Some(RegressionId::new("R1")));

    let derived = snapshot.store.code_to_cells(2, 52).unwrap();
    assert!(derived.derived);
    assert_eq!(derived.regression_id, Some(RegressionId::new("R2")));
}

#[test]
fn cell_tooltip_combines_sources() {
    let mut session = open_session();
    let snapshot = session.select_initial().unwrap().unwrap();
    let conflicts: CellNotes = serde_json::from_str(r#"{"c1_r1_c1": "Regression R1 differs from version v0"}"#).unwrap();
    let issues: CellNotes = serde_json::from_str(r#"{"c1_r1_c1": ["Rounded down instead of up"]}"#).unwrap();

    let lines = snapshot.store.discrepancies().annotations(
        &CellId::new("c1_r1_c1"),
        &AnnotationSources {
            conflicts: Some(&conflicts),
            issues: Some(&issues),
        },
    );
    let kinds: Vec<AnnotationKind> = lines.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![AnnotationKind::StructuralConflict, AnnotationKind::Discrepancy, AnnotationKind::Issue]
    );
}

#[test]
fn table_overview_groups_inherited_dimensions() {
    let state = ClassificationState::Loaded(Arc::new(ClassificationDataset::from_json(CLASSIFICATIONS).unwrap()));
    let overview = table_overview(&state, &TableId::new("1")).unwrap();
    let TableOverview::Groups(report) = overview else {
        panic!("expected groups");
    };
    assert_eq!(report.groups.len(), 1);
    let members: Vec<&str> = report.groups[0].regression_ids.iter().map(|r| r.as_str()).collect();
    assert_eq!(members, vec!["R1", "R2"]);

    let dataset = state.dataset().unwrap();
    let detail = RegressionDetail::find(dataset, &TableId::new("1"), &RegressionId::new("R2")).unwrap();
    assert_eq!(detail.dimensions.len(), 1);
    let linked: Vec<&str> = detail.linked_cells().iter().map(|c| c.as_str()).collect();
    assert_eq!(linked, vec!["c1_r1_c2"]);
}

#[test]
fn missing_classifications_degrade_to_no_info() {
    let overview = table_overview(&ClassificationState::Absent, &TableId::new("1")).unwrap();
    assert!(matches!(overview, TableOverview::Unavailable));
}
