//! # Structural Grouper
//!
//! Partitions regression records into classes of identical structure for
//! the table overview.
//!
//! ## Dimension inheritance
//!
//! A record may declare that its dimensions are those of a sibling in the
//! same table (`dimensions_same_as_regid`). Resolution follows the chain of
//! such references. When a referenced sibling is missing, or the chain loops,
//! the record's dimensions are treated as empty and an
//! [`InheritanceUnresolved`] note is attached to the output. Grouping
//! proceeds for all records regardless.
//!
//! ## Ordering
//!
//! Groups appear in the order of their first member; members keep input
//! order. Keys come from [`StructuralSignature`], so the partition does not
//! depend on property order in the source JSON.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use rrmap_core::{CanonicalizationError, RegressionId, TableId};

use crate::record::{DimensionSpec, RegressionStructuralRecord, TagSet, VariableSpec};
use crate::signature::StructuralSignature;

/// Where a record's effective dimensions came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DimensionSource {
    /// The record's own dimensions.
    Own,
    /// Dimensions of the referenced sibling.
    Inherited {
        /// Sibling named by the record.
        from: RegressionId,
    },
    /// The reference could not be resolved; dimensions are empty.
    Unresolved {
        /// Sibling named by the record.
        from: RegressionId,
    },
}

/// Why an inheritance reference could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No sibling with that id exists in the table.
    MissingSibling,
    /// The chain of references returns to a record already visited.
    Cycle,
}

/// Non-fatal note: a record's dimension reference did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InheritanceUnresolved {
    /// Table of the record.
    pub table_id: TableId,
    /// Record carrying the reference.
    pub regression_id: RegressionId,
    /// Sibling it referenced.
    pub inherit_from: RegressionId,
    /// What went wrong.
    pub reason: UnresolvedReason,
}

/// Effective dimensions of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDimensions<'a> {
    /// Dimensions to use for display and grouping.
    pub dimensions: &'a [DimensionSpec],
    /// Provenance of `dimensions`.
    pub source: DimensionSource,
    /// Set when the reference failed to resolve.
    pub unresolved: Option<UnresolvedReason>,
}

/// Records of a collection indexed by `(table, regression)`.
#[derive(Debug)]
pub struct SiblingIndex<'a> {
    by_table: HashMap<&'a TableId, HashMap<&'a RegressionId, &'a RegressionStructuralRecord>>,
}

impl<'a> SiblingIndex<'a> {
    /// Index `records`. The first record wins when an id repeats.
    pub fn new(records: &'a [RegressionStructuralRecord]) -> Self {
        let mut by_table: HashMap<_, HashMap<_, _>> = HashMap::new();
        for r in records {
            by_table
                .entry(&r.table_id)
                .or_default()
                .entry(&r.regression_id)
                .or_insert(r);
        }
        Self { by_table }
    }

    /// Look up a record by table and regression id.
    pub fn get(&self, table_id: &TableId, regression_id: &RegressionId) -> Option<&'a RegressionStructuralRecord> {
        self.by_table.get(table_id)?.get(regression_id).copied()
    }

    /// Resolve the effective dimensions of `record` among its siblings.
    pub fn resolve(&self, record: &'a RegressionStructuralRecord) -> ResolvedDimensions<'a> {
        let Some(from) = &record.dimensions_inherit_from else {
            return ResolvedDimensions {
                dimensions: &record.dimensions,
                source: DimensionSource::Own,
                unresolved: None,
            };
        };

        let mut visited: HashSet<&RegressionId> = HashSet::new();
        visited.insert(&record.regression_id);
        let mut current = record;
        let failure = loop {
            let Some(next_id) = &current.dimensions_inherit_from else {
                return ResolvedDimensions {
                    dimensions: &current.dimensions,
                    source: DimensionSource::Inherited { from: from.clone() },
                    unresolved: None,
                };
            };
            if !visited.insert(next_id) {
                break UnresolvedReason::Cycle;
            }
            match self.get(&record.table_id, next_id) {
                Some(parent) => current = parent,
                None => break UnresolvedReason::MissingSibling,
            }
        };

        ResolvedDimensions {
            dimensions: &[],
            source: DimensionSource::Unresolved { from: from.clone() },
            unresolved: Some(failure),
        }
    }
}

/// One class of structurally identical regressions.
#[derive(Debug, Clone, Serialize)]
pub struct StructuralGroup {
    /// Canonical key shared by all members.
    #[serde(serialize_with = "signature_key")]
    pub signature: StructuralSignature,
    /// Member regressions in input order.
    pub regression_ids: Vec<RegressionId>,
    /// Shared tags.
    pub tags: TagSet,
    /// Shared variables, estimate cell links removed.
    pub variables: Vec<VariableSpec>,
    /// Shared resolved dimensions.
    pub dimensions: Vec<DimensionSpec>,
}

fn signature_key<S: serde::Serializer>(sig: &StructuralSignature, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&sig.short_id())
}

/// Output of a grouping pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupingReport {
    /// Groups in order of first appearance.
    pub groups: Vec<StructuralGroup>,
    /// Inheritance references that did not resolve.
    pub notes: Vec<InheritanceUnresolved>,
}

impl GroupingReport {
    /// The group containing a regression.
    pub fn group_of(&self, regression_id: &RegressionId) -> Option<&StructuralGroup> {
        self.groups
            .iter()
            .find(|g| g.regression_ids.contains(regression_id))
    }
}

/// Group records by structural signature.
///
/// Inheritance references resolve among `records` with the same table id.
pub fn group(records: &[RegressionStructuralRecord]) -> Result<GroupingReport, CanonicalizationError> {
    let siblings = SiblingIndex::new(records);
    let mut report = GroupingReport::default();
    let mut slot_of: HashMap<StructuralSignature, usize> = HashMap::new();

    for record in records {
        let resolved = siblings.resolve(record);
        if let (Some(reason), Some(from)) = (resolved.unresolved, &record.dimensions_inherit_from) {
            tracing::warn!(
                table_id = %record.table_id,
                regression_id = %record.regression_id,
                inherit_from = %from,
                ?reason,
                "dimension inheritance unresolved; using empty dimensions"
            );
            report.notes.push(InheritanceUnresolved {
                table_id: record.table_id.clone(),
                regression_id: record.regression_id.clone(),
                inherit_from: from.clone(),
                reason,
            });
        }

        let signature = StructuralSignature::compute(&record.tags, &record.variables, resolved.dimensions)?;
        match slot_of.get(&signature) {
            Some(&slot) => report.groups[slot]
                .regression_ids
                .push(record.regression_id.clone()),
            None => {
                slot_of.insert(signature.clone(), report.groups.len());
                report.groups.push(StructuralGroup {
                    signature,
                    regression_ids: vec![record.regression_id.clone()],
                    tags: record.tags.clone(),
                    variables: record
                        .variables
                        .iter()
                        .map(|v| VariableSpec {
                            estimate_cell: None,
                            ..v.clone()
                        })
                        .collect(),
                    dimensions: resolved.dimensions.to_vec(),
                });
            }
        }
    }

    tracing::debug!(
        records = records.len(),
        groups = report.groups.len(),
        notes = report.notes.len(),
        "structural grouping complete"
    );
    Ok(report)
}

/// Group the records of one table.
pub fn group_table(
    records: &[RegressionStructuralRecord],
    table_id: &TableId,
) -> Result<GroupingReport, CanonicalizationError> {
    let table: Vec<RegressionStructuralRecord> = records
        .iter()
        .filter(|r| &r.table_id == table_id)
        .cloned()
        .collect();
    group(&table)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_record(index: usize) -> impl Strategy<Value = RegressionStructuralRecord> {
        (
            prop::collection::btree_set("[ab]", 0..2),
            prop::collection::vec(("[dx]", "[uv]"), 0..3),
            prop::option::of(0usize..4),
        )
            .prop_map(move |(tags, vars, inherit)| RegressionStructuralRecord {
                regression_id: RegressionId::new(format!("R{index}")),
                table_id: TableId::new("1"),
                tags,
                variables: vars
                    .into_iter()
                    .enumerate()
                    .map(|(i, (role, code))| VariableSpec {
                        role,
                        article_label: None,
                        code_symbol: Some(code),
                        unit: None,
                        estimate_cell: Some(rrmap_core::CellId::new(format!("c1_r{i}_c{index}"))),
                    })
                    .collect(),
                dimensions: Vec::new(),
                dimensions_inherit_from: inherit.map(|i| RegressionId::new(format!("R{i}"))),
                short_description: None,
                standard_error_type: None,
                source_warning: None,
                reported_stats: Vec::new(),
            })
    }

    fn arb_records() -> impl Strategy<Value = Vec<RegressionStructuralRecord>> {
        (0usize..6).prop_flat_map(|n| (0..n).map(arb_record).collect::<Vec<_>>())
    }

    proptest! {
        #[test]
        fn grouping_is_deterministic(recs in arb_records()) {
            let a = group(&recs).unwrap();
            let b = group(&recs).unwrap();
            let part = |r: &GroupingReport| r.groups.iter().map(|g| g.regression_ids.clone()).collect::<Vec<_>>();
            prop_assert_eq!(part(&a), part(&b));
        }

        #[test]
        fn every_record_in_exactly_one_group(recs in arb_records()) {
            let report = group(&recs).unwrap();
            let total: usize = report.groups.iter().map(|g| g.regression_ids.len()).sum();
            prop_assert_eq!(total, recs.len());
        }

        #[test]
        fn field_order_in_json_is_irrelevant(recs in arb_records()) {
            // Re-encode every record with its keys reversed.
            let reordered: Vec<RegressionStructuralRecord> = recs
                .iter()
                .map(|r| {
                    let value = serde_json::to_value(r).unwrap();
                    let obj = value.as_object().unwrap();
                    let mut text = String::from("{");
                    let entries: Vec<_> = obj.iter().rev().collect();
                    for (i, (k, v)) in entries.iter().enumerate() {
                        if i > 0 { text.push(','); }
                        text.push_str(&serde_json::to_string(k).unwrap());
                        text.push(':');
                        text.push_str(&serde_json::to_string(v).unwrap());
                    }
                    text.push('}');
                    serde_json::from_str(&text).unwrap()
                })
                .collect();
            let a = group(&recs).unwrap();
            let b = group(&reordered).unwrap();
            let keys = |r: &GroupingReport| r.groups.iter().map(|g| (g.signature.key().to_string(), g.regression_ids.clone())).collect::<Vec<_>>();
            prop_assert_eq!(keys(&a), keys(&b));
        }
    }
}
