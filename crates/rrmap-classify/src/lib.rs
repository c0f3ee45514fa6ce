//! # rrmap-classify — Structural Grouping of Regressions
//!
//! Works on the optional classification dataset: one structural record per
//! regression (tags, variables, dimensions). Provides
//!
//! - [`grouper`]: partition of a table's regressions into classes of
//!   identical structure, with sibling dimension inheritance resolved;
//! - [`signature`]: the canonical comparison key used by the grouper;
//! - [`detail`]: table overview and per-regression detail data;
//! - [`dataset`]: loading the dataset and degrading to "no structural
//!   info" when it is missing.

pub mod dataset;
pub mod detail;
pub mod grouper;
pub mod record;
pub mod signature;

pub use dataset::{ClassificationDataset, ClassificationSource, ClassificationState};
pub use detail::{table_overview, RegressionDetail, TableOverview};
pub use grouper::{
    group, group_table, DimensionSource, GroupingReport, InheritanceUnresolved, ResolvedDimensions,
    SiblingIndex, StructuralGroup, UnresolvedReason,
};
pub use record::{
    DimensionCode, DimensionSpec, RegressionStructuralRecord, ReportedStat, TagKind, TagSet,
    VariableRole, VariableSpec,
};
pub use signature::StructuralSignature;
