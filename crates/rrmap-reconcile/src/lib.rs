//! # rrmap-reconcile — Number Reconciler
//!
//! Locates, inside a raw log, the numeric token a rounded table value was
//! printed from.
//!
//! - [`number`]: decoration stripping, sign handling and exact decimal
//!   rounding of displayed values.
//! - [`scan`]: numeric token scanner over raw text.
//! - [`reconcile`]: candidate selection by rounded equality and closest
//!   distance.
//! - [`cache`]: pristine log texts per run, one current annotation each.

pub mod cache;
pub mod number;
pub mod reconcile;
pub mod scan;

pub use cache::{Annotation, HighlightedLog, LogCache};
pub use number::{DecimalText, DisplayedNumber, ParenthesesPolicy, Rounded};
pub use reconcile::{
    reconcile, reconcile_number, reconcile_with, NoMatchReason, ReconcileOptions, Reconciliation,
    TokenMatch,
};
pub use scan::{scan_tokens, NumericToken, TokenScanner};
