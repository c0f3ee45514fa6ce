//! # rrmap-store — Mapping Store and View Session
//!
//! The cross-reference graph of a reproducibility report: which code line
//! produced which table cell, which cells belong to which regression, and
//! where the table and the log disagree.
//!
//! - [`payload`]: serde schema of a mapping payload.
//! - [`store`]: validated, indexed snapshot ([`MappingStore`]).
//! - [`discrepancy`]: per-cell and per-table mismatch index and cell
//!   annotations.
//! - [`source`]: embedded maps or manifest-driven fetching.
//! - [`session`]: active snapshot, load tickets and stale-load handling.
//! - [`selection`]: the table / regression / run / cell being viewed.
//! - [`config`]: environment and YAML configuration.

pub mod config;
pub mod discrepancy;
pub mod payload;
pub mod selection;
pub mod session;
pub mod source;
pub mod store;

pub use config::{ConfigError, DataMode, ReportConfig};
pub use discrepancy::{AnnotationKind, AnnotationSources, CellAnnotation, CellNotes, DiscrepancyCase, DiscrepancyIndex};
pub use payload::SnapshotPayload;
pub use selection::{Highlights, PanelFocus, Selection};
pub use session::{LoadTicket, MappingSnapshot, SessionError, ViewSession};
pub use source::{Catalog, EmbeddedMaps, Manifest, SnapshotSource};
pub use store::{CellRecord, CodeLink, MappingStore, RegressionGroup, ReportScripts};
