//! # rrmap-core — Foundational Types for the Report Map
//!
//! Leaf crate of the workspace. Defines the identifiers, code locations,
//! error taxonomy, payload fetching and canonical serialization that the
//! store, reconciler and classifier crates share. It depends on no other `rrmap-*` crate.
//!
//! ## Crate Policy
//!
//! - Identifiers are newtypes; no bare strings cross crate boundaries.
//! - Every comparison key and digest flows through [`CanonicalBytes::new`].
//! - No `unsafe`, no `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod location;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, FetchFailure, MalformedSnapshot, NotANumber, RrmapError};
pub use fetch::{fetch_json, FsFetcher, PayloadFetcher};
pub use identity::{CellId, Color, MapType, MapVersion, RegressionId, RunId, TableId};
pub use location::{CodeKey, CodeLocation};
