//! # View Session
//!
//! Owns the active mapping snapshot and sequences its replacement.
//!
//! ## Loads
//!
//! Acquiring a payload is the one step that may be slow. A selection is
//! split into [`ViewSession::begin_select`], which issues a [`LoadTicket`]
//! and disables the selectors, and [`ViewSession::complete`], which applies
//! the result. Each ticket carries a generation; a result whose ticket is
//! no longer the newest is discarded and reported as
//! [`SessionError::Stale`]. Completing the current ticket re-enables the
//! selectors whatever the outcome.
//!
//! ## Atomicity
//!
//! The active snapshot is an `Arc<MappingSnapshot>` replaced whole. A
//! reader holding the previous `Arc` keeps a consistent view of the old
//! snapshot; new readers only ever see the new one.
//!
//! ## Failures
//!
//! A failed fetch or a malformed payload resets the session to an empty
//! snapshot, records the error and returns it. A selection the source does
//! not know yields an empty snapshot without error.

use std::sync::Arc;

use thiserror::Error;

use rrmap_core::{FetchFailure, MalformedSnapshot, MapType, MapVersion};

use crate::payload::SnapshotPayload;
use crate::source::SnapshotSource;
use crate::store::{MappingStore, ReportScripts};

/// Why a selection did not produce a populated snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The payload could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    /// The payload was retrieved but is inconsistent.
    #[error("malformed snapshot for {map_type}/{version}: {source}")]
    Malformed {
        /// Selected map type.
        map_type: MapType,
        /// Selected version.
        version: MapVersion,
        /// The violated invariant.
        source: MalformedSnapshot,
    },

    /// A newer selection was made before this load completed.
    #[error("load #{generation} superseded by load #{current}")]
    Stale {
        /// Generation of the discarded load.
        generation: u64,
        /// Generation of the newest load.
        current: u64,
    },
}

/// Handle for one in-flight selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    map_type: MapType,
    version: MapVersion,
}

impl LoadTicket {
    /// Monotonic load counter value.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Selected map type.
    pub fn map_type(&self) -> &MapType {
        &self.map_type
    }

    /// Selected version.
    pub fn version(&self) -> &MapVersion {
        &self.version
    }
}

/// A store together with the selection it was loaded for.
#[derive(Debug, Clone, Default)]
pub struct MappingSnapshot {
    /// Selection the store belongs to. `None` before the first load.
    pub selection: Option<(MapType, MapVersion)>,
    /// Validated lookups.
    pub store: MappingStore,
}

impl MappingSnapshot {
    fn empty_for(ticket: &LoadTicket) -> Self {
        Self {
            selection: Some((ticket.map_type.clone(), ticket.version.clone())),
            store: MappingStore::empty(),
        }
    }
}

/// Active snapshot plus load sequencing for one open report.
#[derive(Debug)]
pub struct ViewSession {
    source: SnapshotSource,
    scripts: ReportScripts,
    active: Arc<MappingSnapshot>,
    generation: u64,
    in_flight: bool,
    last_error: Option<SessionError>,
}

impl ViewSession {
    /// Open a session over `source`. No snapshot is active yet.
    pub fn new(source: SnapshotSource, scripts: ReportScripts) -> Self {
        Self {
            source,
            scripts,
            active: Arc::new(MappingSnapshot::default()),
            generation: 0,
            in_flight: false,
            last_error: None,
        }
    }

    /// Map types for the type selector.
    pub fn map_types(&self) -> Vec<&MapType> {
        self.source.map_types()
    }

    /// Versions for the version selector.
    pub fn versions(&self, map_type: &MapType) -> Vec<&MapVersion> {
        self.source.versions(map_type)
    }

    /// False when the report offers no maps and the selectors are hidden.
    pub fn has_maps(&self) -> bool {
        !self.source.map_types().is_empty()
    }

    /// True unless a load is in flight.
    pub fn controls_enabled(&self) -> bool {
        !self.in_flight
    }

    /// The active snapshot.
    pub fn active(&self) -> Arc<MappingSnapshot> {
        Arc::clone(&self.active)
    }

    /// Error recorded by the most recent completed load.
    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// Start loading a selection. Any earlier ticket becomes stale.
    pub fn begin_select(&mut self, map_type: MapType, version: MapVersion) -> LoadTicket {
        self.generation += 1;
        self.in_flight = true;
        tracing::debug!(generation = self.generation, %map_type, %version, "snapshot load started");
        LoadTicket {
            generation: self.generation,
            map_type,
            version,
        }
    }

    /// Acquire the payload for a ticket from the session's source.
    pub fn acquire(&self, ticket: &LoadTicket) -> Result<Option<Vec<u8>>, FetchFailure> {
        self.source.acquire(&ticket.map_type, &ticket.version)
    }

    /// Apply the outcome of a load.
    ///
    /// `Ok(None)` means the source has no payload for the selection.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        acquired: Result<Option<Vec<u8>>, FetchFailure>,
    ) -> Result<Arc<MappingSnapshot>, SessionError> {
        if ticket.generation != self.generation {
            tracing::warn!(
                generation = ticket.generation,
                current = self.generation,
                map_type = %ticket.map_type,
                version = %ticket.version,
                "discarding stale snapshot load"
            );
            return Err(SessionError::Stale {
                generation: ticket.generation,
                current: self.generation,
            });
        }
        self.in_flight = false;

        let outcome = match acquired {
            Ok(Some(bytes)) => SnapshotPayload::from_slice(&bytes)
                .and_then(|payload| MappingStore::load(&payload, &self.scripts))
                .map_err(|source| SessionError::Malformed {
                    map_type: ticket.map_type.clone(),
                    version: ticket.version.clone(),
                    source,
                }),
            Ok(None) => {
                tracing::debug!(map_type = %ticket.map_type, version = %ticket.version, "no payload for selection");
                Ok(MappingStore::empty())
            }
            Err(failure) => Err(SessionError::Fetch(failure)),
        };

        match outcome {
            Ok(store) => {
                tracing::info!(
                    map_type = %ticket.map_type,
                    version = %ticket.version,
                    cells = store.cells().count(),
                    "mapping snapshot activated"
                );
                self.last_error = None;
                self.active = Arc::new(MappingSnapshot {
                    selection: Some((ticket.map_type, ticket.version)),
                    store,
                });
                Ok(Arc::clone(&self.active))
            }
            Err(err) => {
                match &err {
                    SessionError::Fetch(f) => {
                        tracing::error!(path = %f.path, reason = %f.reason, "snapshot fetch failed; store reset to empty")
                    }
                    other => tracing::warn!(error = %other, "malformed snapshot; store reset to empty"),
                }
                self.active = Arc::new(MappingSnapshot::empty_for(&ticket));
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Select a snapshot synchronously.
    pub fn select_snapshot(
        &mut self,
        map_type: MapType,
        version: MapVersion,
    ) -> Result<Arc<MappingSnapshot>, SessionError> {
        let ticket = self.begin_select(map_type, version);
        let acquired = self.acquire(&ticket);
        self.complete(ticket, acquired)
    }

    /// Select the first map type and version the report offers. `Ok(None)`
    /// when the report has no maps.
    pub fn select_initial(&mut self) -> Result<Option<Arc<MappingSnapshot>>, SessionError> {
        match self.source.initial_selection() {
            Some((map_type, version)) => self.select_snapshot(map_type, version).map(Some),
            None => Ok(None),
        }
    }
}
