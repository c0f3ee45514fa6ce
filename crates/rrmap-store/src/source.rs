//! # Snapshot Sources
//!
//! Where mapping payloads come from. A report either embeds every payload
//! (`map_type → version → payload`) or ships a manifest
//! (`map_type → version → path`) whose files are fetched on selection.
//! Both keep the generator's ordering of map types and versions, which is
//! the order the selectors offer them in.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;

use rrmap_core::{fetch_json, FetchFailure, MapType, MapVersion, PayloadFetcher};

use crate::payload::OrderedEntries;

/// Ordered `map_type → version → T` table.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    entries: Vec<(MapType, Vec<(MapVersion, T)>)>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> Catalog<T> {
    /// Build a catalog from ordered entries.
    pub fn new(entries: Vec<(MapType, Vec<(MapVersion, T)>)>) -> Self {
        Self { entries }
    }

    /// Map types in report order.
    pub fn map_types(&self) -> Vec<&MapType> {
        self.entries.iter().map(|(t, _)| t).collect()
    }

    /// Versions of a map type in report order. Empty for unknown types.
    pub fn versions(&self, map_type: &MapType) -> Vec<&MapVersion> {
        self.entries
            .iter()
            .find(|(t, _)| t == map_type)
            .map(|(_, versions)| versions.iter().map(|(v, _)| v).collect())
            .unwrap_or_default()
    }

    /// The entry stored for a selection.
    pub fn get(&self, map_type: &MapType, version: &MapVersion) -> Option<&T> {
        let (_, versions) = self.entries.iter().find(|(t, _)| t == map_type)?;
        versions.iter().find(|(v, _)| v == version).map(|(_, item)| item)
    }

    /// True if the catalog offers no map types.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Catalog<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let outer = OrderedEntries::<MapType, OrderedEntries<MapVersion, T>>::deserialize(deserializer)?.0;
        Ok(Self {
            entries: outer.into_iter().map(|(t, v)| (t, v.0)).collect(),
        })
    }
}

/// Payloads embedded in the report, kept undecoded until selected.
pub type EmbeddedMaps = Catalog<Box<RawValue>>;

/// Payload file paths named by the report manifest.
pub type Manifest = Catalog<String>;

/// Strategy for acquiring a selected payload.
pub enum SnapshotSource {
    /// Every payload ships inside the report.
    Embedded(EmbeddedMaps),
    /// Payloads are fetched from manifest paths.
    Manifest {
        /// Paths by selection.
        manifest: Manifest,
        /// Transport used to read the paths.
        fetcher: Box<dyn PayloadFetcher>,
    },
}

impl fmt::Debug for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded(maps) => f.debug_tuple("Embedded").field(&maps.map_types()).finish(),
            Self::Manifest { manifest, .. } => f
                .debug_struct("Manifest")
                .field("map_types", &manifest.map_types())
                .finish_non_exhaustive(),
        }
    }
}

impl SnapshotSource {
    /// Decode embedded payloads from the report's JSON.
    pub fn embedded_from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self::Embedded)
    }

    /// Read the manifest at `path` and fetch payloads through `fetcher`.
    pub fn manifest_from(fetcher: Box<dyn PayloadFetcher>, path: &str) -> Result<Self, FetchFailure> {
        let manifest: Manifest = fetch_json(fetcher.as_ref(), path)?;
        tracing::debug!(path, map_types = manifest.map_types().len(), "report manifest loaded");
        Ok(Self::Manifest { manifest, fetcher })
    }

    /// Map types offered by the report.
    pub fn map_types(&self) -> Vec<&MapType> {
        match self {
            Self::Embedded(maps) => maps.map_types(),
            Self::Manifest { manifest, .. } => manifest.map_types(),
        }
    }

    /// Versions offered for a map type.
    pub fn versions(&self, map_type: &MapType) -> Vec<&MapVersion> {
        match self {
            Self::Embedded(maps) => maps.versions(map_type),
            Self::Manifest { manifest, .. } => manifest.versions(map_type),
        }
    }

    /// The first selection offered, used when the report opens.
    pub fn initial_selection(&self) -> Option<(MapType, MapVersion)> {
        let map_type = self.map_types().first().map(|t| (*t).clone())?;
        let version = self.versions(&map_type).first().map(|v| (*v).clone())?;
        Some((map_type, version))
    }

    /// Raw payload bytes for a selection. `Ok(None)` when the source does
    /// not know the selection.
    pub fn acquire(&self, map_type: &MapType, version: &MapVersion) -> Result<Option<Vec<u8>>, FetchFailure> {
        match self {
            Self::Embedded(maps) => Ok(maps
                .get(map_type, version)
                .map(|raw| raw.get().as_bytes().to_vec())),
            Self::Manifest { manifest, fetcher } => match manifest.get(map_type, version) {
                Some(path) => fetcher.fetch(path).map(Some),
                None => Ok(None),
            },
        }
    }
}
