//! # Classification Dataset
//!
//! The classification dataset is optional. A report may embed it, name a
//! file to fetch, or ship without one. [`ClassificationState`] tracks which
//! of these applies; consumers ask for records and get "no structural info"
//! rather than an error when the dataset is absent or failed to load.

use std::sync::Arc;

use rrmap_core::{fetch_json, FetchFailure, PayloadFetcher, RegressionId, TableId};

use crate::record::RegressionStructuralRecord;

/// All structural records of a report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationDataset {
    records: Vec<RegressionStructuralRecord>,
}

impl ClassificationDataset {
    /// Wrap decoded records.
    pub fn new(records: Vec<RegressionStructuralRecord>) -> Self {
        Self { records }
    }

    /// Decode a dataset from its JSON array form.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self::new)
    }

    /// Fetch and decode a dataset.
    pub fn fetch(fetcher: &dyn PayloadFetcher, path: &str) -> Result<Self, FetchFailure> {
        fetch_json(fetcher, path).map(Self::new)
    }

    /// Every record, in dataset order.
    pub fn records(&self) -> &[RegressionStructuralRecord] {
        &self.records
    }

    /// Records of one table, in dataset order.
    pub fn table_records(&self, table_id: &TableId) -> Vec<RegressionStructuralRecord> {
        self.records
            .iter()
            .filter(|r| &r.table_id == table_id)
            .cloned()
            .collect()
    }

    /// The record of one regression.
    pub fn record(&self, table_id: &TableId, regression_id: &RegressionId) -> Option<&RegressionStructuralRecord> {
        self.records
            .iter()
            .find(|r| &r.table_id == table_id && &r.regression_id == regression_id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Where the classification dataset comes from.
#[derive(Debug, Clone)]
pub enum ClassificationSource {
    /// The report ships without classifications.
    None,
    /// Records embedded in the report.
    Embedded(ClassificationDataset),
    /// A single file named by the report.
    File(String),
}

/// Availability of the classification dataset.
#[derive(Debug, Clone, Default)]
pub enum ClassificationState {
    /// No dataset for this report.
    #[default]
    Absent,
    /// A fetch has been started and not completed.
    Loading {
        /// Path being fetched.
        path: String,
    },
    /// Dataset available.
    Loaded(Arc<ClassificationDataset>),
    /// The fetch failed; there is no structural info.
    Failed(FetchFailure),
}

impl ClassificationState {
    /// Resolve a source synchronously.
    pub fn load(source: ClassificationSource, fetcher: &dyn PayloadFetcher) -> Self {
        match source {
            ClassificationSource::None => Self::Absent,
            ClassificationSource::Embedded(dataset) => Self::Loaded(Arc::new(dataset)),
            ClassificationSource::File(path) => Self::Loading { path }.complete(fetcher),
        }
    }

    /// Complete a pending fetch. Other states are returned unchanged.
    pub fn complete(self, fetcher: &dyn PayloadFetcher) -> Self {
        let Self::Loading { path } = self else {
            return self;
        };
        match ClassificationDataset::fetch(fetcher, &path) {
            Ok(dataset) => {
                tracing::info!(path = %path, records = dataset.len(), "classification dataset loaded");
                Self::Loaded(Arc::new(dataset))
            }
            Err(err) => {
                tracing::error!(path = %err.path, reason = %err.reason, "classification dataset unavailable");
                Self::Failed(err)
            }
        }
    }

    /// The dataset, if loaded.
    pub fn dataset(&self) -> Option<&ClassificationDataset> {
        match self {
            Self::Loaded(d) => Some(d.as_ref()),
            _ => None,
        }
    }
}
