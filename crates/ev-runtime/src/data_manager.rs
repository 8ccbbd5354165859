//! Ingestion lifecycle for the dashboard.
//!
//! Wraps [`load_records`] and turns its outcome into an explicit
//! [`IngestState`], so that "the load failed" and "the load succeeded with
//! zero rows" stay distinguishable after the error itself has been logged.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ev_core::config::FieldNames;
use ev_core::models::VehicleRecord;
use ev_data::reader::load_records;

// ── IngestState ───────────────────────────────────────────────────────────────

/// Outcome of one ingestion attempt.
#[derive(Debug, Clone)]
pub enum IngestState {
    /// All records were read. `records` may be empty.
    Loaded {
        records: Vec<VehicleRecord>,
        loaded_at: DateTime<Utc>,
    },
    /// Ingestion failed; there are no records.
    Failed {
        reason: String,
        failed_at: DateTime<Utc>,
    },
}

impl IngestState {
    pub fn is_failed(&self) -> bool {
        matches!(self, IngestState::Failed { .. })
    }

    /// The loaded records; empty when ingestion failed.
    pub fn records(&self) -> &[VehicleRecord] {
        match self {
            IngestState::Loaded { records, .. } => records,
            IngestState::Failed { .. } => &[],
        }
    }

    /// Consume the state, yielding the records (empty when failed).
    pub fn into_records(self) -> Vec<VehicleRecord> {
        match self {
            IngestState::Loaded { records, .. } => records,
            IngestState::Failed { .. } => Vec::new(),
        }
    }

    /// Failure description, or `None` after a successful load.
    pub fn failure(&self) -> Option<&str> {
        match self {
            IngestState::Failed { reason, .. } => Some(reason),
            IngestState::Loaded { .. } => None,
        }
    }
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Loads the record set from a configured path and remembers how the last
/// attempt went.
///
/// # Example
/// ```no_run
/// use ev_core::config::FieldNames;
/// use ev_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new("Electric_Vehicle_Population_Data.csv", FieldNames::default());
/// let state = mgr.load();
/// if let Some(reason) = state.failure() {
///     eprintln!("load failed: {reason}");
/// }
/// ```
pub struct DataManager {
    /// CSV file or directory to read.
    data_path: PathBuf,
    /// Column names used to build records.
    fields: FieldNames,
    /// Human-readable description of the last error encountered.
    last_error: Option<String>,
    /// When the last *successful* load completed.
    last_successful_load: Option<DateTime<Utc>>,
    /// Records produced by the last successful load.
    last_record_count: Option<usize>,
}

impl DataManager {
    pub fn new(data_path: impl Into<PathBuf>, fields: FieldNames) -> Self {
        Self {
            data_path: data_path.into(),
            fields,
            last_error: None,
            last_successful_load: None,
            last_record_count: None,
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Read the full record set.
    ///
    /// Never returns an error: failures become [`IngestState::Failed`] and are
    /// recorded in [`DataManager::last_error`].
    pub fn load(&mut self) -> IngestState {
        match load_records(&self.data_path, &self.fields) {
            Ok(records) => {
                let loaded_at = Utc::now();
                tracing::info!(
                    path = %self.data_path.display(),
                    records = records.len(),
                    "records loaded"
                );
                self.last_error = None;
                self.last_successful_load = Some(loaded_at);
                self.last_record_count = Some(records.len());
                IngestState::Loaded { records, loaded_at }
            }
            Err(e) => {
                tracing::warn!(path = %self.data_path.display(), error = %e, "ingestion failed");
                let reason = e.to_string();
                self.last_error = Some(reason.clone());
                IngestState::Failed {
                    reason,
                    failed_at: Utc::now(),
                }
            }
        }
    }

    /// Human-readable description of the last load error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// When the last successful load completed.
    pub fn last_successful_load(&self) -> Option<DateTime<Utc>> {
        self.last_successful_load
    }

    /// Record count of the last successful load.
    pub fn last_record_count(&self) -> Option<usize> {
        self.last_record_count
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
