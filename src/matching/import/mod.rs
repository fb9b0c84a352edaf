//! Loaders hydrating the in-memory collaborators from CSV exports and
//! pre-assessment documents.

mod parser;
mod pre_assessment;

pub use pre_assessment::scores_from_pre_assessment;

use std::io::Read;
use std::path::Path;

use super::domain::{Community, CommunityId, RecordedScore, UserId};
use super::memory::{InMemoryAssessmentStore, InMemoryCommunityCatalog};
use super::repository::StoreError;
use parser::{csv_reader, parse_timestamp, AssessmentRow, CommunityRow};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidTimestamp { line: usize, value: String },
    Store(StoreError),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            ImportError::InvalidTimestamp { line, value } => {
                write!(f, "line {}: '{}' is not a valid timestamp", line, value)
            }
            ImportError::Store(err) => write!(f, "could not store imported data: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::InvalidTimestamp { .. } => None,
            ImportError::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<StoreError> for ImportError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Imports `user_id,instrument,score,recorded_at` rows.
pub struct AssessmentCsvImporter;

impl AssessmentCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<InMemoryAssessmentStore, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<InMemoryAssessmentStore, ImportError> {
        let store = InMemoryAssessmentStore::default();
        Self::load_into(reader, &store)?;
        Ok(store)
    }

    /// Load rows into an existing store, returning how many scores were recorded.
    ///
    /// Blank or non-numeric scores are skipped as "not assessed".
    pub fn load_into<R: Read>(
        reader: R,
        store: &InMemoryAssessmentStore,
    ) -> Result<usize, ImportError> {
        let mut csv_reader = csv_reader(reader);
        let mut recorded = 0;

        for (index, row) in csv_reader.deserialize::<AssessmentRow>().enumerate() {
            let row = row?;
            // header occupies line 1
            let line = index + 2;

            let recorded_at =
                parse_timestamp(&row.recorded_at).ok_or_else(|| ImportError::InvalidTimestamp {
                    line,
                    value: row.recorded_at.clone(),
                })?;

            let Some(score) = row.numeric_score() else {
                tracing::debug!(line, user_id = %row.user_id, instrument = %row.instrument, "skipping row without numeric score");
                continue;
            };

            store.record(
                UserId(row.user_id),
                row.instrument.to_ascii_lowercase(),
                RecordedScore { score, recorded_at },
            )?;
            recorded += 1;
        }

        Ok(recorded)
    }
}

/// Imports `id,name,slug` rows in file order.
pub struct CommunityCsvImporter;

impl CommunityCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<InMemoryCommunityCatalog, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<InMemoryCommunityCatalog, ImportError> {
        let mut csv_reader = csv_reader(reader);
        let catalog = InMemoryCommunityCatalog::default();

        for row in csv_reader.deserialize::<CommunityRow>() {
            let row = row?;
            catalog.insert(Community {
                id: CommunityId(row.id),
                name: row.name,
                slug: row.slug,
            })?;
        }

        Ok(catalog)
    }
}
