use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::EventRecord;

pub const DEFAULT_EVENTS_FILE: &str = "data/events.json";

pub struct EventStore {
    path: PathBuf,
}

impl EventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every well-formed record from the event file.
    ///
    /// Entries without a date or a description are skipped with a warning;
    /// only a missing file or a malformed top level fails.
    pub fn load(&self) -> Result<Vec<EventRecord>, LoadError> {
        let contents = fs::read_to_string(&self.path)?;
        let entries = match serde_json::from_str::<Value>(&contents)? {
            Value::Array(entries) => entries,
            _ => return Err(LoadError::NotAnArray),
        };

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<StoredEvent>(entry) {
                Ok(stored) => match stored.into_record() {
                    Some(record) => records.push(record),
                    None => warn!(index, "skipping event record without a description"),
                },
                Err(err) => warn!(index, error = %err, "skipping malformed event record"),
            }
        }
        Ok(records)
    }
}

/// On-disk shape of one entry. The description lives under `event`, with
/// `description` accepted as a fallback; other keys are ignored.
#[derive(Deserialize)]
struct StoredEvent {
    date: String,
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl StoredEvent {
    fn into_record(self) -> Option<EventRecord> {
        let event = [self.event, self.description]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())?;
        Some(EventRecord {
            date: self.date,
            event,
        })
    }
}

/// Loads the event file, treating any failure as "no events".
pub fn load_or_empty(store: &EventStore) -> Vec<EventRecord> {
    match store.load() {
        Ok(records) => {
            info!(count = records.len(), path = %store.path().display(), "loaded events");
            records
        }
        Err(err) => {
            error!(error = %err, path = %store.path().display(), "failed to load events");
            Vec::new()
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error while reading the event file: {0}")]
    Io(#[from] io::Error),
    #[error("Event file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Event file must contain a JSON array of records")]
    NotAnArray,
}
