//! Records, the dataset they live in, and loading from JSON Lines files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A single reading from one data center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data_center: String,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    pub value: f64,
}

impl Record {
    pub fn new(data_center: impl Into<String>, timestamp: f64, value: f64) -> Self {
        Self {
            data_center: data_center.into(),
            timestamp,
            value,
        }
    }
}

/// Ordered collection of records, drained key by key as series are extracted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

/// Result of pulling one data center out of a dataset
#[derive(Debug)]
pub struct Extraction {
    /// Records for the requested key, in dataset order
    pub matched: Vec<Record>,
    /// Everything else, in its original relative order
    pub remaining: Dataset,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split off every record whose data center equals `key`.
    ///
    /// Consumes the dataset and hands back what was not matched, so a
    /// caller that extracts the same key twice sees nothing the second time.
    pub fn extract(self, key: &str) -> Extraction {
        let (matched, remaining): (Vec<Record>, Vec<Record>) = self
            .records
            .into_iter()
            .partition(|record| record.data_center == key);

        log::debug!(
            "extracted {} records for '{}', {} remaining",
            matched.len(),
            key,
            remaining.len()
        );

        Extraction {
            matched,
            remaining: Dataset::new(remaining),
        }
    }

    /// Distinct data center names in first-seen order
    pub fn data_centers(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for record in self.records() {
            if !seen.iter().any(|name| name == &record.data_center) {
                seen.push(record.data_center.clone());
            }
        }
        seen
    }
}

/// Load records from a JSON Lines file
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("Failed to open dataset file: {}", path.as_ref().display()))?;

    parse_records(BufReader::new(file))
}

fn parse_records<R: BufRead>(reader: R) -> Result<Dataset> {
    let mut records = Vec::new();
    let mut first_content_line = true;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<Record>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => {
                // A bad first line means the whole file is in the wrong format
                if first_content_line {
                    return Err(anyhow::anyhow!(
                        "Dataset file doesn't appear to be JSON Lines records.\nError: {}",
                        e
                    ));
                }
                log::warn!("Skipping malformed record on line {}: {}", line_num + 1, e);
            }
        }
        first_content_line = false;
    }

    log::info!("Loaded {} records", records.len());
    Ok(Dataset::new(records))
}
