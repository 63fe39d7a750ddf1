//! Error types for extraction and plotting.

use thiserror::Error;

/// Failures that come out of the extraction pipeline itself
#[derive(Debug, Error, PartialEq)]
pub enum DisplayError {
    /// The requested data center has no records left in the dataset
    #[error("no records found for data center '{key}'")]
    NoMatchingRecords { key: String },

    /// A record's epoch timestamp can't be represented as a date
    #[error("timestamp {timestamp} for data center '{key}' is out of range")]
    TimestampOutOfRange { key: String, timestamp: f64 },

    /// None of the selected data centers produced a series
    #[error("none of the selected data centers have records to plot")]
    NothingToPlot,
}
