//! Per-data-center series and their summary statistics.

use crate::dataset::Record;
use crate::error::DisplayError;
use chrono::{DateTime, Utc};
use std::fmt;

/// Max and mean of one data center's readings
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub data_center: String,
    pub max_value: f64,
    /// When the maximum was first reached
    pub max_time: DateTime<Utc>,
    pub mean: f64,
}

impl fmt::Display for SeriesSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sub-second precision only shows when the reading has it
        let time_format = if self.max_time.timestamp_subsec_nanos() == 0 {
            "%Y-%m-%d %H:%M:%S%:z"
        } else {
            "%Y-%m-%d %H:%M:%S%.6f%:z"
        };
        writeln!(f, "Data Center:{}", self.data_center)?;
        writeln!(
            f,
            "Max Value:{}, {}",
            format_value(self.max_value),
            self.max_time.format(time_format)
        )?;
        writeln!(f, "Average Value:{}", format_value(self.mean))
    }
}

/// Date-indexed readings for one data center, ready to plot
#[derive(Debug, Clone)]
pub struct Series {
    pub data_center: String,
    /// Points in the order they appeared in the dataset
    pub points: Vec<(DateTime<Utc>, f64)>,
    pub summary: SeriesSummary,
}

impl Series {
    /// Build a series from the records extracted for `data_center`.
    ///
    /// Scans once, keeping a running maximum (strictly greater wins, so ties
    /// keep the earliest record) and a running sum for the mean.
    pub fn from_records(data_center: &str, records: &[Record]) -> Result<Self, DisplayError> {
        let mut points = Vec::with_capacity(records.len());
        let mut max: Option<(f64, DateTime<Utc>)> = None;
        let mut sum = 0.0;

        for record in records {
            let time = to_datetime(record.timestamp).ok_or_else(|| {
                DisplayError::TimestampOutOfRange {
                    key: data_center.to_string(),
                    timestamp: record.timestamp,
                }
            })?;

            points.push((time, record.value));
            sum += record.value;

            let is_new_max = match max {
                Some((max_value, _)) => record.value > max_value,
                None => true,
            };
            if is_new_max {
                max = Some((record.value, time));
            }
        }

        let (max_value, max_time) = max.ok_or_else(|| DisplayError::NoMatchingRecords {
            key: data_center.to_string(),
        })?;
        let mean = sum / points.len() as f64;

        Ok(Self {
            data_center: data_center.to_string(),
            points,
            summary: SeriesSummary {
                data_center: data_center.to_string(),
                max_value,
                max_time,
                mean,
            },
        })
    }

    /// Earliest and latest point times
    pub fn time_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.points.first()?.0;
        Some(self.points.iter().fold((first, first), |(lo, hi), (t, _)| {
            (lo.min(*t), hi.max(*t))
        }))
    }

    /// Smallest and largest values
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?.1;
        Some(self.points.iter().fold((first, first), |(lo, hi), (_, v)| {
            (lo.min(*v), hi.max(*v))
        }))
    }
}

/// Convert fractional epoch seconds to a UTC date
pub fn to_datetime(epoch_secs: f64) -> Option<DateTime<Utc>> {
    if !epoch_secs.is_finite() {
        return None;
    }
    let secs = epoch_secs.floor();
    let nanos = (((epoch_secs - secs) * 1e9).round() as u32).min(999_999_999);
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(secs as i64, nanos)
}

/// Convert a UTC date back to fractional epoch seconds
pub fn to_epoch_secs(time: DateTime<Utc>) -> f64 {
    time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) / 1e9
}

/// Format a reading so whole numbers still show a decimal point
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}
