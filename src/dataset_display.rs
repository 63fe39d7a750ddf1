//! Builds the data center chart: extracts each selected series, prints its
//! summary, and assembles the labelled figure.

use crate::axis::format_axes;
use crate::dataset::{Dataset, Extraction};
use crate::error::DisplayError;
use crate::figure::Figure;
use crate::series::Series;
use anyhow::Result;
use std::io::{self, Write};

pub const TITLE: &str = "Data Centers(Value vs. Time)";
pub const LEGEND_PREFIX: &str = "Data Center: ";

/// A dataset plus the data centers to draw from it
pub struct DatasetDisplay {
    dataset: Dataset,
    data_centers: Vec<String>,
}

impl DatasetDisplay {
    pub fn new(dataset: Dataset, data_centers: Vec<String>) -> Self {
        Self {
            dataset,
            data_centers,
        }
    }

    /// Records no extraction has consumed yet
    pub fn remaining(&self) -> &Dataset {
        &self.dataset
    }

    /// Build the figure, printing one summary per data center to stdout
    pub fn show(&mut self) -> Result<Figure> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.show_to(&mut out)
    }

    /// Build the figure, writing summaries to `out`.
    ///
    /// Data centers with no records are skipped with a warning and left out
    /// of the legend. Fails if nothing at all could be plotted.
    pub fn show_to<W: Write>(&mut self, out: &mut W) -> Result<Figure> {
        let mut figure = Figure::new();
        format_axes(figure.axis_mut());

        let mut plotted: Vec<String> = Vec::new();
        for data_center in self.data_centers.clone() {
            if self.plot_dataset(&data_center, &mut figure, out)? {
                plotted.push(data_center);
            }
        }

        if plotted.is_empty() {
            return Err(DisplayError::NothingToPlot.into());
        }

        figure.autofmt_xdate();
        figure.set_title(TITLE);
        figure.set_xlabel("Time");
        figure.set_ylabel("Value");
        figure.legend(
            plotted
                .iter()
                .map(|data_center| format!("{}{}", LEGEND_PREFIX, data_center))
                .collect(),
        );

        Ok(figure)
    }

    /// Pull one data center out of the dataset and plot it.
    ///
    /// Returns false when the data center had nothing left to plot. The
    /// records are only consumed once the series has been built, so a
    /// failure leaves the dataset as it was.
    fn plot_dataset<W: Write>(
        &mut self,
        data_center: &str,
        figure: &mut Figure,
        out: &mut W,
    ) -> Result<bool> {
        let Extraction { matched, remaining } = self.dataset.clone().extract(data_center);

        let series = match Series::from_records(data_center, &matched) {
            Ok(series) => series,
            Err(DisplayError::NoMatchingRecords { key }) => {
                log::warn!("No records for data center '{}', leaving it off the chart", key);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        self.dataset = remaining;

        writeln!(out, "{}", series.summary)?;
        figure.plot(series);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;
    use crate::series::to_datetime;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Record::new("A", 100.0, 5.0),
            Record::new("B", 101.0, 9.0),
            Record::new("A", 102.0, 7.0),
        ])
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_single_data_center() {
        let mut display = DatasetDisplay::new(sample(), keys(&["A"]));
        let mut out = Vec::new();

        let figure = display.show_to(&mut out).unwrap();

        let series = &figure.series()[0];
        assert_eq!(
            series.points,
            vec![
                (to_datetime(100.0).unwrap(), 5.0),
                (to_datetime(102.0).unwrap(), 7.0)
            ]
        );
        assert_eq!(series.summary.max_value, 7.0);
        assert_eq!(series.summary.max_time, to_datetime(102.0).unwrap());
        assert!((series.summary.mean - 6.0).abs() < 1e-12);
        assert_eq!(display.remaining().records(), &[Record::new("B", 101.0, 9.0)]);

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(
            printed,
            "Data Center:A\nMax Value:7.0, 1970-01-01 00:01:42+00:00\nAverage Value:6.0\n\n"
        );
    }

    #[test]
    fn test_two_data_centers() {
        let mut display = DatasetDisplay::new(sample(), keys(&["A", "B"]));
        let mut out = Vec::new();

        let figure = display.show_to(&mut out).unwrap();

        assert_eq!(
            figure.legend_labels(),
            &["Data Center: A".to_string(), "Data Center: B".to_string()]
        );
        assert_eq!(figure.series().len(), 2);
        assert!(display.remaining().is_empty());

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.matches("Data Center:").count(), 2);
        assert!(printed.contains("Data Center:B\nMax Value:9.0"));
    }

    #[test]
    fn test_figure_labels() {
        let mut display = DatasetDisplay::new(sample(), keys(&["B", "A"]));

        let figure = display.show_to(&mut Vec::new()).unwrap();

        assert_eq!(figure.title(), TITLE);
        assert_eq!(figure.x_label(), "Time");
        assert_eq!(figure.y_label(), "Value");
        assert!(figure.date_labels_rotated());
        assert!(figure.axis().grid_enabled());
        assert_eq!(
            figure.legend_labels(),
            &["Data Center: B".to_string(), "Data Center: A".to_string()]
        );
        assert_eq!(figure.series()[0].data_center, "B");
    }

    #[test]
    fn test_missing_data_center_is_skipped() {
        let mut display = DatasetDisplay::new(sample(), keys(&["A", "Z"]));
        let mut out = Vec::new();

        let figure = display.show_to(&mut out).unwrap();

        assert_eq!(figure.legend_labels(), &["Data Center: A".to_string()]);
        assert!(!String::from_utf8(out).unwrap().contains("Data Center:Z"));
    }

    #[test]
    fn test_repeated_data_center_is_drained() {
        let mut display = DatasetDisplay::new(sample(), keys(&["A", "A"]));

        let figure = display.show_to(&mut Vec::new()).unwrap();

        assert_eq!(figure.series().len(), 1);
        assert_eq!(figure.legend_labels(), &["Data Center: A".to_string()]);
    }

    #[test]
    fn test_nothing_to_plot() {
        let mut display = DatasetDisplay::new(sample(), keys(&["Z"]));

        let err = display.show_to(&mut Vec::new()).unwrap_err();

        assert_eq!(
            err.downcast_ref::<DisplayError>(),
            Some(&DisplayError::NothingToPlot)
        );
        assert_eq!(display.remaining().len(), 3);
    }

    #[test]
    fn test_bad_timestamp_keeps_records() {
        let dataset = Dataset::new(vec![
            Record::new("A", 100.0, 5.0),
            Record::new("B", 101.0, 9.0),
            Record::new("B", f64::NAN, 1.0),
        ]);
        let mut display = DatasetDisplay::new(dataset, keys(&["A", "B"]));

        let err = display.show_to(&mut Vec::new()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DisplayError>(),
            Some(DisplayError::TimestampOutOfRange { key, .. }) if key == "B"
        ));
        // A was plotted and consumed, B's records are all still there
        assert_eq!(display.remaining().len(), 2);
        assert!(display
            .remaining()
            .records()
            .iter()
            .all(|record| record.data_center == "B"));
    }
}
