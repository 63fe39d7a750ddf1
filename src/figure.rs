//! Figure assembly and SVG rendering.

use crate::axis::{TimeAxis, AUTOSCALE_MARGIN};
use crate::error::DisplayError;
use crate::series::{to_datetime, to_epoch_secs, Series};
use anyhow::Result;
use chrono::{DateTime, Utc};
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

/// Default SVG size in pixels
pub const DEFAULT_SIZE: (u32, u32) = (1200, 600);

/// X coordinate in epoch seconds whose ticks come from the axis locators.
///
/// Bold points (mesh lines and labels) are the major ticks, light points
/// the minor ones.
#[derive(Debug, Clone)]
struct LocatedTime {
    range: Range<f64>,
    major: Vec<f64>,
    minor: Vec<f64>,
}

impl LocatedTime {
    fn new(axis: &TimeAxis, lo: DateTime<Utc>, hi: DateTime<Utc>) -> Self {
        let to_secs = |ticks: Vec<DateTime<Utc>>| ticks.into_iter().map(to_epoch_secs).collect();
        Self {
            range: to_epoch_secs(lo)..to_epoch_secs(hi),
            major: to_secs(axis.major_ticks(lo, hi)),
            minor: to_secs(axis.minor_ticks(lo, hi)),
        }
    }
}

impl Ranged for LocatedTime {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let span = self.range.end - self.range.start;
        if span <= 0.0 {
            return limit.0;
        }
        let fraction = (value - self.range.start) / span;
        limit.0 + (f64::from(limit.1 - limit.0) * fraction + 1e-3).floor() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.weight().allow_light_points() {
            self.minor.clone()
        } else {
            self.major.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.range.clone()
    }
}

/// A single chart: one time axis, any number of date-indexed series
#[derive(Debug, Clone, Default)]
pub struct Figure {
    axis: TimeAxis,
    series: Vec<Series>,
    title: String,
    x_label: String,
    y_label: String,
    legend: Vec<String>,
    rotate_date_labels: bool,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn axis_mut(&mut self) -> &mut TimeAxis {
        &mut self.axis
    }

    /// Add a series, drawn after the ones already plotted
    pub fn plot(&mut self, series: Series) {
        self.series.push(series);
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_xlabel(&mut self, label: impl Into<String>) {
        self.x_label = label.into();
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) {
        self.y_label = label.into();
    }

    /// Legend entries, matched to series in plot order
    pub fn legend(&mut self, labels: Vec<String>) {
        self.legend = labels;
    }

    /// Rotate date tick labels so long timestamps don't overlap
    pub fn autofmt_xdate(&mut self) {
        self.rotate_date_labels = true;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    pub fn legend_labels(&self) -> &[String] {
        &self.legend
    }

    pub fn date_labels_rotated(&self) -> bool {
        self.rotate_date_labels
    }

    /// Date under a cursor, in the axis's inspector format
    pub fn inspect(&self, time: &DateTime<Utc>) -> String {
        self.axis.format_inspector(time)
    }

    /// X view limits covering every plotted point
    pub fn x_view(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let (lo, hi) = self
            .series
            .iter()
            .filter_map(Series::time_bounds)
            .reduce(|(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)))?;
        Some(self.axis.view_limits(lo, hi))
    }

    /// Y view limits covering every plotted value, with a margin
    pub fn y_view(&self) -> Option<(f64, f64)> {
        let (lo, hi) = self
            .series
            .iter()
            .filter_map(Series::value_bounds)
            .reduce(|(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)))?;
        Some(pad_values(lo, hi))
    }

    /// Draw the figure to an SVG file
    pub fn render_svg<P: AsRef<Path>>(&self, path: P, size: (u32, u32)) -> Result<()> {
        let (x_lo, x_hi) = self.x_view().ok_or(DisplayError::NothingToPlot)?;
        let (y_lo, y_hi) = self.y_view().ok_or(DisplayError::NothingToPlot)?;

        let x_range = LocatedTime::new(&self.axis, x_lo, x_hi);

        let root = SVGBackend::new(path.as_ref(), size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(if self.date_labels_rotated() { 130 } else { 40 })
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_lo..y_hi)?;

        let axis = &self.axis;
        let date_label = |x: &f64| {
            to_datetime(*x)
                .map(|time| axis.format_major(&time))
                .unwrap_or_default()
        };
        let label_font = if self.date_labels_rotated() {
            ("sans-serif", 12.0).into_font().transform(FontTransform::Rotate90)
        } else {
            ("sans-serif", 12.0).into_font()
        };

        {
            let mut mesh = chart.configure_mesh();
            mesh.x_desc(self.x_label.as_str())
                .y_desc(self.y_label.as_str())
                .x_label_formatter(&date_label)
                .x_label_style(label_font);
            if !self.axis.grid_enabled() {
                mesh.disable_mesh();
            }
            mesh.draw()?;
        }

        for (idx, series) in self.series.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            let points: Vec<(f64, f64)> = series
                .points
                .iter()
                .map(|(time, value)| (to_epoch_secs(*time), *value))
                .collect();

            let line = chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;
            if let Some(label) = self.legend.get(idx) {
                line.label(label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }

            chart.draw_series(points.iter().map(|point| Circle::new(*point, 3, color.filled())))?;
        }

        if !self.legend.is_empty() {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        log::info!("Wrote chart to {}", path.as_ref().display());
        Ok(())
    }
}

fn pad_values(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    let pad = if span > 0.0 {
        span * AUTOSCALE_MARGIN
    } else if lo != 0.0 {
        lo.abs() * AUTOSCALE_MARGIN
    } else {
        1.0
    };
    (lo - pad, hi + pad)
}
