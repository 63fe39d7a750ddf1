//! Time axis configuration: tick locators, date label formats, autoscaling.

use chrono::{DateTime, Duration, Timelike, Utc};

/// Upper bound on ticks produced by one locator call
const MAX_TICKS: i64 = 1000;

/// Fraction of the data span added on each side when autoscaling
pub const AUTOSCALE_MARGIN: f64 = 0.05;

/// Rule deciding where ticks land on the time axis
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    /// Every `interval` hours, on the listed hours of the day
    Hourly { by_hour: Vec<u32>, interval: u32 },
    /// Every `interval` minutes, on the listed minutes of the hour
    Minutely { by_minute: Vec<u32>, interval: u32 },
}

impl Locator {
    pub fn hours<I: IntoIterator<Item = u32>>(by_hour: I, interval: u32) -> Self {
        Locator::Hourly {
            by_hour: by_hour.into_iter().collect(),
            interval: interval.max(1),
        }
    }

    pub fn minutes<I: IntoIterator<Item = u32>>(by_minute: I, interval: u32) -> Self {
        Locator::Minutely {
            by_minute: by_minute.into_iter().collect(),
            interval: interval.max(1),
        }
    }

    fn step_secs(&self) -> i64 {
        match self {
            Locator::Hourly { interval, .. } => i64::from(*interval) * 3600,
            Locator::Minutely { interval, .. } => i64::from(*interval) * 60,
        }
    }

    fn allows(&self, time: &DateTime<Utc>) -> bool {
        match self {
            Locator::Hourly { by_hour, .. } => by_hour.contains(&time.hour()),
            Locator::Minutely { by_minute, .. } => by_minute.contains(&time.minute()),
        }
    }

    /// All tick instants within `[start, end]`, aligned to the epoch.
    ///
    /// Very long ranges are thinned so no more than `MAX_TICKS` candidates
    /// are produced.
    pub fn ticks(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        if end < start {
            return Vec::new();
        }

        let base_step = self.step_secs();
        let start_secs = start.timestamp() + i64::from(start.timestamp_subsec_nanos() > 0);
        let first = start_secs.div_euclid(base_step) * base_step;
        let first = if first < start_secs { first + base_step } else { first };
        let last = end.timestamp();
        if first > last {
            return Vec::new();
        }

        let candidates = (last - first) / base_step + 1;
        let step = if candidates > MAX_TICKS {
            log::warn!(
                "{} ticks requested, thinning to at most {}",
                candidates,
                MAX_TICKS
            );
            base_step * ((candidates + MAX_TICKS - 1) / MAX_TICKS)
        } else {
            base_step
        };

        let mut ticks = Vec::new();
        let mut secs = first;
        while secs <= last {
            if let Some(time) = DateTime::from_timestamp(secs, 0) {
                if self.allows(&time) {
                    ticks.push(time);
                }
            }
            secs += step;
        }
        ticks
    }
}

/// strftime-style pattern for rendering axis dates
#[derive(Debug, Clone, PartialEq)]
pub struct DateFormat(String);

impl DateFormat {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn format(&self, time: &DateTime<Utc>) -> String {
        time.format(&self.0).to_string()
    }
}

/// The x axis of a figure, in UTC dates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeAxis {
    major_locator: Option<Locator>,
    minor_locator: Option<Locator>,
    major_formatter: Option<DateFormat>,
    inspector_formatter: Option<DateFormat>,
    autoscale: bool,
    grid: bool,
}

impl TimeAxis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_major_locator(&mut self, locator: Locator) {
        self.major_locator = Some(locator);
    }

    pub fn set_minor_locator(&mut self, locator: Locator) {
        self.minor_locator = Some(locator);
    }

    pub fn set_major_formatter(&mut self, format: DateFormat) {
        self.major_formatter = Some(format);
    }

    /// Format used when reporting the date under a cursor
    pub fn set_inspector_formatter(&mut self, format: DateFormat) {
        self.inspector_formatter = Some(format);
    }

    /// Fit the view limits to whatever ends up plotted
    pub fn autoscale_view(&mut self) {
        self.autoscale = true;
    }

    pub fn grid(&mut self, enabled: bool) {
        self.grid = enabled;
    }

    pub fn grid_enabled(&self) -> bool {
        self.grid
    }

    pub fn autoscale_enabled(&self) -> bool {
        self.autoscale
    }

    pub fn major_ticks(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        self.major_locator
            .as_ref()
            .map(|locator| locator.ticks(start, end))
            .unwrap_or_default()
    }

    pub fn minor_ticks(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        self.minor_locator
            .as_ref()
            .map(|locator| locator.ticks(start, end))
            .unwrap_or_default()
    }

    pub fn format_major(&self, time: &DateTime<Utc>) -> String {
        match &self.major_formatter {
            Some(format) => format.format(time),
            None => time.to_rfc3339(),
        }
    }

    pub fn format_inspector(&self, time: &DateTime<Utc>) -> String {
        match &self.inspector_formatter {
            Some(format) => format.format(time),
            None => self.format_major(time),
        }
    }

    /// View limits for data spanning `[lo, hi]`.
    ///
    /// With autoscaling on, the data span is padded on both sides; a zero
    /// span is widened to one hour each way. Padding never goes past the
    /// representable date range. Without autoscaling the data range is used
    /// as-is.
    pub fn view_limits(&self, lo: DateTime<Utc>, hi: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        if !self.autoscale_enabled() {
            return (lo, hi);
        }
        let span = hi - lo;
        let pad = if span <= Duration::zero() {
            Duration::hours(1)
        } else {
            let millis = (span.num_milliseconds() as f64 * AUTOSCALE_MARGIN).ceil() as i64;
            Duration::milliseconds(millis.max(1))
        };
        (
            lo.checked_sub_signed(pad).unwrap_or(DateTime::<Utc>::MIN_UTC),
            hi.checked_add_signed(pad).unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    }
}

/// Configure `axis` for day-scale time series.
///
/// Major ticks every 2 hours, minor ticks every 30 minutes, labels like
/// `17:30PM 09/23/15`, cursor readout like `Tuesday Sep 23 12:15PM`.
pub fn format_axes(axis: &mut TimeAxis) {
    axis.set_major_locator(Locator::hours(0..24, 2));
    axis.set_minor_locator(Locator::minutes(0..60, 30));
    axis.set_major_formatter(DateFormat::new("%H:%M%p %x"));
    axis.set_inspector_formatter(DateFormat::new("%A %b %d %H:%M%p"));
    axis.autoscale_view();
    axis.grid(true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn formatted() -> TimeAxis {
        let mut axis = TimeAxis::new();
        format_axes(&mut axis);
        axis
    }

    #[test]
    fn test_major_ticks_every_two_hours() {
        let axis = formatted();
        let ticks = axis.major_ticks(utc(2015, 9, 23, 1, 15), utc(2015, 9, 23, 9, 0));

        assert_eq!(
            ticks,
            vec![
                utc(2015, 9, 23, 2, 0),
                utc(2015, 9, 23, 4, 0),
                utc(2015, 9, 23, 6, 0),
                utc(2015, 9, 23, 8, 0),
            ]
        );
    }

    #[test]
    fn test_minor_ticks_every_half_hour() {
        let axis = formatted();
        let ticks = axis.minor_ticks(utc(2015, 9, 23, 10, 0), utc(2015, 9, 23, 11, 45));

        assert_eq!(
            ticks,
            vec![
                utc(2015, 9, 23, 10, 0),
                utc(2015, 9, 23, 10, 30),
                utc(2015, 9, 23, 11, 0),
                utc(2015, 9, 23, 11, 30),
            ]
        );
    }

    #[test]
    fn test_ticks_cross_midnight() {
        let axis = formatted();
        let ticks = axis.major_ticks(utc(2015, 9, 23, 21, 0), utc(2015, 9, 24, 3, 0));

        assert_eq!(
            ticks,
            vec![
                utc(2015, 9, 23, 22, 0),
                utc(2015, 9, 24, 0, 0),
                utc(2015, 9, 24, 2, 0),
            ]
        );
    }

    #[test]
    fn test_by_hour_filter() {
        let locator = Locator::hours([6, 18], 1);
        let ticks = locator.ticks(utc(2015, 9, 23, 0, 0), utc(2015, 9, 24, 0, 0));

        assert_eq!(ticks, vec![utc(2015, 9, 23, 6, 0), utc(2015, 9, 23, 18, 0)]);
    }

    #[test]
    fn test_long_range_is_thinned() {
        let locator = Locator::minutes(0..60, 30);
        let ticks = locator.ticks(utc(2015, 1, 1, 0, 0), utc(2016, 1, 1, 0, 0));

        assert!(!ticks.is_empty());
        assert!(ticks.len() as i64 <= MAX_TICKS);
    }

    #[test]
    fn test_reversed_range_has_no_ticks() {
        let axis = formatted();

        assert!(axis
            .major_ticks(utc(2015, 9, 24, 0, 0), utc(2015, 9, 23, 0, 0))
            .is_empty());
    }

    #[test]
    fn test_label_formats() {
        let axis = formatted();
        let time = utc(2015, 9, 23, 17, 30);

        assert_eq!(axis.format_major(&time), "17:30PM 09/23/15");
        assert_eq!(axis.format_inspector(&time), "Wednesday Sep 23 17:30PM");
    }

    #[test]
    fn test_unformatted_axis_defaults() {
        let axis = TimeAxis::new();
        let time = utc(2015, 9, 23, 17, 30);

        assert!(axis.major_ticks(time, time + Duration::days(1)).is_empty());
        assert_eq!(axis.format_inspector(&time), time.to_rfc3339());
        assert!(!axis.grid_enabled());
        assert!(!axis.autoscale_enabled());
    }

    #[test]
    fn test_format_axes_is_idempotent() {
        let mut axis = formatted();
        let before = axis.clone();
        format_axes(&mut axis);

        assert_eq!(axis, before);
        assert!(axis.grid_enabled());
        assert!(axis.autoscale_enabled());
    }

    #[test]
    fn test_view_limits_pad_data() {
        let axis = formatted();
        let (lo, hi) = axis.view_limits(utc(2015, 9, 23, 0, 0), utc(2015, 9, 23, 10, 0));

        assert_eq!(lo, utc(2015, 9, 22, 23, 30));
        assert_eq!(hi, utc(2015, 9, 23, 10, 30));

        let single = utc(2015, 9, 23, 5, 0);
        assert_eq!(
            axis.view_limits(single, single),
            (utc(2015, 9, 23, 4, 0), utc(2015, 9, 23, 6, 0))
        );
    }

    #[test]
    fn test_view_limits_clamp_at_date_range_ends() {
        let axis = formatted();

        let (lo, hi) = axis.view_limits(DateTime::<Utc>::MAX_UTC, DateTime::<Utc>::MAX_UTC);
        assert_eq!(lo, DateTime::<Utc>::MAX_UTC - Duration::hours(1));
        assert_eq!(hi, DateTime::<Utc>::MAX_UTC);

        let (lo, hi) = axis.view_limits(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MIN_UTC);
        assert_eq!(lo, DateTime::<Utc>::MIN_UTC);
        assert_eq!(hi, DateTime::<Utc>::MIN_UTC + Duration::hours(1));
    }
}
