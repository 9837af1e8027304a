use chrono::{NaiveDate, Utc};

pub const DEFAULT_MAX_DETAIL_LINES: usize = 128;
pub const DEFAULT_STOP_DISTANCE_THRESHOLD_METERS: f64 = 130.0;
pub const DEFAULT_DUPLICATE_STOP_DISTANCE_METERS: f64 = 2.0;
pub const DEFAULT_ACTIVE_CALENDAR_DAYS: u32 = 30;

/// Settings for one validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    /// Discards every write on both output channels.
    pub silent: bool,
    /// Findings printed per report section before the truncation marker.
    pub max_detail_lines: usize,
    /// Distance beyond which a stop is considered detached from its trip's shape.
    pub stop_distance_threshold_meters: f64,
    pub duplicate_stop_distance_meters: f64,
    /// First day of the active calendar listing; today when unset.
    pub validation_date: Option<NaiveDate>,
    pub active_calendar_days: u32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            silent: false,
            max_detail_lines: DEFAULT_MAX_DETAIL_LINES,
            stop_distance_threshold_meters: DEFAULT_STOP_DISTANCE_THRESHOLD_METERS,
            duplicate_stop_distance_meters: DEFAULT_DUPLICATE_STOP_DISTANCE_METERS,
            validation_date: None,
            active_calendar_days: DEFAULT_ACTIVE_CALENDAR_DAYS,
        }
    }
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn with_max_detail_lines(mut self, max_detail_lines: usize) -> Self {
        self.max_detail_lines = max_detail_lines;
        self
    }

    pub fn with_stop_distance_threshold_meters(mut self, meters: f64) -> Self {
        self.stop_distance_threshold_meters = meters;
        self
    }

    pub fn with_duplicate_stop_distance_meters(mut self, meters: f64) -> Self {
        self.duplicate_stop_distance_meters = meters;
        self
    }

    pub fn with_validation_date(mut self, date: NaiveDate) -> Self {
        self.validation_date = Some(date);
        self
    }

    pub fn with_active_calendar_days(mut self, days: u32) -> Self {
        self.active_calendar_days = days;
        self
    }

    pub fn validation_date_or_today(&self) -> NaiveDate {
        self.validation_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}
