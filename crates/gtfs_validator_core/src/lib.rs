pub mod calendar;
pub mod check;
pub mod config;
pub mod csv_table;
pub mod date_range;
pub mod engine;
pub mod feed;
pub mod finding;
pub mod geo;
pub mod input;
pub mod progress;
pub mod result;
pub mod rules;
pub mod section;
pub mod stats;

pub use calendar::{DailyActivity, ServiceCalendar};
pub use check::{check_fn, Check, CheckPlan, FnCheck};
pub use config::ValidatorConfig;
pub use csv_table::{parse_csv_table, CsvTable, MalformedRow};
pub use date_range::{earliest_date, latest_date, FeedDateRange};
pub use engine::{load_feed, validate_feed, validate_path, ValidationError, ValidationOutcome};
pub use feed::GtfsFeed;
pub use finding::{Finding, FindingCategory, Severity};
pub use input::{GtfsInput, GtfsInputError, GtfsInputReader};
pub use progress::{Channels, MemorySink, OutputSink, WriterSink};
pub use result::ValidationResult;
pub use section::{ReportSection, SectionResults};
pub use stats::{FeedCounts, FeedStatistics, FeedSummary, GtfsFeedStatistics};
