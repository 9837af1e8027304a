use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use crate::{
    Channels, CheckPlan, DailyActivity, FeedSummary, GtfsFeed, GtfsFeedStatistics, GtfsInput,
    GtfsInputError, SectionResults, ValidatorConfig,
};

/// Conditions that end a run before any report is produced.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("could not read feed {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: GtfsInputError,
    },
    #[error("feed has no trips")]
    NoTrips,
    #[error("feed defines no service dates")]
    NoServiceDates,
}

/// Everything a report is rendered from.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub summary: FeedSummary,
    pub results: SectionResults,
    pub active_days: Vec<DailyActivity>,
}

pub fn load_feed(path: &Path, channels: &mut Channels<'_>) -> Result<GtfsFeed, ValidationError> {
    channels.progress(&format!("Reading GTFS from {}", path.display()));
    let started = Instant::now();

    let loaded = GtfsInput::from_path(path).and_then(|input| GtfsFeed::from_input(&input));
    match loaded {
        Ok(feed) => {
            tracing::info!(
                path = %path.display(),
                trips = feed.trips.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "feed loaded"
            );
            channels.progress("Read GTFS");
            Ok(feed)
        }
        Err(source) => {
            tracing::debug!("loading {} failed: {}", path.display(), source);
            channels.progress(&format!(
                "Could not read file {}; does it exist and is it readable?",
                path.display()
            ));
            Err(ValidationError::Load {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Runs the plan over a loaded feed and computes the feed statistics.
pub fn validate_feed(
    feed: &GtfsFeed,
    plan: &CheckPlan,
    config: &ValidatorConfig,
    channels: &mut Channels<'_>,
) -> Result<ValidationOutcome, ValidationError> {
    if feed.trips.is_empty() {
        channels.progress("No Trips Found in GTFS, exiting");
        return Err(ValidationError::NoTrips);
    }

    let results = plan.run(feed, channels);
    tracing::debug!(findings = results.total_findings(), "checks finished");

    channels.progress("Calculating statistics");
    let Some(stats) = GtfsFeedStatistics::new(feed) else {
        channels.progress("No service dates found in GTFS, exiting");
        return Err(ValidationError::NoServiceDates);
    };
    let summary = FeedSummary::from_statistics(&stats);

    let active_days = feed
        .service_calendar()
        .activity_from(config.validation_date_or_today(), config.active_calendar_days);

    Ok(ValidationOutcome {
        summary,
        results,
        active_days,
    })
}

pub fn validate_path(
    path: &Path,
    plan: &CheckPlan,
    config: &ValidatorConfig,
    channels: &mut Channels<'_>,
) -> Result<ValidationOutcome, ValidationError> {
    let feed = load_feed(path, channels)?;
    validate_feed(&feed, plan, config, channels)
}
