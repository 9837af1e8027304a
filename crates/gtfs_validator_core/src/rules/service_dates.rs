use rustc_hash::FxHashSet;

use crate::{
    Check, FeedSummary, Finding, FindingCategory, GtfsFeed, GtfsFeedStatistics, ReportSection,
    ValidationResult,
};

const CODE_DATE_WITHOUT_TRIPS: &str = "date_without_trips";
const CODE_SERVICE_NEVER_ACTIVE: &str = "service_never_active";

/// Days inside the feed's service span on which no trip runs.
#[derive(Debug, Default)]
pub struct DatesWithoutTripsCheck;

impl Check for DatesWithoutTripsCheck {
    fn name(&self) -> &'static str {
        "dates_without_trips"
    }

    fn section(&self) -> ReportSection {
        ReportSection::Dates
    }

    fn run(&self, feed: &GtfsFeed) -> ValidationResult {
        let mut result = ValidationResult::new(self.name());
        let Some(stats) = GtfsFeedStatistics::new(feed) else {
            return result;
        };
        let range = FeedSummary::from_statistics(&stats).date_range;
        let calendar = feed.service_calendar();

        for day in calendar.activity_between(range) {
            if day.trips == 0 {
                result.push(
                    Finding::warning(
                        FindingCategory::Calendar,
                        CODE_DATE_WITHOUT_TRIPS,
                        format!("no trips scheduled on {} ({})", day.date, day.date.format("%A")),
                    )
                    .with_entity_id(day.date.format("%Y-%m-%d").to_string()),
                );
            }
        }
        result
    }
}

/// Services used by trips that are never active on any date.
#[derive(Debug, Default)]
pub struct ServiceNeverActiveCheck;

impl Check for ServiceNeverActiveCheck {
    fn name(&self) -> &'static str {
        "service_never_active"
    }

    fn section(&self) -> ReportSection {
        ReportSection::Dates
    }

    fn run(&self, feed: &GtfsFeed) -> ValidationResult {
        let mut result = ValidationResult::new(self.name());
        let calendar = feed.service_calendar();
        let mut reported: FxHashSet<&str> = FxHashSet::default();

        for trip in feed.trips.iter() {
            let service_id = trip.service_id.as_str();
            // Undefined services are reported with the trips.
            if !calendar.is_defined(service_id) || !reported.insert(service_id) {
                continue;
            }
            if calendar
                .active_dates(service_id)
                .map_or(true, |dates| dates.is_empty())
            {
                result.push(
                    Finding::warning(
                        FindingCategory::Calendar,
                        CODE_SERVICE_NEVER_ACTIVE,
                        format!(
                            "service is used by {} trips but has no active dates",
                            calendar.trip_count(service_id)
                        ),
                    )
                    .with_entity_id(service_id),
                );
            }
        }
        result
    }
}
