use chrono::NaiveDate;
use gtfs_model::ExceptionType;

use crate::{FeedDateRange, GtfsFeed};

/// Feed-wide figures the report's statistics block is built from.
pub trait FeedStatistics {
    fn agency_count(&self) -> usize;
    fn route_count(&self) -> usize;
    fn trip_count(&self) -> usize;
    fn stop_count(&self) -> usize;
    fn stop_time_count(&self) -> usize;

    /// Agency names in feed order.
    fn agency_names(&self) -> Vec<String>;

    /// Earliest date explicitly added through a calendar exception.
    fn calendar_date_start(&self) -> Option<NaiveDate>;

    /// Latest date explicitly added through a calendar exception.
    fn calendar_date_end(&self) -> Option<NaiveDate>;

    /// Span implied by the weekly service patterns.
    fn calendar_service_range(&self) -> FeedDateRange;
}

/// [`FeedStatistics`] computed from a loaded [`GtfsFeed`].
#[derive(Debug, Clone, Copy)]
pub struct GtfsFeedStatistics<'a> {
    feed: &'a GtfsFeed,
    service_range: FeedDateRange,
}

impl<'a> GtfsFeedStatistics<'a> {
    /// `None` when the feed defines no service dates at all.
    pub fn new(feed: &'a GtfsFeed) -> Option<Self> {
        let service_range = service_range(feed)?;
        Some(Self {
            feed,
            service_range,
        })
    }
}

fn service_range(feed: &GtfsFeed) -> Option<FeedDateRange> {
    let calendar = feed.calendar_rows();
    if !calendar.is_empty() {
        let start = calendar.iter().map(|row| row.start_date.naive()).min()?;
        let end = calendar.iter().map(|row| row.end_date.naive()).max()?;
        return Some(FeedDateRange::new(start, end));
    }

    let dates = feed.calendar_date_rows();
    let start = dates.iter().map(|row| row.date.naive()).min()?;
    let end = dates.iter().map(|row| row.date.naive()).max()?;
    Some(FeedDateRange::new(start, end))
}

impl FeedStatistics for GtfsFeedStatistics<'_> {
    fn agency_count(&self) -> usize {
        self.feed.agency.len()
    }

    fn route_count(&self) -> usize {
        self.feed.routes.len()
    }

    fn trip_count(&self) -> usize {
        self.feed.trips.len()
    }

    fn stop_count(&self) -> usize {
        self.feed.stops.len()
    }

    fn stop_time_count(&self) -> usize {
        self.feed.stop_times.len()
    }

    fn agency_names(&self) -> Vec<String> {
        self.feed
            .agency
            .iter()
            .map(|agency| agency.agency_name.clone())
            .collect()
    }

    fn calendar_date_start(&self) -> Option<NaiveDate> {
        added_dates(self.feed).min()
    }

    fn calendar_date_end(&self) -> Option<NaiveDate> {
        added_dates(self.feed).max()
    }

    fn calendar_service_range(&self) -> FeedDateRange {
        self.service_range
    }
}

fn added_dates(feed: &GtfsFeed) -> impl Iterator<Item = NaiveDate> + '_ {
    feed.calendar_date_rows()
        .iter()
        .filter(|row| row.exception_type == ExceptionType::Added)
        .map(|row| row.date.naive())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedCounts {
    pub agencies: usize,
    pub routes: usize,
    pub trips: usize,
    pub stops: usize,
    pub stop_times: usize,
}

/// Everything the statistics block of a report shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSummary {
    pub counts: FeedCounts,
    pub date_range: FeedDateRange,
    pub agency_names: Vec<String>,
}

impl FeedSummary {
    pub fn from_statistics(stats: &dyn FeedStatistics) -> Self {
        let counts = FeedCounts {
            agencies: stats.agency_count(),
            routes: stats.route_count(),
            trips: stats.trip_count(),
            stops: stats.stop_count(),
            stop_times: stats.stop_time_count(),
        };
        let date_range = stats
            .calendar_service_range()
            .merge_explicit(stats.calendar_date_start(), stats.calendar_date_end());
        Self {
            counts,
            date_range,
            agency_names: stats.agency_names(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CsvTable;
    use gtfs_model::{Agency, Calendar, CalendarDate, GtfsDate, Trip};

    fn date(value: &str) -> GtfsDate {
        GtfsDate::parse(value).unwrap()
    }

    fn naive(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn calendar(service_id: &str, start: &str, end: &str) -> Calendar {
        Calendar {
            service_id: service_id.to_string(),
            start_date: date(start),
            end_date: date(end),
            ..Default::default()
        }
    }

    fn exception(service_id: &str, day: &str, exception_type: ExceptionType) -> CalendarDate {
        CalendarDate {
            service_id: service_id.to_string(),
            date: date(day),
            exception_type,
        }
    }

    #[test]
    fn counts_rows_and_lists_agencies_in_order() {
        let feed = GtfsFeed {
            agency: CsvTable::from_rows(vec![
                Agency {
                    agency_name: "Metro".into(),
                    ..Default::default()
                },
                Agency {
                    agency_name: "Valley Transit".into(),
                    ..Default::default()
                },
            ]),
            trips: CsvTable::from_rows(vec![Trip::default(), Trip::default()]),
            calendar: Some(CsvTable::from_rows(vec![calendar(
                "WK", "20240101", "20241231",
            )])),
            ..Default::default()
        };

        let stats = GtfsFeedStatistics::new(&feed).unwrap();
        assert_eq!(stats.agency_count(), 2);
        assert_eq!(stats.trip_count(), 2);
        assert_eq!(stats.route_count(), 0);
        assert_eq!(stats.agency_names(), vec!["Metro", "Valley Transit"]);
    }

    #[test]
    fn explicit_range_only_counts_added_dates() {
        let feed = GtfsFeed {
            calendar: Some(CsvTable::from_rows(vec![
                calendar("WK", "20240101", "20240630"),
                calendar("SA", "20240301", "20241231"),
            ])),
            calendar_dates: Some(CsvTable::from_rows(vec![
                exception("WK", "20231225", ExceptionType::Added),
                exception("WK", "20231201", ExceptionType::Removed),
                exception("SA", "20240102", ExceptionType::Added),
            ])),
            ..Default::default()
        };

        let stats = GtfsFeedStatistics::new(&feed).unwrap();
        assert_eq!(stats.calendar_date_start(), Some(naive(2023, 12, 25)));
        assert_eq!(stats.calendar_date_end(), Some(naive(2024, 1, 2)));
        assert_eq!(
            stats.calendar_service_range(),
            FeedDateRange::new(naive(2024, 1, 1), naive(2024, 12, 31))
        );

        let summary = FeedSummary::from_statistics(&stats);
        assert_eq!(
            summary.date_range,
            FeedDateRange::new(naive(2023, 12, 25), naive(2024, 12, 31))
        );
    }

    #[test]
    fn falls_back_to_calendar_dates_span() {
        let feed = GtfsFeed {
            calendar_dates: Some(CsvTable::from_rows(vec![
                exception("HOL", "20240704", ExceptionType::Added),
                exception("HOL", "20240101", ExceptionType::Added),
            ])),
            ..Default::default()
        };

        let stats = GtfsFeedStatistics::new(&feed).unwrap();
        assert_eq!(
            stats.calendar_service_range(),
            FeedDateRange::new(naive(2024, 1, 1), naive(2024, 7, 4))
        );
    }

    #[test]
    fn no_service_dates_yields_none() {
        let feed = GtfsFeed {
            calendar: Some(CsvTable::default()),
            ..Default::default()
        };
        assert!(GtfsFeedStatistics::new(&feed).is_none());
    }
}
