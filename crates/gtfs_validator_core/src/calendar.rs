use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use gtfs_model::ExceptionType;
use rustc_hash::FxHashMap;

use crate::{FeedDateRange, GtfsFeed};

/// Trips and services running on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub services: usize,
    pub trips: usize,
}

/// Active dates per service id, resolved from weekly patterns and exceptions.
#[derive(Debug, Clone, Default)]
pub struct ServiceCalendar {
    service_ids: Vec<String>,
    active_dates: FxHashMap<String, BTreeSet<NaiveDate>>,
    trips_per_service: FxHashMap<String, usize>,
}

impl ServiceCalendar {
    pub fn from_feed(feed: &GtfsFeed) -> Self {
        let mut calendar = ServiceCalendar::default();

        for row in feed.calendar_rows() {
            let dates = calendar.dates_mut(&row.service_id);
            let end = row.end_date.naive();
            for date in row
                .start_date
                .naive()
                .iter_days()
                .take_while(|date| *date <= end)
            {
                if row.runs_on(date.weekday()) {
                    dates.insert(date);
                }
            }
        }

        for row in feed.calendar_date_rows() {
            let date = row.date.naive();
            let dates = calendar.dates_mut(&row.service_id);
            match row.exception_type {
                ExceptionType::Added => {
                    dates.insert(date);
                }
                ExceptionType::Removed => {
                    dates.remove(&date);
                }
                ExceptionType::Other => {}
            }
        }

        for trip in feed.trips.iter() {
            *calendar
                .trips_per_service
                .entry(trip.service_id.clone())
                .or_default() += 1;
        }

        calendar
    }

    fn dates_mut(&mut self, service_id: &str) -> &mut BTreeSet<NaiveDate> {
        if !self.active_dates.contains_key(service_id) {
            self.service_ids.push(service_id.to_string());
        }
        self.active_dates.entry(service_id.to_string()).or_default()
    }

    /// Service ids in the order they first appear in the feed.
    pub fn service_ids(&self) -> &[String] {
        &self.service_ids
    }

    pub fn is_defined(&self, service_id: &str) -> bool {
        self.active_dates.contains_key(service_id)
    }

    pub fn is_active(&self, service_id: &str, date: NaiveDate) -> bool {
        self.active_dates
            .get(service_id)
            .is_some_and(|dates| dates.contains(&date))
    }

    pub fn active_dates(&self, service_id: &str) -> Option<&BTreeSet<NaiveDate>> {
        self.active_dates.get(service_id)
    }

    pub fn trip_count(&self, service_id: &str) -> usize {
        self.trips_per_service.get(service_id).copied().unwrap_or(0)
    }

    pub fn activity_on(&self, date: NaiveDate) -> DailyActivity {
        let mut services = 0;
        let mut trips = 0;
        for service_id in &self.service_ids {
            if self.is_active(service_id, date) {
                services += 1;
                trips += self.trip_count(service_id);
            }
        }
        DailyActivity {
            date,
            services,
            trips,
        }
    }

    pub fn activity_between(&self, range: FeedDateRange) -> Vec<DailyActivity> {
        range.days().map(|date| self.activity_on(date)).collect()
    }

    /// `days` consecutive days starting at `start`; empty when `days` is 0.
    pub fn activity_from(&self, start: NaiveDate, days: u32) -> Vec<DailyActivity> {
        start
            .iter_days()
            .take(days as usize)
            .map(|date| self.activity_on(date))
            .collect()
    }
}
