use std::fmt;

use chrono::NaiveDate;

/// Inclusive span of service dates. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl FeedDateRange {
    /// Builds a range from two bounds given in either order.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }

    /// Widens this service-calendar range with explicit calendar dates.
    ///
    /// Each explicit bound only takes part when present, and only when it lies
    /// outside the base range: the result is the outer envelope of both.
    pub fn merge_explicit(
        self,
        explicit_start: Option<NaiveDate>,
        explicit_end: Option<NaiveDate>,
    ) -> Self {
        Self {
            start: earliest_date(explicit_start, self.start),
            end: latest_date(explicit_end, self.end),
        }
    }
}

impl fmt::Display for FeedDateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

pub fn earliest_date(candidate: Option<NaiveDate>, base: NaiveDate) -> NaiveDate {
    match candidate {
        Some(date) if date < base => date,
        _ => base,
    }
}

pub fn latest_date(candidate: Option<NaiveDate>, base: NaiveDate) -> NaiveDate {
    match candidate {
        Some(date) if date > base => date,
        _ => base,
    }
}
