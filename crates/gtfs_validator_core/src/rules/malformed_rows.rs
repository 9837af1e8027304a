use crate::feed::{
    AGENCY_FILE, CALENDAR_DATES_FILE, CALENDAR_FILE, ROUTES_FILE, SHAPES_FILE, STOPS_FILE,
    STOP_TIMES_FILE, TRIPS_FILE,
};
use crate::{
    Check, Finding, FindingCategory, GtfsFeed, MalformedRow, ReportSection, ValidationResult,
};

const CODE_MALFORMED_ROW: &str = "malformed_row";

/// Rows the loader skipped because a cell did not parse, reported in the
/// section that owns the file.
#[derive(Debug)]
pub struct MalformedRowsCheck {
    section: ReportSection,
}

impl MalformedRowsCheck {
    pub fn new(section: ReportSection) -> Self {
        Self { section }
    }

    fn tables<'a>(
        &self,
        feed: &'a GtfsFeed,
    ) -> Vec<(&'static str, FindingCategory, &'a [MalformedRow])> {
        match self.section {
            ReportSection::Routes => vec![
                (
                    AGENCY_FILE,
                    FindingCategory::Agency,
                    feed.agency.malformed_rows.as_slice(),
                ),
                (
                    ROUTES_FILE,
                    FindingCategory::Route,
                    feed.routes.malformed_rows.as_slice(),
                ),
            ],
            ReportSection::Trips => vec![
                (
                    TRIPS_FILE,
                    FindingCategory::Trip,
                    feed.trips.malformed_rows.as_slice(),
                ),
                (
                    STOP_TIMES_FILE,
                    FindingCategory::StopTime,
                    feed.stop_times.malformed_rows.as_slice(),
                ),
            ],
            ReportSection::Stops => vec![(
                STOPS_FILE,
                FindingCategory::Stop,
                feed.stops.malformed_rows.as_slice(),
            )],
            ReportSection::Shapes => feed
                .shapes
                .as_ref()
                .map(|table| {
                    (
                        SHAPES_FILE,
                        FindingCategory::Shape,
                        table.malformed_rows.as_slice(),
                    )
                })
                .into_iter()
                .collect(),
            ReportSection::Dates => {
                let mut tables = Vec::new();
                if let Some(table) = feed.calendar.as_ref() {
                    tables.push((
                        CALENDAR_FILE,
                        FindingCategory::Calendar,
                        table.malformed_rows.as_slice(),
                    ));
                }
                if let Some(table) = feed.calendar_dates.as_ref() {
                    tables.push((
                        CALENDAR_DATES_FILE,
                        FindingCategory::CalendarDate,
                        table.malformed_rows.as_slice(),
                    ));
                }
                tables
            }
        }
    }
}

impl Check for MalformedRowsCheck {
    fn name(&self) -> &'static str {
        match self.section {
            ReportSection::Routes => "malformed_route_rows",
            ReportSection::Trips => "malformed_trip_rows",
            ReportSection::Stops => "malformed_stop_rows",
            ReportSection::Shapes => "malformed_shape_rows",
            ReportSection::Dates => "malformed_calendar_rows",
        }
    }

    fn section(&self) -> ReportSection {
        self.section
    }

    fn run(&self, feed: &GtfsFeed) -> ValidationResult {
        let mut result = ValidationResult::new(self.name());
        for (file, category, rows) in self.tables(feed) {
            for row in rows {
                let message = match row.field.as_deref() {
                    Some(field) => format!("row skipped, {}: {}", field, row.message),
                    None => format!("row skipped: {}", row.message),
                };
                result.push(
                    Finding::error(category, CODE_MALFORMED_ROW, message)
                        .with_entity_id(format!("{}:{}", file, row.row_number)),
                );
            }
        }
        result
    }
}
