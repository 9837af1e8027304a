use std::sync::OnceLock;

use gtfs_model::{Agency, Calendar, CalendarDate, Route, Shape, Stop, StopTime, Trip};

use crate::{CsvTable, GtfsInput, GtfsInputError, GtfsInputReader, ServiceCalendar};

pub const AGENCY_FILE: &str = "agency.txt";
pub const STOPS_FILE: &str = "stops.txt";
pub const ROUTES_FILE: &str = "routes.txt";
pub const TRIPS_FILE: &str = "trips.txt";
pub const STOP_TIMES_FILE: &str = "stop_times.txt";
pub const CALENDAR_FILE: &str = "calendar.txt";
pub const CALENDAR_DATES_FILE: &str = "calendar_dates.txt";
pub const SHAPES_FILE: &str = "shapes.txt";

/// A loaded feed, held read-only for one validation pass.
#[derive(Debug, Clone, Default)]
pub struct GtfsFeed {
    pub agency: CsvTable<Agency>,
    pub stops: CsvTable<Stop>,
    pub routes: CsvTable<Route>,
    pub trips: CsvTable<Trip>,
    pub stop_times: CsvTable<StopTime>,
    pub calendar: Option<CsvTable<Calendar>>,
    pub calendar_dates: Option<CsvTable<CalendarDate>>,
    pub shapes: Option<CsvTable<Shape>>,
    pub(crate) service_calendar: OnceLock<ServiceCalendar>,
}

impl GtfsFeed {
    pub fn from_input(input: &GtfsInput) -> Result<Self, GtfsInputError> {
        let mut reader = input.reader()?;
        Self::from_reader(&mut reader)
    }

    pub fn from_reader(reader: &mut GtfsInputReader) -> Result<Self, GtfsInputError> {
        let agency = reader.read_required_table(AGENCY_FILE)?;
        let stops = reader.read_required_table(STOPS_FILE)?;
        let routes = reader.read_required_table(ROUTES_FILE)?;
        let trips = reader.read_required_table(TRIPS_FILE)?;
        let stop_times = reader.read_required_table(STOP_TIMES_FILE)?;

        let calendar = reader.read_optional_table(CALENDAR_FILE)?;
        let calendar_dates = reader.read_optional_table(CALENDAR_DATES_FILE)?;
        if calendar.is_none() && calendar_dates.is_none() {
            return Err(GtfsInputError::MissingServiceCalendar);
        }
        let shapes = reader.read_optional_table(SHAPES_FILE)?;

        Ok(Self {
            agency,
            stops,
            routes,
            trips,
            stop_times,
            calendar,
            calendar_dates,
            shapes,
            service_calendar: OnceLock::new(),
        })
    }

    /// Resolved on first use; the tables must not change afterwards.
    pub fn service_calendar(&self) -> &ServiceCalendar {
        self.service_calendar.get_or_init(|| ServiceCalendar::from_feed(self))
    }

    pub fn calendar_rows(&self) -> &[Calendar] {
        self.calendar
            .as_ref()
            .map(|table| table.rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn calendar_date_rows(&self) -> &[CalendarDate] {
        self.calendar_dates
            .as_ref()
            .map(|table| table.rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn shape_rows(&self) -> &[Shape] {
        self.shapes
            .as_ref()
            .map(|table| table.rows.as_slice())
            .unwrap_or(&[])
    }
}
