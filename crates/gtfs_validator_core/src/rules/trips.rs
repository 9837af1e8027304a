use gtfs_model::StopTime;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::feed::{STOP_TIMES_FILE, TRIPS_FILE};
use crate::{Check, Finding, FindingCategory, GtfsFeed, ReportSection, ValidationResult};

const CODE_TRIP_ROUTE_NOT_FOUND: &str = "trip_route_id_not_found";
const CODE_TRIP_SERVICE_NOT_FOUND: &str = "trip_service_id_not_found";
const CODE_TRIP_SHAPE_NOT_FOUND: &str = "trip_shape_id_not_found";
const CODE_TRIP_TOO_FEW_STOP_TIMES: &str = "trip_with_fewer_than_two_stop_times";
const CODE_STOP_TIME_BACKWARDS: &str = "stop_time_goes_backwards";
const CODE_STOP_TIME_TRIP_NOT_FOUND: &str = "stop_time_trip_id_not_found";
const CODE_STOP_TIME_STOP_NOT_FOUND: &str = "stop_time_stop_id_not_found";

/// References from `trips.txt` to routes, services and shapes.
#[derive(Debug, Default)]
pub struct TripReferencesCheck;

impl Check for TripReferencesCheck {
    fn name(&self) -> &'static str {
        "trip_references"
    }

    fn section(&self) -> ReportSection {
        ReportSection::Trips
    }

    fn run(&self, feed: &GtfsFeed) -> ValidationResult {
        let mut result = ValidationResult::new(self.name());
        let route_ids: FxHashSet<&str> = feed.routes.iter().map(|r| r.route_id.as_str()).collect();
        let service_ids: FxHashSet<&str> = feed
            .calendar_rows()
            .iter()
            .map(|row| row.service_id.as_str())
            .chain(
                feed.calendar_date_rows()
                    .iter()
                    .map(|row| row.service_id.as_str()),
            )
            .collect();
        let shape_ids: FxHashSet<&str> = feed
            .shape_rows()
            .iter()
            .map(|shape| shape.shape_id.as_str())
            .collect();

        for (index, trip) in feed.trips.iter().enumerate() {
            let row_number = feed.trips.row_number(index);
            if !route_ids.contains(trip.route_id.as_str()) {
                result.push(trip_error(
                    &trip.trip_id,
                    CODE_TRIP_ROUTE_NOT_FOUND,
                    format!(
                        "route_id {} is not defined in routes.txt ({} row {})",
                        trip.route_id, TRIPS_FILE, row_number
                    ),
                ));
            }
            if !service_ids.contains(trip.service_id.as_str()) {
                result.push(trip_error(
                    &trip.trip_id,
                    CODE_TRIP_SERVICE_NOT_FOUND,
                    format!(
                        "service_id {} is not defined in calendar.txt or calendar_dates.txt ({} row {})",
                        trip.service_id, TRIPS_FILE, row_number
                    ),
                ));
            }
            if let Some(shape_id) = trip.shape_id.as_deref().filter(|id| !id.is_empty()) {
                if !shape_ids.contains(shape_id) {
                    result.push(trip_error(
                        &trip.trip_id,
                        CODE_TRIP_SHAPE_NOT_FOUND,
                        format!("shape_id {} is not defined in shapes.txt", shape_id),
                    ));
                }
            }
        }
        result
    }
}

/// Shape of each trip's stop time sequence.
#[derive(Debug, Default)]
pub struct TripStopTimesCheck;

impl Check for TripStopTimesCheck {
    fn name(&self) -> &'static str {
        "trip_stop_times"
    }

    fn section(&self) -> ReportSection {
        ReportSection::Trips
    }

    fn run(&self, feed: &GtfsFeed) -> ValidationResult {
        let mut result = ValidationResult::new(self.name());
        let trip_ids: FxHashSet<&str> = feed.trips.iter().map(|t| t.trip_id.as_str()).collect();
        let stop_ids: FxHashSet<&str> = feed.stops.iter().map(|s| s.stop_id.as_str()).collect();

        for (index, stop_time) in feed.stop_times.iter().enumerate() {
            let row_number = feed.stop_times.row_number(index);
            if !trip_ids.contains(stop_time.trip_id.as_str()) {
                result.push(
                    Finding::error(
                        FindingCategory::StopTime,
                        CODE_STOP_TIME_TRIP_NOT_FOUND,
                        format!(
                            "trip_id {} is not defined in trips.txt ({} row {})",
                            stop_time.trip_id, STOP_TIMES_FILE, row_number
                        ),
                    )
                    .with_entity_id(format!("{}#{}", stop_time.trip_id, stop_time.stop_sequence)),
                );
            }
            if !stop_ids.contains(stop_time.stop_id.as_str()) {
                result.push(
                    Finding::error(
                        FindingCategory::StopTime,
                        CODE_STOP_TIME_STOP_NOT_FOUND,
                        format!(
                            "stop_id {} is not defined in stops.txt ({} row {})",
                            stop_time.stop_id, STOP_TIMES_FILE, row_number
                        ),
                    )
                    .with_entity_id(format!("{}#{}", stop_time.trip_id, stop_time.stop_sequence)),
                );
            }
        }

        let by_trip = stop_times_by_trip(feed);
        for trip in feed.trips.iter() {
            let stop_times = by_trip
                .get(trip.trip_id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            if stop_times.len() < 2 {
                result.push(trip_error(
                    &trip.trip_id,
                    CODE_TRIP_TOO_FEW_STOP_TIMES,
                    format!("trip has {} stop times, at least 2 are needed", stop_times.len()),
                ));
                continue;
            }
            if let Some((previous, current)) = first_backwards_step(stop_times) {
                result.push(trip_warning(
                    &trip.trip_id,
                    CODE_STOP_TIME_BACKWARDS,
                    format!(
                        "stop_sequence {} at stop {} is earlier than stop_sequence {} at stop {}",
                        current.stop_sequence,
                        current.stop_id,
                        previous.stop_sequence,
                        previous.stop_id
                    ),
                ));
            }
        }
        result
    }
}

/// Stop times of every trip, sorted by `stop_sequence`.
pub(crate) fn stop_times_by_trip(feed: &GtfsFeed) -> FxHashMap<&str, Vec<&StopTime>> {
    let mut by_trip: FxHashMap<&str, Vec<&StopTime>> = FxHashMap::default();
    for stop_time in feed.stop_times.iter() {
        by_trip
            .entry(stop_time.trip_id.as_str())
            .or_default()
            .push(stop_time);
    }
    for stop_times in by_trip.values_mut() {
        stop_times.sort_by_key(|stop_time| stop_time.stop_sequence);
    }
    by_trip
}

/// First pair of timed stops where time decreases along the sequence.
fn first_backwards_step<'a>(stop_times: &[&'a StopTime]) -> Option<(&'a StopTime, &'a StopTime)> {
    let mut previous: Option<(&'a StopTime, i32)> = None;
    for &stop_time in stop_times {
        let Some(arrival) = stop_time.arrival_time.or(stop_time.departure_time) else {
            continue;
        };
        if let Some((earlier, earlier_departure)) = previous {
            if arrival.total_seconds() < earlier_departure {
                return Some((earlier, stop_time));
            }
        }
        let departure = stop_time.departure_time.unwrap_or(arrival);
        previous = Some((stop_time, departure.total_seconds()));
    }
    None
}

fn trip_error(trip_id: &str, problem: &str, message: impl Into<String>) -> Finding {
    Finding::error(FindingCategory::Trip, problem, message).with_entity_id(trip_id)
}

fn trip_warning(trip_id: &str, problem: &str, message: impl Into<String>) -> Finding {
    Finding::warning(FindingCategory::Trip, problem, message).with_entity_id(trip_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CsvTable;
    use gtfs_model::{Calendar, GtfsTime, Route, Stop, Trip};

    fn trip(trip_id: &str, route_id: &str, service_id: &str) -> Trip {
        Trip {
            trip_id: trip_id.to_string(),
            route_id: route_id.to_string(),
            service_id: service_id.to_string(),
            ..Default::default()
        }
    }

    fn stop_time(trip_id: &str, stop_id: &str, sequence: u32, time: &str) -> StopTime {
        let time = GtfsTime::parse(time).unwrap();
        StopTime {
            trip_id: trip_id.to_string(),
            stop_id: stop_id.to_string(),
            stop_sequence: sequence,
            arrival_time: Some(time),
            departure_time: Some(time),
            ..Default::default()
        }
    }

    fn stop(stop_id: &str) -> Stop {
        Stop {
            stop_id: stop_id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn flags_unknown_references() {
        let mut shaped = trip("T2", "R1", "WK");
        shaped.shape_id = Some("SH9".to_string());
        let feed = GtfsFeed {
            routes: CsvTable::from_rows(vec![Route {
                route_id: "R1".to_string(),
                ..Default::default()
            }]),
            trips: CsvTable::from_rows(vec![trip("T1", "R9", "XX"), shaped]),
            calendar: Some(CsvTable::from_rows(vec![Calendar {
                service_id: "WK".to_string(),
                ..Default::default()
            }])),
            ..Default::default()
        };

        let result = TripReferencesCheck.run(&feed);
        let problems: Vec<_> = result.iter().map(Finding::problem).collect();
        assert_eq!(
            problems,
            vec![
                CODE_TRIP_ROUTE_NOT_FOUND,
                CODE_TRIP_SERVICE_NOT_FOUND,
                CODE_TRIP_SHAPE_NOT_FOUND
            ]
        );
        assert_eq!(result.findings()[0].affected_entity_id(), Some("T1"));
        assert_eq!(result.findings()[2].affected_entity_id(), Some("T2"));
    }

    #[test]
    fn flags_short_and_backwards_trips() {
        let feed = GtfsFeed {
            stops: CsvTable::from_rows(vec![stop("A"), stop("B"), stop("C")]),
            trips: CsvTable::from_rows(vec![
                trip("T1", "R1", "WK"),
                trip("T2", "R1", "WK"),
                trip("T3", "R1", "WK"),
            ]),
            stop_times: CsvTable::from_rows(vec![
                stop_time("T1", "A", 1, "08:00:00"),
                stop_time("T2", "A", 1, "09:00:00"),
                stop_time("T2", "B", 2, "08:55:00"),
                stop_time("T3", "C", 3, "10:10:00"),
                stop_time("T3", "A", 1, "10:00:00"),
                stop_time("T3", "B", 2, "10:05:00"),
            ]),
            ..Default::default()
        };

        let result = TripStopTimesCheck.run(&feed);
        let flagged: Vec<_> = result
            .iter()
            .map(|finding| (finding.affected_entity_id(), finding.problem()))
            .collect();
        assert_eq!(
            flagged,
            vec![
                (Some("T1"), CODE_TRIP_TOO_FEW_STOP_TIMES),
                (Some("T2"), CODE_STOP_TIME_BACKWARDS),
            ]
        );
    }

    #[test]
    fn flags_stop_times_with_unknown_trip_or_stop() {
        let feed = GtfsFeed {
            stops: CsvTable::from_rows(vec![stop("A")]),
            trips: CsvTable::from_rows(vec![trip("T1", "R1", "WK")]),
            stop_times: CsvTable::from_rows(vec![
                stop_time("T1", "A", 1, "08:00:00"),
                stop_time("T1", "Z", 2, "08:10:00"),
                stop_time("GHOST", "A", 1, "08:00:00"),
            ]),
            ..Default::default()
        };

        let result = TripStopTimesCheck.run(&feed);
        let problems: Vec<_> = result.iter().map(Finding::problem).collect();
        assert_eq!(
            problems,
            vec![CODE_STOP_TIME_STOP_NOT_FOUND, CODE_STOP_TIME_TRIP_NOT_FOUND]
        );
        assert_eq!(result.findings()[0].affected_entity_id(), Some("T1#2"));
    }

    #[test]
    fn untimed_stops_are_skipped_when_ordering() {
        let mut untimed = stop_time("T1", "B", 2, "00:00:00");
        untimed.arrival_time = None;
        untimed.departure_time = None;
        let stop_times = [
            stop_time("T1", "A", 1, "08:00:00"),
            untimed,
            stop_time("T1", "C", 3, "08:20:00"),
        ];
        let refs: Vec<&StopTime> = stop_times.iter().collect();
        assert!(first_backwards_step(&refs).is_none());
    }
}
