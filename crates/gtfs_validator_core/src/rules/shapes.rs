use rustc_hash::{FxHashMap, FxHashSet};

use crate::geo::{haversine_meters, point_to_polyline_meters, LatLon};
use crate::rules::trips::stop_times_by_trip;
use crate::{Check, Finding, FindingCategory, GtfsFeed, ReportSection, ValidationResult};

const CODE_REVERSED_TRIP_SHAPE: &str = "reversed_trip_shape";
const CODE_STOP_TOO_FAR_FROM_SHAPE: &str = "stop_too_far_from_shape";

/// Trips whose stops run from the end of their shape towards its start.
#[derive(Debug, Default)]
pub struct ReversedTripShapeCheck;

impl Check for ReversedTripShapeCheck {
    fn name(&self) -> &'static str {
        "reversed_trip_shape"
    }

    fn section(&self) -> ReportSection {
        ReportSection::Shapes
    }

    fn run(&self, feed: &GtfsFeed) -> ValidationResult {
        let mut result = ValidationResult::new(self.name());
        let shapes = shape_polylines(feed);
        let stop_coords = stop_coordinates(feed);
        let by_trip = stop_times_by_trip(feed);

        for trip in feed.trips.iter() {
            let Some(shape_id) = trip.shape_id.as_deref() else {
                continue;
            };
            let Some(line) = shapes.get(shape_id).filter(|line| line.len() >= 2) else {
                continue;
            };
            let Some(stop_times) = by_trip.get(trip.trip_id.as_str()) else {
                continue;
            };
            let placed: Vec<LatLon> = stop_times
                .iter()
                .filter_map(|stop_time| stop_coords.get(stop_time.stop_id.as_str()).copied())
                .collect();
            let (Some(&first_stop), Some(&last_stop)) = (placed.first(), placed.last()) else {
                continue;
            };
            if placed.len() < 2 {
                continue;
            }

            let (shape_start, shape_end) = (line[0], line[line.len() - 1]);
            let first_nearer_end =
                haversine_meters(first_stop, shape_start) > haversine_meters(first_stop, shape_end);
            let last_nearer_start =
                haversine_meters(last_stop, shape_end) > haversine_meters(last_stop, shape_start);
            if first_nearer_end && last_nearer_start {
                result.push(
                    Finding::warning(
                        FindingCategory::Trip,
                        CODE_REVERSED_TRIP_SHAPE,
                        format!(
                            "trip runs against the direction of shape {}",
                            shape_id
                        ),
                    )
                    .with_entity_id(trip.trip_id.as_str()),
                );
            }
        }
        result
    }
}

/// Stops served by a trip that lie further than `threshold_meters` from the trip's shape.
#[derive(Debug)]
pub struct StopsAwayFromShapeCheck {
    threshold_meters: f64,
}

impl StopsAwayFromShapeCheck {
    pub fn new(threshold_meters: f64) -> Self {
        Self { threshold_meters }
    }
}

impl Check for StopsAwayFromShapeCheck {
    fn name(&self) -> &'static str {
        "stop_too_far_from_shape"
    }

    fn section(&self) -> ReportSection {
        ReportSection::Shapes
    }

    fn run(&self, feed: &GtfsFeed) -> ValidationResult {
        let mut result = ValidationResult::new(self.name());
        let shapes = shape_polylines(feed);
        let stop_coords = stop_coordinates(feed);
        let by_trip = stop_times_by_trip(feed);
        let mut checked: FxHashSet<(&str, &str)> = FxHashSet::default();

        for trip in feed.trips.iter() {
            let Some(shape_id) = trip.shape_id.as_deref() else {
                continue;
            };
            let Some(line) = shapes.get(shape_id) else {
                continue;
            };
            let Some(stop_times) = by_trip.get(trip.trip_id.as_str()) else {
                continue;
            };

            for stop_time in stop_times {
                let stop_id = stop_time.stop_id.as_str();
                if !checked.insert((shape_id, stop_id)) {
                    continue;
                }
                let Some(&coords) = stop_coords.get(stop_id) else {
                    continue;
                };
                let Some(distance) = point_to_polyline_meters(coords, line) else {
                    continue;
                };
                if distance > self.threshold_meters {
                    result.push(
                        Finding::warning(
                            FindingCategory::Stop,
                            CODE_STOP_TOO_FAR_FROM_SHAPE,
                            format!(
                                "{:.1} m from shape {} used by trip {} (limit {} m)",
                                distance, shape_id, trip.trip_id, self.threshold_meters
                            ),
                        )
                        .with_entity_id(stop_id),
                    );
                }
            }
        }
        result
    }
}

/// Shape points per shape id, ordered by `shape_pt_sequence`.
fn shape_polylines(feed: &GtfsFeed) -> FxHashMap<&str, Vec<LatLon>> {
    let mut points: FxHashMap<&str, Vec<(u32, LatLon)>> = FxHashMap::default();
    for shape in feed.shape_rows() {
        points
            .entry(shape.shape_id.as_str())
            .or_default()
            .push((shape.shape_pt_sequence, (shape.shape_pt_lat, shape.shape_pt_lon)));
    }
    points
        .into_iter()
        .map(|(shape_id, mut points)| {
            points.sort_by_key(|(sequence, _)| *sequence);
            (shape_id, points.into_iter().map(|(_, point)| point).collect())
        })
        .collect()
}

fn stop_coordinates(feed: &GtfsFeed) -> FxHashMap<&str, LatLon> {
    feed.stops
        .iter()
        .filter_map(|stop| stop.coordinates().map(|coords| (stop.stop_id.as_str(), coords)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CsvTable;
    use gtfs_model::{Shape, Stop, StopTime, Trip};

    fn shape_point(shape_id: &str, sequence: u32, lat: f64, lon: f64) -> Shape {
        Shape {
            shape_id: shape_id.to_string(),
            shape_pt_lat: lat,
            shape_pt_lon: lon,
            shape_pt_sequence: sequence,
            shape_dist_traveled: None,
        }
    }

    fn stop(stop_id: &str, lat: f64, lon: f64) -> Stop {
        Stop {
            stop_id: stop_id.to_string(),
            stop_lat: Some(lat),
            stop_lon: Some(lon),
            ..Default::default()
        }
    }

    fn stop_time(trip_id: &str, stop_id: &str, sequence: u32) -> StopTime {
        StopTime {
            trip_id: trip_id.to_string(),
            stop_id: stop_id.to_string(),
            stop_sequence: sequence,
            ..Default::default()
        }
    }

    fn shaped_trip(trip_id: &str, shape_id: &str) -> Trip {
        Trip {
            trip_id: trip_id.to_string(),
            route_id: "R1".to_string(),
            service_id: "WK".to_string(),
            shape_id: Some(shape_id.to_string()),
            ..Default::default()
        }
    }

    /// An east-west shape along the equator, with stops on it at both ends and beside it.
    fn feed() -> GtfsFeed {
        GtfsFeed {
            stops: CsvTable::from_rows(vec![
                stop("WEST", 0.0, 0.0),
                stop("EAST", 0.0, 0.01),
                stop("OFF", 0.005, 0.005),
            ]),
            trips: CsvTable::from_rows(vec![
                shaped_trip("OUT", "SH1"),
                shaped_trip("BACK", "SH1"),
                shaped_trip("DETOUR", "SH1"),
                shaped_trip("AGAIN", "SH1"),
            ]),
            stop_times: CsvTable::from_rows(vec![
                stop_time("OUT", "WEST", 1),
                stop_time("OUT", "EAST", 2),
                stop_time("BACK", "EAST", 1),
                stop_time("BACK", "WEST", 2),
                stop_time("DETOUR", "WEST", 1),
                stop_time("DETOUR", "OFF", 2),
                stop_time("DETOUR", "EAST", 3),
                stop_time("AGAIN", "OFF", 1),
                stop_time("AGAIN", "EAST", 2),
            ]),
            shapes: Some(CsvTable::from_rows(vec![
                shape_point("SH1", 2, 0.0, 0.005),
                shape_point("SH1", 1, 0.0, 0.0),
                shape_point("SH1", 3, 0.0, 0.01),
            ])),
            ..Default::default()
        }
    }

    #[test]
    fn flags_trips_running_against_their_shape() {
        let result = ReversedTripShapeCheck.run(&feed());
        assert_eq!(result.size(), 1);
        assert_eq!(result.findings()[0].affected_entity_id(), Some("BACK"));
        assert_eq!(result.findings()[0].problem(), CODE_REVERSED_TRIP_SHAPE);
    }

    #[test]
    fn flags_distant_stops_once_per_shape() {
        let result = StopsAwayFromShapeCheck::new(130.0).run(&feed());
        assert_eq!(result.size(), 1);
        let finding = &result.findings()[0];
        assert_eq!(finding.affected_entity_id(), Some("OFF"));
        assert!(finding.message().starts_with("556."), "{}", finding.message());
        assert!(finding.message().contains("trip DETOUR"));
    }

    #[test]
    fn larger_threshold_accepts_the_detour() {
        assert!(StopsAwayFromShapeCheck::new(600.0).run(&feed()).is_empty());
    }

    #[test]
    fn trips_without_shapes_are_skipped() {
        let mut feed = feed();
        feed.shapes = None;
        assert!(ReversedTripShapeCheck.run(&feed).is_empty());
        assert!(StopsAwayFromShapeCheck::new(130.0).run(&feed).is_empty());
    }
}
