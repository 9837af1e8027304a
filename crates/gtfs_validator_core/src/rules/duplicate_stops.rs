use gtfs_model::Stop;
use rustc_hash::FxHashMap;

use crate::geo::haversine_meters;
use crate::{Check, Finding, FindingCategory, GtfsFeed, ReportSection, ValidationResult};

const CODE_DUPLICATE_STOP: &str = "stops_too_close";

/// Lower bound on the length of one degree of latitude, anywhere on earth.
const METERS_PER_DEGREE_LATITUDE_FLOOR: f64 = 110_000.0;

/// Pairs of served stops that sit closer together than `distance_meters`.
#[derive(Debug)]
pub struct DuplicateStopsCheck {
    distance_meters: f64,
}

impl DuplicateStopsCheck {
    pub fn new(distance_meters: f64) -> Self {
        Self { distance_meters }
    }
}

impl Check for DuplicateStopsCheck {
    fn name(&self) -> &'static str {
        "duplicate_stops"
    }

    fn section(&self) -> ReportSection {
        ReportSection::Stops
    }

    fn run(&self, feed: &GtfsFeed) -> ValidationResult {
        let mut result = ValidationResult::new(self.name());
        if self.distance_meters <= 0.0 {
            return result;
        }

        let candidates: Vec<(usize, &Stop, (f64, f64))> = feed
            .stops
            .iter()
            .enumerate()
            .filter(|(_, stop)| stop.is_stop_or_platform())
            .filter_map(|(index, stop)| stop.coordinates().map(|coords| (index, stop, coords)))
            .collect();

        // Stops are bucketed by latitude; a close pair always lands in the same or adjacent bucket.
        let cell = (self.distance_meters / METERS_PER_DEGREE_LATITUDE_FLOOR).max(1e-7);
        let mut buckets: FxHashMap<i64, Vec<usize>> = FxHashMap::default();
        let mut pairs = Vec::new();
        for (position, (_, _, coords)) in candidates.iter().enumerate() {
            let bucket = (coords.0 / cell).floor() as i64;
            for neighbour in [bucket - 1, bucket, bucket + 1] {
                let Some(members) = buckets.get(&neighbour) else {
                    continue;
                };
                for &other in members {
                    let distance = haversine_meters(candidates[other].2, *coords);
                    if distance < self.distance_meters {
                        pairs.push((other, position, distance));
                    }
                }
            }
            buckets.entry(bucket).or_default().push(position);
        }

        pairs.sort_by_key(|&(first, second, _)| (candidates[first].0, candidates[second].0));
        for (first, second, distance) in pairs {
            let first = candidates[first].1;
            let second = candidates[second].1;
            result.push(
                Finding::warning(
                    FindingCategory::Stop,
                    CODE_DUPLICATE_STOP,
                    format!(
                        "within {:.1} m of stop {}{}",
                        distance,
                        first.stop_id,
                        stop_name_suffix(first)
                    ),
                )
                .with_entity_id(second.stop_id.as_str()),
            );
        }
        result
    }
}

fn stop_name_suffix(stop: &Stop) -> String {
    stop.stop_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .map(|name| format!(" (\"{}\")", name))
        .unwrap_or_default()
}
