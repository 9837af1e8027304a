//! The checks a default run executes.

pub mod duplicate_stops;
pub mod malformed_rows;
pub mod routes;
pub mod service_dates;
pub mod shapes;
pub mod trips;

pub use duplicate_stops::DuplicateStopsCheck;
pub use malformed_rows::MalformedRowsCheck;
pub use routes::{RoutesCheck, UnusedRouteCheck};
pub use service_dates::{DatesWithoutTripsCheck, ServiceNeverActiveCheck};
pub use shapes::{ReversedTripShapeCheck, StopsAwayFromShapeCheck};
pub use trips::{TripReferencesCheck, TripStopTimesCheck};

use crate::{CheckPlan, ReportSection, ValidatorConfig};

/// Skipped rows lead each section. Reversed shapes are registered before
/// off-shape stops so their findings come first.
pub fn default_plan(config: &ValidatorConfig) -> CheckPlan {
    CheckPlan::new()
        .with_check(MalformedRowsCheck::new(ReportSection::Routes))
        .with_check(RoutesCheck)
        .with_check(UnusedRouteCheck)
        .with_check(MalformedRowsCheck::new(ReportSection::Trips))
        .with_check(TripReferencesCheck)
        .with_check(TripStopTimesCheck)
        .with_check(MalformedRowsCheck::new(ReportSection::Stops))
        .with_check(DuplicateStopsCheck::new(
            config.duplicate_stop_distance_meters,
        ))
        .with_check(MalformedRowsCheck::new(ReportSection::Shapes))
        .with_check(ReversedTripShapeCheck)
        .with_check(StopsAwayFromShapeCheck::new(
            config.stop_distance_threshold_meters,
        ))
        .with_check(MalformedRowsCheck::new(ReportSection::Dates))
        .with_check(DatesWithoutTripsCheck)
        .with_check(ServiceNeverActiveCheck)
}
