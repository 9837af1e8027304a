use rustc_hash::FxHashSet;

use crate::feed::ROUTES_FILE;
use crate::{Check, Finding, FindingCategory, GtfsFeed, ReportSection, ValidationResult};

const CODE_ROUTE_BOTH_NAMES_MISSING: &str = "route_both_short_and_long_name_missing";
const CODE_ROUTE_LONG_NAME_CONTAINS_SHORT: &str = "route_long_name_contains_short_name";
const CODE_ROUTE_DESC_SAME_AS_NAME: &str = "same_name_and_description_for_route";
const CODE_UNKNOWN_ROUTE_TYPE: &str = "unknown_route_type";
const CODE_ROUTE_AGENCY_NOT_FOUND: &str = "route_agency_id_not_found";
const CODE_ROUTE_AGENCY_ID_REQUIRED: &str = "route_agency_id_required";
const CODE_UNUSED_ROUTE: &str = "unused_route";

/// Per-row checks on `routes.txt`: names, description, route type and agency.
#[derive(Debug, Default)]
pub struct RoutesCheck;

impl Check for RoutesCheck {
    fn name(&self) -> &'static str {
        "routes_basic"
    }

    fn section(&self) -> ReportSection {
        ReportSection::Routes
    }

    fn run(&self, feed: &GtfsFeed) -> ValidationResult {
        let mut result = ValidationResult::new(self.name());
        let agency_ids: FxHashSet<&str> = feed
            .agency
            .iter()
            .filter_map(|agency| non_empty(agency.agency_id.as_deref()))
            .collect();
        let multiple_agencies = feed.agency.len() > 1;

        for (index, route) in feed.routes.iter().enumerate() {
            let row_number = feed.routes.row_number(index);
            let route_id = route.route_id.as_str();
            let short_name = non_empty(route.route_short_name.as_deref());
            let long_name = non_empty(route.route_long_name.as_deref());

            match (short_name, long_name) {
                (None, None) => {
                    result.push(route_error(
                        route_id,
                        CODE_ROUTE_BOTH_NAMES_MISSING,
                        format!(
                            "route_short_name and route_long_name are both missing ({} row {})",
                            ROUTES_FILE, row_number
                        ),
                    ));
                }
                (Some(short), Some(long)) if long_name_repeats_short(short, long) => {
                    result.push(route_warning(
                        route_id,
                        CODE_ROUTE_LONG_NAME_CONTAINS_SHORT,
                        format!(
                            "route_long_name \"{}\" repeats route_short_name \"{}\"",
                            long, short
                        ),
                    ));
                }
                _ => {}
            }

            if let Some(route_desc) = non_empty(route.route_desc.as_deref()) {
                let same_as = [("route_short_name", short_name), ("route_long_name", long_name)]
                    .into_iter()
                    .find(|(_, name)| name.is_some_and(|name| route_desc.eq_ignore_ascii_case(name)));
                if let Some((field, _)) = same_as {
                    result.push(route_warning(
                        route_id,
                        CODE_ROUTE_DESC_SAME_AS_NAME,
                        format!("route_desc \"{}\" only repeats {}", route_desc, field),
                    ));
                }
            }

            if !route.route_type.is_known() {
                result.push(route_error(
                    route_id,
                    CODE_UNKNOWN_ROUTE_TYPE,
                    format!(
                        "route_type {} is not a known vehicle type ({} row {})",
                        route.route_type.code(),
                        ROUTES_FILE,
                        row_number
                    ),
                ));
            }

            match non_empty(route.agency_id.as_deref()) {
                Some(agency_id) if !agency_ids.contains(agency_id) => {
                    result.push(route_error(
                        route_id,
                        CODE_ROUTE_AGENCY_NOT_FOUND,
                        format!("agency_id {} is not defined in agency.txt", agency_id),
                    ));
                }
                None if multiple_agencies => {
                    result.push(route_error(
                        route_id,
                        CODE_ROUTE_AGENCY_ID_REQUIRED,
                        "agency_id is required when the feed has more than one agency",
                    ));
                }
                _ => {}
            }
        }

        result
    }
}

/// Routes that no trip refers to.
#[derive(Debug, Default)]
pub struct UnusedRouteCheck;

impl Check for UnusedRouteCheck {
    fn name(&self) -> &'static str {
        "unused_route"
    }

    fn section(&self) -> ReportSection {
        ReportSection::Routes
    }

    fn run(&self, feed: &GtfsFeed) -> ValidationResult {
        let mut result = ValidationResult::new(self.name());
        let used_route_ids: FxHashSet<&str> = feed
            .trips
            .iter()
            .map(|trip| trip.route_id.as_str())
            .collect();

        for route in feed.routes.iter() {
            if !used_route_ids.contains(route.route_id.as_str()) {
                result.push(route_warning(
                    &route.route_id,
                    CODE_UNUSED_ROUTE,
                    "route has no trips",
                ));
            }
        }
        result
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// True when the long name is the short name, or starts with it followed by a separator.
fn long_name_repeats_short(short: &str, long: &str) -> bool {
    let Some(prefix) = long.get(..short.len()) else {
        return false;
    };
    if !prefix.eq_ignore_ascii_case(short) {
        return false;
    }
    match long[short.len()..].chars().next() {
        None => true,
        Some(ch) => ch.is_whitespace() || ch == '-' || ch == '(',
    }
}

fn route_error(route_id: &str, problem: &str, message: impl Into<String>) -> Finding {
    Finding::error(FindingCategory::Route, problem, message).with_entity_id(route_id)
}

fn route_warning(route_id: &str, problem: &str, message: impl Into<String>) -> Finding {
    Finding::warning(FindingCategory::Route, problem, message).with_entity_id(route_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CsvTable;
    use gtfs_model::{Agency, Route, RouteType, Trip};

    fn route(route_id: &str, short: Option<&str>, long: Option<&str>) -> Route {
        Route {
            route_id: route_id.to_string(),
            route_short_name: short.map(str::to_string),
            route_long_name: long.map(str::to_string),
            ..Default::default()
        }
    }

    fn problems(result: &ValidationResult) -> Vec<&str> {
        result.iter().map(Finding::problem).collect()
    }

    #[test]
    fn flags_missing_and_repeated_names() {
        let feed = GtfsFeed {
            routes: CsvTable::from_rows(vec![
                route("R1", None, Some("  ")),
                route("R2", Some("10"), Some("10 - Downtown")),
                route("R3", Some("10"), Some("100 Crosstown")),
            ]),
            ..Default::default()
        };

        let result = RoutesCheck.run(&feed);
        assert_eq!(
            problems(&result),
            vec![CODE_ROUTE_BOTH_NAMES_MISSING, CODE_ROUTE_LONG_NAME_CONTAINS_SHORT]
        );
        assert_eq!(result.findings()[0].affected_entity_id(), Some("R1"));
        assert!(result.findings()[0].message().contains("routes.txt row 2"));
    }

    #[test]
    fn flags_description_equal_to_a_name() {
        let mut described = route("R1", Some("A"), Some("Airport"));
        described.route_desc = Some("airport".to_string());
        let feed = GtfsFeed {
            routes: CsvTable::from_rows(vec![described]),
            ..Default::default()
        };

        let result = RoutesCheck.run(&feed);
        assert_eq!(problems(&result), vec![CODE_ROUTE_DESC_SAME_AS_NAME]);
        assert!(result.findings()[0].message().contains("route_long_name"));
    }

    #[test]
    fn flags_unknown_route_type_and_agency() {
        let mut odd = route("R1", Some("1"), None);
        odd.route_type = RouteType::from_i32(42);
        odd.agency_id = Some("NOPE".to_string());
        let feed = GtfsFeed {
            agency: CsvTable::from_rows(vec![Agency {
                agency_id: Some("METRO".to_string()),
                agency_name: "Metro".to_string(),
                ..Default::default()
            }]),
            routes: CsvTable::from_rows(vec![odd]),
            ..Default::default()
        };

        let result = RoutesCheck.run(&feed);
        assert_eq!(
            problems(&result),
            vec![CODE_UNKNOWN_ROUTE_TYPE, CODE_ROUTE_AGENCY_NOT_FOUND]
        );
    }

    #[test]
    fn requires_agency_id_with_several_agencies() {
        let feed = GtfsFeed {
            agency: CsvTable::from_rows(vec![Agency::default(), Agency::default()]),
            routes: CsvTable::from_rows(vec![route("R1", Some("1"), None)]),
            ..Default::default()
        };

        let result = RoutesCheck.run(&feed);
        assert_eq!(problems(&result), vec![CODE_ROUTE_AGENCY_ID_REQUIRED]);
    }

    #[test]
    fn flags_routes_without_trips() {
        let feed = GtfsFeed {
            routes: CsvTable::from_rows(vec![
                route("R1", Some("1"), None),
                route("R2", Some("2"), None),
            ]),
            trips: CsvTable::from_rows(vec![Trip {
                route_id: "R2".to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        };

        let result = UnusedRouteCheck.run(&feed);
        assert_eq!(result.size(), 1);
        assert_eq!(result.findings()[0].affected_entity_id(), Some("R1"));
    }

    #[test]
    fn long_name_prefix_needs_a_separator() {
        assert!(long_name_repeats_short("10", "10"));
        assert!(long_name_repeats_short("10", "10 Downtown"));
        assert!(!long_name_repeats_short("10", "100 Crosstown"));
        assert!(!long_name_repeats_short("Métro", "M"));
    }
}
