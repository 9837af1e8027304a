use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

#[derive(Debug, thiserror::Error)]
pub enum GtfsParseError {
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    #[error("invalid date value: {0}")]
    InvalidDateValue(String),
    #[error("invalid time format: {0}")]
    InvalidTimeFormat(String),
    #[error("invalid time value: {0}")]
    InvalidTimeValue(String),
}

/// A service date as written in GTFS files (`YYYYMMDD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GtfsDate(NaiveDate);

impl GtfsDate {
    pub fn parse(value: &str) -> Result<Self, GtfsParseError> {
        let trimmed = value.trim();
        if trimmed.len() != 8 || !trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(GtfsParseError::InvalidDateFormat(value.to_string()));
        }

        let year: i32 = trimmed[0..4]
            .parse()
            .map_err(|_| GtfsParseError::InvalidDateFormat(value.to_string()))?;
        let month: u32 = trimmed[4..6]
            .parse()
            .map_err(|_| GtfsParseError::InvalidDateFormat(value.to_string()))?;
        let day: u32 = trimmed[6..8]
            .parse()
            .map_err(|_| GtfsParseError::InvalidDateFormat(value.to_string()))?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| GtfsParseError::InvalidDateValue(value.to_string()))
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

}

impl From<NaiveDate> for GtfsDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for GtfsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

impl<'de> Deserialize<'de> for GtfsDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GtfsDateVisitor;

        impl<'de> Visitor<'de> for GtfsDateVisitor {
            type Value = GtfsDate;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a GTFS date in YYYYMMDD format")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<GtfsDate, E> {
                GtfsDate::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(GtfsDateVisitor)
    }
}

/// Time of day in seconds; may exceed 24:00:00 for service running past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GtfsTime {
    total_seconds: i32,
}

impl GtfsTime {
    pub fn parse(value: &str) -> Result<Self, GtfsParseError> {
        let trimmed = value.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() != 3 {
            return Err(GtfsParseError::InvalidTimeFormat(value.to_string()));
        }

        let hours: i32 = parts[0]
            .parse()
            .map_err(|_| GtfsParseError::InvalidTimeFormat(value.to_string()))?;
        let minutes: i32 = parts[1]
            .parse()
            .map_err(|_| GtfsParseError::InvalidTimeFormat(value.to_string()))?;
        let seconds: i32 = parts[2]
            .parse()
            .map_err(|_| GtfsParseError::InvalidTimeFormat(value.to_string()))?;

        if hours < 0 || !(0..=59).contains(&minutes) || !(0..=59).contains(&seconds) {
            return Err(GtfsParseError::InvalidTimeValue(value.to_string()));
        }

        let total_seconds = hours
            .checked_mul(3600)
            .and_then(|total| total.checked_add(minutes * 60 + seconds))
            .ok_or_else(|| GtfsParseError::InvalidTimeValue(value.to_string()))?;
        Ok(Self { total_seconds })
    }

    pub fn total_seconds(&self) -> i32 {
        self.total_seconds
    }

    pub fn hours(&self) -> i32 {
        self.total_seconds / 3600
    }

    pub fn minutes(&self) -> i32 {
        (self.total_seconds % 3600) / 60
    }

    pub fn seconds(&self) -> i32 {
        self.total_seconds % 60
    }
}

impl fmt::Display for GtfsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

impl<'de> Deserialize<'de> for GtfsTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GtfsTimeVisitor;

        impl<'de> Visitor<'de> for GtfsTimeVisitor {
            type Value = GtfsTime;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a GTFS time in HH:MM:SS format")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<GtfsTime, E> {
                GtfsTime::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(GtfsTimeVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum LocationType {
    #[serde(rename = "0")]
    StopOrPlatform,
    #[serde(rename = "1")]
    Station,
    #[serde(rename = "2")]
    EntranceOrExit,
    #[serde(rename = "3")]
    GenericNode,
    #[serde(rename = "4")]
    BoardingArea,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteType {
    Tram,
    Subway,
    Rail,
    Bus,
    Ferry,
    CableCar,
    Gondola,
    Funicular,
    Trolleybus,
    Monorail,
    Extended(u16),
    Unknown(i32),
}

impl RouteType {
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => RouteType::Tram,
            1 => RouteType::Subway,
            2 => RouteType::Rail,
            3 => RouteType::Bus,
            4 => RouteType::Ferry,
            5 => RouteType::CableCar,
            6 => RouteType::Gondola,
            7 => RouteType::Funicular,
            11 => RouteType::Trolleybus,
            12 => RouteType::Monorail,
            100..=1702 => RouteType::Extended(value as u16),
            _ => RouteType::Unknown(value),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            RouteType::Tram => 0,
            RouteType::Subway => 1,
            RouteType::Rail => 2,
            RouteType::Bus => 3,
            RouteType::Ferry => 4,
            RouteType::CableCar => 5,
            RouteType::Gondola => 6,
            RouteType::Funicular => 7,
            RouteType::Trolleybus => 11,
            RouteType::Monorail => 12,
            RouteType::Extended(value) => value as i32,
            RouteType::Unknown(value) => value,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, RouteType::Unknown(_))
    }
}

impl<'de> Deserialize<'de> for RouteType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RouteTypeVisitor;

        impl<'de> Visitor<'de> for RouteTypeVisitor {
            type Value = RouteType;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a GTFS route_type numeric value")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<RouteType, E> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(E::custom("empty route_type"));
                }
                let parsed: i32 = trimmed.parse().map_err(|_| {
                    E::custom(format_args!("route_type `{}` is not a number", trimmed))
                })?;
                Ok(RouteType::from_i32(parsed))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<RouteType, E> {
                Ok(RouteType::from_i32(value as i32))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<RouteType, E> {
                Ok(RouteType::from_i32(value as i32))
            }
        }

        deserializer.deserialize_any(RouteTypeVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
pub enum ServiceAvailability {
    #[default]
    #[serde(rename = "0")]
    Unavailable,
    #[serde(rename = "1")]
    Available,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
pub enum ExceptionType {
    #[serde(rename = "1")]
    Added,
    #[serde(rename = "2")]
    Removed,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Agency {
    pub agency_id: Option<String>,
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
    pub agency_lang: Option<String>,
    pub agency_phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Stop {
    pub stop_id: String,
    pub stop_code: Option<String>,
    pub stop_name: Option<String>,
    pub stop_desc: Option<String>,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
    pub zone_id: Option<String>,
    pub location_type: Option<LocationType>,
    pub parent_station: Option<String>,
}

impl Stop {
    /// `(lat, lon)` when both coordinates are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.stop_lat, self.stop_lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Stops and platforms are the only locations a vehicle actually serves.
    pub fn is_stop_or_platform(&self) -> bool {
        matches!(
            self.location_type,
            None | Some(LocationType::StopOrPlatform)
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub route_id: String,
    pub agency_id: Option<String>,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    pub route_desc: Option<String>,
    pub route_type: RouteType,
    pub route_url: Option<String>,
}

impl Default for Route {
    fn default() -> Self {
        Self {
            route_id: String::new(),
            agency_id: None,
            route_short_name: None,
            route_long_name: None,
            route_desc: None,
            route_type: RouteType::Bus,
            route_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Trip {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
    pub trip_headsign: Option<String>,
    pub trip_short_name: Option<String>,
    pub block_id: Option<String>,
    pub shape_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StopTime {
    pub trip_id: String,
    pub arrival_time: Option<GtfsTime>,
    pub departure_time: Option<GtfsTime>,
    pub stop_id: String,
    pub stop_sequence: u32,
    pub stop_headsign: Option<String>,
    pub shape_dist_traveled: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Calendar {
    pub service_id: String,
    pub monday: ServiceAvailability,
    pub tuesday: ServiceAvailability,
    pub wednesday: ServiceAvailability,
    pub thursday: ServiceAvailability,
    pub friday: ServiceAvailability,
    pub saturday: ServiceAvailability,
    pub sunday: ServiceAvailability,
    pub start_date: GtfsDate,
    pub end_date: GtfsDate,
}

impl Calendar {
    pub fn runs_on(&self, weekday: Weekday) -> bool {
        let availability = match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        };
        availability == ServiceAvailability::Available
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CalendarDate {
    pub service_id: String,
    pub date: GtfsDate,
    pub exception_type: ExceptionType,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Shape {
    pub shape_id: String,
    pub shape_pt_lat: f64,
    pub shape_pt_lon: f64,
    pub shape_pt_sequence: u32,
    pub shape_dist_traveled: Option<f64>,
}
