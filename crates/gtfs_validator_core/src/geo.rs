//! Small spherical-earth helpers for the distance based checks.

pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A `(lat, lon)` pair in degrees.
pub type LatLon = (f64, f64);

pub fn haversine_meters(a: LatLon, b: LatLon) -> f64 {
    let (lat1, lon1) = a;
    let (lat2, lon2) = b;
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Distance from `point` to the segment `start`-`end`.
///
/// Projects onto a local equirectangular plane centred on `point`, which is
/// accurate for the short segments found in shapes.
pub fn point_to_segment_meters(point: LatLon, start: LatLon, end: LatLon) -> f64 {
    let scale_x = point.0.to_radians().cos();
    let to_plane = |p: LatLon| {
        (
            (p.1 - point.1).to_radians() * scale_x * EARTH_RADIUS_METERS,
            (p.0 - point.0).to_radians() * EARTH_RADIUS_METERS,
        )
    };
    let (ax, ay) = to_plane(start);
    let (bx, by) = to_plane(end);
    let (dx, dy) = (bx - ax, by - ay);
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return (ax * ax + ay * ay).sqrt();
    }

    let t = (-(ax * dx + ay * dy) / length_sq).clamp(0.0, 1.0);
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    (cx * cx + cy * cy).sqrt()
}

/// Shortest distance from `point` to a polyline; `None` for an empty line.
pub fn point_to_polyline_meters(point: LatLon, line: &[LatLon]) -> Option<f64> {
    match line {
        [] => None,
        [only] => Some(haversine_meters(point, *only)),
        _ => line
            .windows(2)
            .map(|pair| point_to_segment_meters(point, pair[0], pair[1]))
            .reduce(f64::min),
    }
}
