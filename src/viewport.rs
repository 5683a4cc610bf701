//! Viewport framing.
//!
//! Picks a map region that shows the geometry of the focused schedules. The
//! heuristic depends on how the schedules were focused: a single explicitly
//! selected schedule is framed tightly around its route or circle, anything
//! else is framed by an expanded bounding box of every known coordinate.

use serde::{Deserialize, Serialize};

use crate::schedule::{Coordinate, RouteType, Schedule};

/// Latitude/longitude extent of a region in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Span {
    pub const fn new(latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude_delta,
            longitude_delta,
        }
    }
}

/// Visible map region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinate,
    pub span: Span,
}

impl Region {
    pub const fn new(center: Coordinate, span: Span) -> Self {
        Self { center, span }
    }
}

/// Bounding-box expansion: `span = max((max - min) * factor, min_span)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Framing {
    pub factor: f64,
    pub min_span: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Shown when there is nothing to frame.
    pub default_region: Region,
    /// Padding multiplier around a single fixed route.
    pub route_padding: f64,
    pub route_min_span: f64,
    /// Padding multiplier around a single area circle's diameter.
    pub area_padding: f64,
    pub meters_per_degree: f64,
    /// Bounding-box framing for an explicit multi-schedule selection.
    pub selected: Framing,
    /// Bounding-box framing when nothing is selected.
    pub overview: Framing,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            // Istanbul city center.
            default_region: Region::new(Coordinate::new(41.0251, 28.9934), Span::new(0.05, 0.05)),
            route_padding: 1.5,
            route_min_span: 0.01,
            area_padding: 2.2,
            meters_per_degree: 111_000.0,
            selected: Framing {
                factor: 1.3,
                min_span: 0.015,
            },
            overview: Framing {
                factor: 1.2,
                min_span: 0.02,
            },
        }
    }
}

/// How the active schedules came to be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Exactly one schedule was explicitly selected.
    Single,
    /// Several schedules were explicitly selected.
    Selected,
    /// No selection; every supplied schedule is active.
    Overview,
}

/// Computes the region framing `active` under `focus`.
///
/// Pure: identical input always yields the identical region.
pub fn compute_viewport(
    active: &[&Schedule],
    focus: Focus,
    config: &ViewportConfig,
    default_radius_meters: f64,
) -> Region {
    if active.is_empty() {
        return config.default_region;
    }

    let framing = match focus {
        Focus::Single => {
            if let [schedule] = active {
                if let Some(region) = focus_single(schedule, config, default_radius_meters) {
                    return region;
                }
            }
            config.selected
        }
        Focus::Selected => config.selected,
        Focus::Overview => config.overview,
    };

    bounding_region(&gather_coordinates(active), framing)
        .unwrap_or(config.default_region)
}

/// Every coordinate belonging to the schedules: fixed-route endpoints, area
/// centers and valid sample positions.
pub fn gather_coordinates(schedules: &[&Schedule]) -> Vec<Coordinate> {
    let mut coordinates = Vec::new();

    for schedule in schedules {
        match schedule.route_type {
            RouteType::FixedRoute => {
                coordinates.extend(schedule.start.filter(Coordinate::is_valid));
                coordinates.extend(schedule.end.filter(Coordinate::is_valid));
            }
            RouteType::AreaRoute => {
                coordinates.extend(schedule.center.filter(Coordinate::is_valid));
            }
            RouteType::Unknown => {}
        }
        coordinates.extend(schedule.sample_coordinates());
    }

    coordinates
}

fn focus_single(
    schedule: &Schedule,
    config: &ViewportConfig,
    default_radius_meters: f64,
) -> Option<Region> {
    if let Some((start, end)) = schedule.fixed_endpoints() {
        let lat_delta = (end.latitude - start.latitude).abs() * config.route_padding;
        let lng_delta = (end.longitude - start.longitude).abs() * config.route_padding;
        return Some(Region::new(
            start.midpoint(&end),
            Span::new(
                lat_delta.max(config.route_min_span),
                lng_delta.max(config.route_min_span),
            ),
        ));
    }

    let center = schedule.area_center()?;
    let radius = schedule.radius_or(default_radius_meters);
    let lat_delta = radius / config.meters_per_degree * config.area_padding;
    let lng_delta = radius / (config.meters_per_degree * center.latitude.to_radians().cos())
        * config.area_padding;

    Some(Region::new(center, Span::new(lat_delta, lng_delta)))
}

fn bounding_region(coordinates: &[Coordinate], framing: Framing) -> Option<Region> {
    let first = coordinates.first()?;
    let (mut min_lat, mut max_lat) = (first.latitude, first.latitude);
    let (mut min_lng, mut max_lng) = (first.longitude, first.longitude);

    for coordinate in &coordinates[1..] {
        min_lat = min_lat.min(coordinate.latitude);
        max_lat = max_lat.max(coordinate.latitude);
        min_lng = min_lng.min(coordinate.longitude);
        max_lng = max_lng.max(coordinate.longitude);
    }

    let center = Coordinate::new((min_lat + max_lat) / 2.0, (min_lng + max_lng) / 2.0);
    let span = Span::new(
        ((max_lat - min_lat) * framing.factor).max(framing.min_span),
        ((max_lng - min_lng) * framing.factor).max(framing.min_span),
    );

    Some(Region::new(center, span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::PositionSample;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < EPS, "{} != {}", actual, expected);
    }

    fn config() -> ViewportConfig {
        ViewportConfig::default()
    }

    #[test]
    fn test_empty_is_default() {
        let region = compute_viewport(&[], Focus::Overview, &config(), 1000.0);
        assert_eq!(region, config().default_region);
    }

    #[test]
    fn test_single_fixed_route() {
        let schedule = Schedule::fixed_route(1, (41.0082, 28.9784), (41.0369, 28.9850));
        let region = compute_viewport(&[&schedule], Focus::Single, &config(), 1000.0);

        assert_close(region.center.latitude, 41.02255);
        assert_close(region.center.longitude, 28.9817);
        assert_close(region.span.latitude_delta, (41.0369 - 41.0082) * 1.5);
        // 0.0066 * 1.5 is below the floor.
        assert_close(region.span.longitude_delta, 0.01);
    }

    #[test]
    fn test_single_area_route_fits_circle() {
        let schedule = Schedule::area_route(2, (41.0438, 29.0083), 1500.0);
        let region = compute_viewport(&[&schedule], Focus::Single, &config(), 1000.0);

        assert_eq!(region.center, Coordinate::new(41.0438, 29.0083));
        assert_close(region.span.latitude_delta, 1500.0 / 111_000.0 * 2.2);
        let expected_lng = 1500.0 / (111_000.0 * 41.0438_f64.to_radians().cos()) * 2.2;
        assert_close(region.span.longitude_delta, expected_lng);
        assert!(region.span.longitude_delta > region.span.latitude_delta);
    }

    #[test]
    fn test_single_area_route_default_radius() {
        let mut schedule = Schedule::area_route(2, (41.0438, 29.0083), 0.0);
        schedule.radius_meters = None;
        let region = compute_viewport(&[&schedule], Focus::Single, &config(), 1000.0);
        assert_close(region.span.latitude_delta, 1000.0 / 111_000.0 * 2.2);
    }

    #[test]
    fn test_single_without_geometry_uses_samples() {
        let schedule = Schedule::new(5).with_samples(vec![
            PositionSample::new(41.00, 29.00, 1),
            PositionSample::new(41.10, 29.20, 2),
        ]);
        let region = compute_viewport(&[&schedule], Focus::Single, &config(), 1000.0);

        assert_close(region.center.latitude, 41.05);
        assert_close(region.center.longitude, 29.10);
        assert_close(region.span.latitude_delta, 0.10 * 1.3);
        assert_close(region.span.longitude_delta, 0.20 * 1.3);
    }

    #[test]
    fn test_single_without_any_coordinates_is_default() {
        let schedule = Schedule::new(5);
        let region = compute_viewport(&[&schedule], Focus::Single, &config(), 1000.0);
        assert_eq!(region, config().default_region);
    }

    #[test]
    fn test_overview_bounding_box() {
        let fixed = Schedule::fixed_route(1, (41.0082, 28.9784), (41.0369, 28.9850));
        let area = Schedule::area_route(2, (41.0438, 29.0083), 1500.0);
        let region = compute_viewport(&[&fixed, &area], Focus::Overview, &config(), 1000.0);

        assert_close(region.center.latitude, (41.0082 + 41.0438) / 2.0);
        assert_close(region.center.longitude, (28.9784 + 29.0083) / 2.0);
        assert_close(region.span.latitude_delta, (41.0438 - 41.0082) * 1.2);
        assert_close(region.span.longitude_delta, (29.0083 - 28.9784) * 1.2);
    }

    #[test]
    fn test_selected_uses_tighter_framing() {
        let a = Schedule::area_route(1, (41.000, 29.000), 500.0);
        let b = Schedule::area_route(2, (41.005, 29.005), 500.0);

        let selected = compute_viewport(&[&a, &b], Focus::Selected, &config(), 1000.0);
        let overview = compute_viewport(&[&a, &b], Focus::Overview, &config(), 1000.0);

        assert_close(selected.span.latitude_delta, 0.015);
        assert_close(overview.span.latitude_delta, 0.02);
        assert_eq!(selected.center, overview.center);
    }

    #[test]
    fn test_gather_respects_route_type() {
        let mut schedule = Schedule::area_route(1, (41.0, 29.0), 500.0);
        // Stray endpoints on an area route are not part of its geometry.
        schedule.start = Some(Coordinate::new(50.0, 10.0));
        let coords = gather_coordinates(&[&schedule]);
        assert_eq!(coords, vec![Coordinate::new(41.0, 29.0)]);
    }

    #[test]
    fn test_deterministic() {
        let fixed = Schedule::fixed_route(1, (41.0082, 28.9784), (41.0369, 28.9850));
        let area = Schedule::area_route(2, (41.0438, 29.0083), 1500.0);
        let first = compute_viewport(&[&fixed, &area], Focus::Selected, &config(), 1000.0);
        let second = compute_viewport(&[&fixed, &area], Focus::Selected, &config(), 1000.0);
        assert_eq!(first, second);
    }
}
