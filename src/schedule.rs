//! Schedule data model.
//!
//! A schedule is one assignment's advertising route for a day: either a
//! point-to-point fixed route or a circular area route, plus the position
//! samples recorded while the route was being worked.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a schedule, unique within one supplied set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(pub i64);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and inside the lat/lng ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn midpoint(&self, other: &Coordinate) -> Coordinate {
        Coordinate::new(
            (self.latitude + other.latitude) / 2.0,
            (self.longitude + other.longitude) / 2.0,
        )
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// Route classification as sent by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    FixedRoute,
    AreaRoute,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A live location reading. Either component may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Capture time (unix seconds).
    pub recorded_at: Option<i64>,
}

impl PositionSample {
    pub fn new(latitude: f64, longitude: f64, recorded_at: i64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            recorded_at: Some(recorded_at),
        }
    }

    /// A reading that carries no position.
    pub fn without_position(recorded_at: i64) -> Self {
        Self {
            latitude: None,
            longitude: None,
            recorded_at: Some(recorded_at),
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        let coordinate = Coordinate::new(self.latitude?, self.longitude?);
        coordinate.is_valid().then_some(coordinate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub route_type: RouteType,
    #[serde(default)]
    pub start: Option<Coordinate>,
    #[serde(default)]
    pub end: Option<Coordinate>,
    #[serde(default)]
    pub center: Option<Coordinate>,
    #[serde(default)]
    pub radius_meters: Option<f64>,
    #[serde(default)]
    pub samples: Vec<PositionSample>,
}

impl Schedule {
    /// A schedule with no classification and no geometry.
    pub fn new(id: i64) -> Self {
        Self {
            id: ScheduleId(id),
            title: None,
            route_type: RouteType::Unknown,
            start: None,
            end: None,
            center: None,
            radius_meters: None,
            samples: Vec::new(),
        }
    }

    pub fn fixed_route(id: i64, start: impl Into<Coordinate>, end: impl Into<Coordinate>) -> Self {
        Self {
            route_type: RouteType::FixedRoute,
            start: Some(start.into()),
            end: Some(end.into()),
            ..Self::new(id)
        }
    }

    pub fn area_route(id: i64, center: impl Into<Coordinate>, radius_meters: f64) -> Self {
        Self {
            route_type: RouteType::AreaRoute,
            center: Some(center.into()),
            radius_meters: Some(radius_meters),
            ..Self::new(id)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_samples(mut self, samples: Vec<PositionSample>) -> Self {
        self.samples = samples;
        self
    }

    /// Start and end of a fixed route, if both are present and valid.
    pub fn fixed_endpoints(&self) -> Option<(Coordinate, Coordinate)> {
        if self.route_type != RouteType::FixedRoute {
            return None;
        }
        let start = self.start.filter(Coordinate::is_valid)?;
        let end = self.end.filter(Coordinate::is_valid)?;
        Some((start, end))
    }

    /// Center of an area route, if present and valid.
    pub fn area_center(&self) -> Option<Coordinate> {
        if self.route_type != RouteType::AreaRoute {
            return None;
        }
        self.center.filter(Coordinate::is_valid)
    }

    /// Radius in meters, falling back to `default` when absent or non-positive.
    pub fn radius_or(&self, default: f64) -> f64 {
        match self.radius_meters {
            Some(radius) if radius.is_finite() && radius > 0.0 => radius,
            _ => default,
        }
    }

    /// Valid sample coordinates in recorded order.
    pub fn sample_coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.samples.iter().filter_map(PositionSample::coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(41.0, 29.0).is_valid());
        assert!(Coordinate::new(-90.0, 180.0).is_valid());
        assert!(!Coordinate::new(91.0, 29.0).is_valid());
        assert!(!Coordinate::new(41.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 29.0).is_valid());
    }

    #[test]
    fn test_fixed_endpoints_require_both() {
        let mut schedule = Schedule::fixed_route(1, (41.0, 28.9), (41.1, 29.0));
        assert!(schedule.fixed_endpoints().is_some());

        schedule.end = None;
        assert!(schedule.fixed_endpoints().is_none());
    }

    #[test]
    fn test_fixed_endpoints_ignore_other_types() {
        let mut schedule = Schedule::fixed_route(1, (41.0, 28.9), (41.1, 29.0));
        schedule.route_type = RouteType::Unknown;
        assert!(schedule.fixed_endpoints().is_none());
    }

    #[test]
    fn test_radius_defaults_when_non_positive() {
        let schedule = Schedule::area_route(2, (41.0, 29.0), 0.0);
        assert_eq!(schedule.radius_or(1000.0), 1000.0);

        let schedule = Schedule::area_route(2, (41.0, 29.0), -5.0);
        assert_eq!(schedule.radius_or(1000.0), 1000.0);

        let mut schedule = Schedule::area_route(2, (41.0, 29.0), 1500.0);
        assert_eq!(schedule.radius_or(1000.0), 1500.0);

        schedule.radius_meters = None;
        assert_eq!(schedule.radius_or(1000.0), 1000.0);
    }

    #[test]
    fn test_sample_coordinates_skip_missing() {
        let schedule = Schedule::new(3).with_samples(vec![
            PositionSample::new(41.0, 29.0, 1),
            PositionSample::without_position(2),
            PositionSample {
                latitude: Some(41.2),
                longitude: None,
                recorded_at: Some(3),
            },
            PositionSample::new(41.1, 29.1, 4),
        ]);

        let coords: Vec<_> = schedule.sample_coordinates().collect();
        assert_eq!(
            coords,
            vec![Coordinate::new(41.0, 29.0), Coordinate::new(41.1, 29.1)]
        );
    }

    #[test]
    fn test_midpoint() {
        let mid = Coordinate::new(41.0, 28.0).midpoint(&Coordinate::new(42.0, 30.0));
        assert_eq!(mid, Coordinate::new(41.5, 29.0));
    }

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(RouteType::default(), RouteType::Unknown);
        assert_eq!(Schedule::new(9).route_type, RouteType::Unknown);
    }
}
