//! Istanbul demo schedules.
//!
//! Real neighbourhood coordinates, matching the data set field workers see
//! when the backend has no classified routes yet.

#![allow(dead_code)]

use route_map_projector::schedule::{Coordinate, PositionSample, Schedule};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

pub const SULTANAHMET: Location = Location::new("Sultanahmet", 41.0082, 28.9784);
pub const TAKSIM: Location = Location::new("Taksim", 41.0369, 28.9850);
pub const BESIKTAS: Location = Location::new("Besiktas", 41.0438, 29.0083);
pub const KADIKOY: Location = Location::new("Kadikoy", 40.9909, 29.0303);
pub const USKUDAR: Location = Location::new("Uskudar", 41.0235, 29.0122);

/// 2024-01-16 09:00 UTC.
const JAN_16: i64 = 1_705_395_600;
/// 2024-01-17 08:00 UTC.
const JAN_17: i64 = 1_705_478_400;

/// Fixed route from Sultanahmet to Taksim, no samples.
pub fn old_city_route() -> Schedule {
    Schedule::fixed_route(1, SULTANAHMET.coordinate(), TAKSIM.coordinate())
        .with_title("Sultanahmet - Taksim")
}

/// 1.5 km area around Besiktas with three samples.
pub fn besiktas_area() -> Schedule {
    Schedule::area_route(2, BESIKTAS.coordinate(), 1500.0)
        .with_title("Besiktas")
        .with_samples(vec![
            PositionSample::new(41.0422, 29.0083, JAN_16),
            PositionSample::new(41.0400, 29.0100, JAN_16 + 7_200),
            PositionSample::new(41.0390, 29.0060, JAN_16 + 10_800),
        ])
}

/// Fixed route from Kadikoy to Uskudar with three samples.
pub fn asian_side_route() -> Schedule {
    Schedule::fixed_route(3, KADIKOY.coordinate(), USKUDAR.coordinate())
        .with_title("Kadikoy - Uskudar")
        .with_samples(vec![
            PositionSample::new(40.9909, 29.0303, JAN_17),
            PositionSample::new(41.0072, 29.0212, JAN_17 + 7_200),
            PositionSample::new(41.0235, 29.0122, JAN_17 + 14_400),
        ])
}

pub fn demo_schedules() -> Vec<Schedule> {
    vec![old_city_route(), besiktas_area(), asian_side_route()]
}
