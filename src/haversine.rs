//! Haversine distance and the straight-line directions fallback.
//!
//! The fallback ignores streets entirely: it connects the two endpoints with
//! a single segment. Useful offline or when no routing service is configured.

use tracing::debug;

use crate::error::DirectionsError;
use crate::polyline::Polyline;
use crate::schedule::Coordinate;
use crate::traits::WalkingDirectionsProvider;

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Longest distance the fallback will still call walkable.
const DEFAULT_MAX_WALK_M: f64 = 20_000.0;

/// Great-circle distance between two points in meters.
pub fn haversine_meters(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Directions provider that returns the straight segment between endpoints.
#[derive(Debug, Clone)]
pub struct StraightLineDirections {
    /// Endpoints further apart than this yield "no route".
    pub max_walk_meters: f64,
}

impl Default for StraightLineDirections {
    fn default() -> Self {
        Self {
            max_walk_meters: DEFAULT_MAX_WALK_M,
        }
    }
}

impl StraightLineDirections {
    /// Creates a fallback provider that gives up beyond `max_walk_meters`.
    pub fn new(max_walk_meters: f64) -> Self {
        Self { max_walk_meters }
    }
}

impl WalkingDirectionsProvider for StraightLineDirections {
    fn walking_path(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Option<Polyline>, DirectionsError> {
        let meters = haversine_meters(from, to);
        if meters > self.max_walk_meters {
            debug!(meters, limit = self.max_walk_meters, "endpoints too far apart to walk");
            return Ok(None);
        }
        Ok(Some(Polyline::new(vec![from, to])))
    }
}
