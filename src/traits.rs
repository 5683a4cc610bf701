//! Collaborator seams.
//!
//! The projector only needs two things from the outside world: walking
//! directions between two points, and the schedule list itself. Hosts
//! implement these for their own services.

use crate::error::{DirectionsError, ScheduleSourceError};
use crate::polyline::Polyline;
use crate::schedule::{Coordinate, Schedule};

/// Resolves a walking path between two points.
///
/// Calls may block; the projector runs them off the caller's thread.
/// `Ok(None)` means the service found no walkable route.
pub trait WalkingDirectionsProvider {
    fn walking_path(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Option<Polyline>, DirectionsError>;
}

/// Supplies the full schedule set for one projection context.
pub trait ScheduleSource {
    fn fetch_schedules(&self) -> Result<Vec<Schedule>, ScheduleSourceError>;
}

impl ScheduleSource for Vec<Schedule> {
    fn fetch_schedules(&self) -> Result<Vec<Schedule>, ScheduleSourceError> {
        Ok(self.clone())
    }
}
