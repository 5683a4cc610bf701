//! Route map projection.
//!
//! A projection pass turns the active schedules into annotations, area
//! circles and session trails synchronously, frames a viewport, and queues a
//! walking-directions lookup for every fixed route. Lookups run on a small
//! rayon pool owned by the projector and report back over a channel; each
//! pass carries a generation so reports from a superseded pass are dropped
//! instead of leaking into the newer result.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::ScheduleSourceError;
use crate::polyline::Polyline;
use crate::schedule::{Coordinate, RouteType, Schedule, ScheduleId};
use crate::selection::SelectionState;
use crate::traits::{ScheduleSource, WalkingDirectionsProvider};
use crate::viewport::{compute_viewport, Focus, Region, ViewportConfig};

/// Monotonically increasing tag of one projection pass.
pub type Generation = u64;

/// Radius used for area routes without a usable one.
const DEFAULT_RADIUS_M: f64 = 1000.0;

/// Concurrent walking-directions lookups.
const DEFAULT_LOOKUP_THREADS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    pub default_radius_meters: f64,
    /// Emit a small waypoint marker for every valid position sample.
    pub sample_markers: bool,
    /// Size of the pool running directions lookups. Lookups usually block on
    /// the network, so this is independent of the core count.
    pub lookup_threads: usize,
    pub viewport: ViewportConfig,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            default_radius_meters: DEFAULT_RADIUS_M,
            sample_markers: false,
            lookup_threads: DEFAULT_LOOKUP_THREADS,
            viewport: ViewportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationRole {
    Start,
    End,
    Waypoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeClass {
    Large,
    Small,
}

/// A map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub coordinate: Coordinate,
    pub role: AnnotationRole,
    pub schedule_id: ScheduleId,
    pub size: SizeClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaCircle {
    pub schedule_id: ScheduleId,
    pub center: Coordinate,
    pub radius_meters: f64,
}

/// A path owned by one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    pub schedule_id: ScheduleId,
    pub polyline: Polyline,
}

/// Output of one projection pass.
///
/// `direction_paths` starts empty and grows as lookups for this pass resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub generation: Generation,
    pub annotations: Vec<Annotation>,
    pub area_circles: Vec<AreaCircle>,
    pub session_trails: Vec<RoutePath>,
    pub direction_paths: Vec<RoutePath>,
    pub viewport: Region,
    /// Lookups of this pass that have not reported yet.
    pub pending_directions: usize,
}

impl ProjectionResult {
    pub fn is_settled(&self) -> bool {
        self.pending_directions == 0
    }

    /// Folds one lookup report into the result. Reports from another pass
    /// are ignored. Returns whether `direction_paths` grew.
    pub fn apply(&mut self, update: DirectionsUpdate) -> bool {
        if update.generation != self.generation {
            debug!(
                schedule_id = %update.schedule_id,
                generation = update.generation,
                current = self.generation,
                "discarding stale directions"
            );
            return false;
        }

        self.pending_directions = self.pending_directions.saturating_sub(1);
        match update.path {
            Some(polyline) => {
                self.direction_paths.push(RoutePath {
                    schedule_id: update.schedule_id,
                    polyline,
                });
                true
            }
            None => false,
        }
    }
}

/// Report of one finished walking-directions lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsUpdate {
    pub generation: Generation,
    pub schedule_id: ScheduleId,
    /// `None` when the lookup failed, found no route, or was skipped.
    pub path: Option<Polyline>,
}

type ChangeListener = Arc<dyn Fn(Generation, ScheduleId) + Send + Sync>;

/// Projects schedules onto map geometry.
///
/// Owns the generation counter and the channel lookups report on. Only the
/// result of the latest pass receives direction paths.
pub struct RouteMapProjector<D> {
    directions: Arc<D>,
    config: ProjectorConfig,
    lookups: ThreadPool,
    generation: Arc<AtomicU64>,
    updates_tx: Sender<DirectionsUpdate>,
    updates_rx: Receiver<DirectionsUpdate>,
    listener: Option<ChangeListener>,
}

impl<D> RouteMapProjector<D>
where
    D: WalkingDirectionsProvider + Send + Sync + 'static,
{
    /// Creates a projector with its own lookup pool of
    /// `config.lookup_threads` threads.
    pub fn new(directions: D, config: ProjectorConfig) -> Result<Self, ThreadPoolBuildError> {
        let lookups = ThreadPoolBuilder::new()
            .num_threads(config.lookup_threads.max(1))
            .thread_name(|index| format!("directions-{}", index))
            .panic_handler(|_| error!("directions lookup worker panicked"))
            .build()?;

        let (updates_tx, updates_rx) = mpsc::channel();
        Ok(Self {
            directions: Arc::new(directions),
            config,
            lookups,
            generation: Arc::new(AtomicU64::new(0)),
            updates_tx,
            updates_rx,
            listener: None,
        })
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Generation of the most recent pass (0 before the first one).
    pub fn generation(&self) -> Generation {
        self.generation.load(Ordering::SeqCst)
    }

    /// Called from a worker thread whenever a lookup of the current pass
    /// reports, so the host can schedule `apply_updates`.
    pub fn set_change_listener<F>(&mut self, listener: F)
    where
        F: Fn(Generation, ScheduleId) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
    }

    /// Runs one projection pass, superseding any earlier one.
    pub fn project(&mut self, schedules: &[Schedule], selection: &SelectionState) -> ProjectionResult {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let active: Vec<&Schedule> = if selection.is_empty() {
            schedules.iter().collect()
        } else {
            schedules
                .iter()
                .filter(|schedule| selection.contains(schedule.id))
                .collect()
        };

        let mut result = ProjectionResult {
            generation,
            annotations: Vec::new(),
            area_circles: Vec::new(),
            session_trails: Vec::new(),
            direction_paths: Vec::new(),
            viewport: self.config.viewport.default_region,
            pending_directions: 0,
        };

        for schedule in &active {
            self.project_schedule(schedule, generation, &mut result);
        }

        let focus = match (selection.is_empty(), active.len()) {
            (true, _) => Focus::Overview,
            (false, 1) => Focus::Single,
            (false, _) => Focus::Selected,
        };
        result.viewport = compute_viewport(
            &active,
            focus,
            &self.config.viewport,
            self.config.default_radius_meters,
        );

        info!(
            generation,
            active = active.len(),
            annotations = result.annotations.len(),
            circles = result.area_circles.len(),
            trails = result.session_trails.len(),
            lookups = result.pending_directions,
            "projected schedules"
        );

        result
    }

    /// Fetches a fresh schedule set from `source` and projects it.
    ///
    /// A fetch failure is returned as-is and no pass is started; the caller
    /// decides whether to project substitute data instead.
    pub fn refresh<S>(
        &mut self,
        source: &S,
        selection: &SelectionState,
    ) -> Result<ProjectionResult, ScheduleSourceError>
    where
        S: ScheduleSource + ?Sized,
    {
        let schedules = source.fetch_schedules().inspect_err(|err| {
            warn!(error = %err, "schedule fetch failed");
        })?;
        Ok(self.project(&schedules, selection))
    }

    /// Drains finished lookups into `result` without blocking.
    ///
    /// Does nothing if `result` belongs to a superseded pass. Returns whether
    /// any direction path was added.
    pub fn apply_updates(&self, result: &mut ProjectionResult) -> bool {
        if result.generation != self.generation() {
            return false;
        }

        let mut changed = false;
        while let Ok(update) = self.updates_rx.try_recv() {
            changed |= result.apply(update);
        }
        changed
    }

    /// Blocks until every lookup of `result`'s pass has reported or `timeout`
    /// elapses. Returns whether the result is settled.
    pub fn wait_for_directions(&self, result: &mut ProjectionResult, timeout: Duration) -> bool {
        if result.generation != self.generation() {
            return result.is_settled();
        }

        let deadline = Instant::now() + timeout;
        while !result.is_settled() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.updates_rx.recv_timeout(remaining) {
                Ok(update) => {
                    result.apply(update);
                }
                Err(RecvTimeoutError::Timeout) => break,
                // We hold a sender ourselves, so this cannot happen.
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        result.is_settled()
    }

    fn project_schedule(&self, schedule: &Schedule, generation: Generation, result: &mut ProjectionResult) {
        match schedule.route_type {
            RouteType::FixedRoute => match schedule.fixed_endpoints() {
                Some((start, end)) => {
                    result.annotations.push(Annotation {
                        coordinate: start,
                        role: AnnotationRole::Start,
                        schedule_id: schedule.id,
                        size: SizeClass::Large,
                    });
                    result.annotations.push(Annotation {
                        coordinate: end,
                        role: AnnotationRole::End,
                        schedule_id: schedule.id,
                        size: SizeClass::Large,
                    });
                    self.request_walking_path(schedule.id, start, end, generation);
                    result.pending_directions += 1;
                }
                None => debug!(schedule_id = %schedule.id, "fixed route without start and end, skipping"),
            },
            RouteType::AreaRoute => match schedule.area_center() {
                Some(center) => {
                    result.annotations.push(Annotation {
                        coordinate: center,
                        role: AnnotationRole::Waypoint,
                        schedule_id: schedule.id,
                        size: SizeClass::Large,
                    });
                    result.area_circles.push(AreaCircle {
                        schedule_id: schedule.id,
                        center,
                        radius_meters: schedule.radius_or(self.config.default_radius_meters),
                    });
                }
                None => debug!(schedule_id = %schedule.id, "area route without center, skipping"),
            },
            RouteType::Unknown => {
                debug!(schedule_id = %schedule.id, "unknown route type, no primary geometry");
            }
        }

        let trail: Vec<Coordinate> = schedule.sample_coordinates().collect();
        if self.config.sample_markers {
            result.annotations.extend(trail.iter().map(|coordinate| Annotation {
                coordinate: *coordinate,
                role: AnnotationRole::Waypoint,
                schedule_id: schedule.id,
                size: SizeClass::Small,
            }));
        }
        if trail.len() >= 2 {
            result.session_trails.push(RoutePath {
                schedule_id: schedule.id,
                polyline: Polyline::new(trail),
            });
        }
    }

    fn request_walking_path(
        &self,
        schedule_id: ScheduleId,
        from: Coordinate,
        to: Coordinate,
        generation: Generation,
    ) {
        let directions = Arc::clone(&self.directions);
        let current = Arc::clone(&self.generation);
        let updates = self.updates_tx.clone();
        let listener = self.listener.clone();

        self.lookups.spawn(move || {
            let path = if current.load(Ordering::SeqCst) != generation {
                debug!(%schedule_id, generation, "pass superseded before lookup");
                None
            } else {
                // The report must go out even if the provider panics.
                match panic::catch_unwind(AssertUnwindSafe(|| directions.walking_path(from, to))) {
                    Ok(Ok(Some(path))) => Some(path),
                    Ok(Ok(None)) => {
                        debug!(%schedule_id, "no walking route found");
                        None
                    }
                    Ok(Err(err)) => {
                        warn!(%schedule_id, error = %err, "walking directions failed");
                        None
                    }
                    Err(_) => {
                        warn!(%schedule_id, "walking directions provider panicked");
                        None
                    }
                }
            };

            let update = DirectionsUpdate {
                generation,
                schedule_id,
                path,
            };
            if updates.send(update).is_err() {
                // Projector dropped; nobody is listening.
                return;
            }

            if current.load(Ordering::SeqCst) == generation {
                if let Some(listener) = listener {
                    listener(generation, schedule_id);
                }
            }
        });
    }
}
