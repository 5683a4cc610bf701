//! route-map-projector core
//!
//! Turns advertising route schedules into map annotations, shapes and a
//! framing viewport, independent of any map toolkit.

pub mod error;
pub mod schedule;
pub mod traits;
pub mod selection;
pub mod viewport;
pub mod projector;
pub mod osrm;
pub mod osrm_data;
pub mod haversine;
pub mod polyline;
