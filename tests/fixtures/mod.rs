//! Test fixtures for route-map-projector.
//!
//! Provides the Istanbul demo schedule set: two fixed routes and one area
//! route, with live position samples on two of them.

pub mod istanbul_schedules;

pub use istanbul_schedules::*;
