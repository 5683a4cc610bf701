//! Polyline representation for route geometries.
//!
//! Paths are kept as decoded coordinate sequences. The compact encoded form
//! only appears at the directions-service boundary and is decoded there.

use serde::{Deserialize, Serialize};

use crate::error::PolylineError;
use crate::haversine::haversine_meters;
use crate::schedule::Coordinate;

/// An ordered coordinate sequence: a session trail or a walking path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the polyline has no points at all.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of great-circle segment lengths.
    pub fn length_meters(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| haversine_meters(pair[0], pair[1]))
            .sum()
    }

    /// Decodes an encoded polyline string with `precision` decimal digits
    /// (5 for OSRM's `geometries=polyline`, 6 for `polyline6`).
    ///
    /// Fails on truncated input, bytes outside the encoding alphabet, and
    /// coordinate sums that overflow.
    pub fn decode(encoded: &str, precision: u32) -> Result<Self, PolylineError> {
        let factor = 10_f64.powi(precision as i32);
        let bytes = encoded.as_bytes();
        let mut offset = 0;
        let mut lat: i64 = 0;
        let mut lng: i64 = 0;
        let mut points = Vec::new();

        while offset < bytes.len() {
            lat = accumulate(lat, bytes, &mut offset)?;
            lng = accumulate(lng, bytes, &mut offset)?;
            points.push(Coordinate::new(lat as f64 / factor, lng as f64 / factor));
        }

        Ok(Self { points })
    }
}

impl From<Vec<Coordinate>> for Polyline {
    fn from(points: Vec<Coordinate>) -> Self {
        Self::new(points)
    }
}

/// Adds the next delta to `total`, rejecting sums that leave `i64`.
fn accumulate(total: i64, bytes: &[u8], offset: &mut usize) -> Result<i64, PolylineError> {
    let start = *offset;
    let delta = decode_value(bytes, offset)?;
    total
        .checked_add(delta)
        .ok_or(PolylineError::Overflow { offset: start })
}

fn decode_value(bytes: &[u8], offset: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let Some(&byte) = bytes.get(*offset) else {
            return Err(PolylineError::Truncated { offset: *offset });
        };
        if !(63..=126).contains(&byte) || shift > 60 {
            return Err(PolylineError::InvalidByte {
                offset: *offset,
                byte,
            });
        }
        *offset += 1;

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    // Zig-zag: low bit carries the sign.
    if result & 1 == 1 {
        Ok(!(result >> 1))
    } else {
        Ok(result >> 1)
    }
}
