//! Core types for survey axes and control points

use crate::error::{Result, SurveyError};
use crate::utils::{floor_div, floor_mod};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A logical axis of the survey grid: inline or crossline numbers running
/// from `start` to `end` inclusive, stepping by `step`.
///
/// Ranges may run in either direction; `step` must be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: i32,
    pub end: i32,
    pub step: i32,
}

impl LineRange {
    pub fn new(start: i32, end: i32, step: i32) -> Result<Self> {
        if step == 0 {
            return Err(SurveyError::Configuration(format!(
                "line range [{}, {}] has zero step",
                start, end
            )));
        }
        Ok(Self { start, end, step })
    }

    /// Number of lines defined on this axis
    pub fn count(&self) -> usize {
        let n = floor_div((self.end - self.start) as f64, self.step as f64) + 1.0;
        if n < 0.0 {
            0
        } else {
            n as usize
        }
    }

    /// Smallest line number in the range
    pub fn min(&self) -> i32 {
        self.start.min(self.end)
    }

    /// Largest line number in the range
    pub fn max(&self) -> i32 {
        self.start.max(self.end)
    }

    /// Whether `value` is a defined line: within bounds and on the grid
    pub fn contains(&self, value: i32) -> bool {
        value >= self.min() && value <= self.max() && (value - self.start) % self.step == 0
    }

    /// Zero-based position of a defined line along the axis
    pub fn position(&self, value: i32) -> Result<usize> {
        if !self.contains(value) {
            return Err(SurveyError::OutOfRange(format!(
                "line {} is not defined on axis [{}, {}, {}]",
                value, self.start, self.end, self.step
            )));
        }
        Ok(((value - self.start) / self.step) as usize)
    }

    /// Lazy iterator over line numbers, `start` to `end` inclusive
    pub fn values(&self) -> impl Iterator<Item = i32> {
        let (start, step) = (self.start, self.step);
        (0..self.count() as i32).map(move |i| start + i * step)
    }

    /// Snap a real-valued line coordinate to the nearest defined line.
    ///
    /// Rounds half up: a coordinate exactly midway between two lines snaps
    /// to the larger line number. Implemented with floor-division and modulo
    /// so the tie-break agrees with the original survey tooling.
    pub fn nearest_line(&self, raw: f64) -> i32 {
        let step = self.step as f64;
        let offset = raw - self.start as f64;
        let n = floor_div(offset, step);
        let plus_one = floor_div(floor_mod(offset, step), step / 2.0);
        self.start + self.step * (n + plus_one) as i32
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{}]", self.start, self.end, self.step)
    }
}

/// The vertical axis of the volume, in depth or two-way time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
    /// Vertical unit label carried from the survey file, e.g. "T" or "m"
    pub unit: Option<String>,
}

impl DepthRange {
    pub fn new(start: f64, end: f64, step: f64, unit: Option<String>) -> Result<Self> {
        if step == 0.0 {
            return Err(SurveyError::Configuration(format!(
                "depth range [{}, {}] has zero step",
                start, end
            )));
        }
        Ok(Self {
            start,
            end,
            step,
            unit,
        })
    }

    /// Number of samples along the vertical axis
    pub fn count(&self) -> usize {
        let n = floor_div(self.end - self.start, self.step) + 1.0;
        if n < 0.0 {
            0
        } else {
            n as usize
        }
    }

    /// Whether `depth` lies within the vertical extent
    pub fn contains(&self, depth: f64) -> bool {
        let (lo, hi) = (self.start.min(self.end), self.start.max(self.end));
        depth >= lo && depth <= hi
    }

    /// Physical sample index for a depth value within the range
    pub fn sample_index(&self, depth: f64) -> Result<usize> {
        if !self.contains(depth) {
            return Err(SurveyError::OutOfRange(format!(
                "depth {} outside vertical range [{}, {}]",
                depth, self.start, self.end
            )));
        }
        Ok(floor_div(depth - self.start, self.step) as usize)
    }

    /// Lazy iterator over depth values, `start` to `end` inclusive
    pub fn values(&self) -> impl Iterator<Item = f64> {
        let (start, step) = (self.start, self.step);
        (0..self.count()).map(move |i| start + i as f64 * step)
    }
}

/// A calibration point tying a logical grid location to physical
/// easting/northing coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub inline: i32,
    pub crline: i32,
    pub east: f64,
    pub north: f64,
}

impl ControlPoint {
    pub fn new(inline: i32, crline: i32, east: f64, north: f64) -> Self {
        Self {
            inline,
            crline,
            east,
            north,
        }
    }
}
