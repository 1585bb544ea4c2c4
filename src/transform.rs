//! Affine conversion between logical grid coordinates and physical
//! easting/northing, calibrated from three control points

use crate::error::{Result, SurveyError};
use crate::geometry::SurveyGeometry;
use crate::types::LineRange;
use crate::utils::round_decimals;
use std::f64::consts::PI;

/// Affine mapping between (inline, crline) and (east, north), plus the
/// derived survey properties: bin sizes, area, azimuth and axis handedness.
///
/// The mapping satisfies `x = alpha_x + beta_x * inline + gamma_x * crline`
/// and symmetrically for y. It is a pure function of the survey geometry:
/// deriving it twice from the same descriptor yields identical coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTransform {
    alpha_x: f64,
    beta_x: f64,
    gamma_x: f64,
    alpha_y: f64,
    beta_y: f64,
    gamma_y: f64,
    inline_bin: f64,
    crline_bin: f64,
    area: f64,
    azimuth: f64,
    inverted_axis: bool,
    inline_range: LineRange,
    crline_range: LineRange,
}

impl CoordinateTransform {
    /// Derive the transform from a survey geometry descriptor.
    ///
    /// Fails with `DegenerateGeometry` when the control points cannot
    /// calibrate a full-rank mapping: A and B on the same crossline, B and C
    /// on the same inline, or the three points collinear in physical space.
    pub fn derive(geometry: &SurveyGeometry) -> Result<Self> {
        let a = geometry.point_a;
        let b = geometry.point_b;
        let c = geometry.point_c;

        if b.crline == a.crline {
            return Err(SurveyError::DegenerateGeometry(format!(
                "control points A and B both lie on crossline {}",
                a.crline
            )));
        }
        if c.inline == b.inline {
            return Err(SurveyError::DegenerateGeometry(format!(
                "control points B and C both lie on inline {}",
                b.inline
            )));
        }

        let gamma_x = (b.east - a.east) / f64::from(b.crline - a.crline);
        let beta_x = (c.east - b.east) / f64::from(c.inline - b.inline);
        let alpha_x = a.east - beta_x * f64::from(a.inline) - gamma_x * f64::from(a.crline);
        let gamma_y = (b.north - a.north) / f64::from(b.crline - a.crline);
        let beta_y = (c.north - b.north) / f64::from(c.inline - b.inline);
        let alpha_y = a.north - beta_y * f64::from(a.inline) - gamma_y * f64::from(a.crline);

        let det = beta_x * gamma_y - gamma_x * beta_y;
        if det == 0.0 {
            return Err(SurveyError::DegenerateGeometry(
                "control points are collinear, transform matrix is singular".to_string(),
            ));
        }

        let (inline_bin, crline_bin, area) = Self::bin_size_and_area(geometry);
        let (azimuth, inverted_axis) = Self::azimuth_and_inverted_axis(geometry)?;

        Ok(Self {
            alpha_x,
            beta_x,
            gamma_x,
            alpha_y,
            beta_y,
            gamma_y,
            inline_bin,
            crline_bin,
            area,
            azimuth,
            inverted_axis,
            inline_range: geometry.inline_range,
            crline_range: geometry.crline_range,
        })
    }

    /// Bin sizes in meters per logical step, and survey area in square km
    fn bin_size_and_area(geometry: &SurveyGeometry) -> (f64, f64, f64) {
        let a = geometry.point_a;
        let b = geometry.point_b;
        let c = geometry.point_c;

        let dist_ab = (b.north - a.north).hypot(b.east - a.east);
        let dist_bc = (c.north - b.north).hypot(c.east - b.east);
        let crline_steps =
            f64::from(b.crline - a.crline) / f64::from(geometry.crline_range.step);
        let inline_steps =
            f64::from(c.inline - b.inline) / f64::from(geometry.inline_range.step);
        let crline_bin = round_decimals(dist_ab / crline_steps, 2);
        let inline_bin = round_decimals(dist_bc / inline_steps, 2);

        let area = round_decimals(
            inline_bin
                * crline_bin
                * geometry.n_inline() as f64
                * geometry.n_crline() as f64
                * 1e-6,
            2,
        );
        (inline_bin, crline_bin, area)
    }

    /// Compass bearing of the crossline axis (A→B) and whether the inline
    /// axis runs to the left on a north-up map.
    ///
    /// The eight-way branch over the (north, east) delta signs, including the
    /// axis-aligned cases, reproduces the original survey tooling exactly.
    fn azimuth_and_inverted_axis(geometry: &SurveyGeometry) -> Result<(f64, bool)> {
        let a = geometry.point_a;
        let b = geometry.point_b;
        let c = geometry.point_c;

        let ba_north = b.north - a.north;
        let ba_east = b.east - a.east;
        let cb_east = c.east - b.east;
        let cb_north = c.north - b.north;

        let (azimuth, inverted) = if ba_north > 0.0 && ba_east > 0.0 {
            // crossline axis in quadrant I
            ((ba_east / ba_north).atan(), cb_east <= 0.0)
        } else if ba_north < 0.0 && ba_east > 0.0 {
            // crossline axis in quadrant IV
            (-(ba_east / -ba_north).atan() + PI, cb_east > 0.0)
        } else if ba_north > 0.0 && ba_east < 0.0 {
            // crossline axis in quadrant II
            (-(-ba_east / ba_north).atan() + 2.0 * PI, cb_east <= 0.0)
        } else if ba_north < 0.0 && ba_east < 0.0 {
            // crossline axis in quadrant III
            ((ba_east / -ba_north).atan() + PI, cb_east > 0.0)
        } else if ba_north == 0.0 && ba_east > 0.0 {
            (0.5 * PI, cb_north > 0.0)
        } else if ba_north == 0.0 && ba_east < 0.0 {
            (1.5 * PI, cb_north < 0.0)
        } else if ba_north > 0.0 && ba_east == 0.0 {
            (0.0, cb_east < 0.0)
        } else if ba_north < 0.0 && ba_east == 0.0 {
            (PI, cb_east > 0.0)
        } else {
            return Err(SurveyError::DegenerateGeometry(
                "control points A and B coincide in physical space".to_string(),
            ));
        };

        Ok((azimuth / PI * 180.0, inverted))
    }

    /// Forward affine map: logical (inline, crline) to physical (x, y)
    pub fn line_to_coord(&self, inline: i32, crline: i32) -> (f64, f64) {
        let x = self.alpha_x + self.beta_x * f64::from(inline) + self.gamma_x * f64::from(crline);
        let y = self.alpha_y + self.beta_y * f64::from(inline) + self.gamma_y * f64::from(crline);
        (x, y)
    }

    /// Inverse map: physical (x, y) to the nearest defined (inline, crline).
    ///
    /// Solves the 2x2 linear system for real-valued line coordinates, then
    /// snaps each axis to the nearest grid line with the half-up tie-break.
    pub fn coord_to_line(&self, x: f64, y: f64) -> Result<(i32, i32)> {
        let (raw_inline, raw_crline) = self.invert(x, y)?;
        Ok((
            self.inline_range.nearest_line(raw_inline),
            self.crline_range.nearest_line(raw_crline),
        ))
    }

    fn invert(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let det = self.beta_x * self.gamma_y - self.gamma_x * self.beta_y;
        if det == 0.0 {
            return Err(SurveyError::DegenerateGeometry(
                "transform matrix is singular".to_string(),
            ));
        }
        let dx = x - self.alpha_x;
        let dy = y - self.alpha_y;
        let raw_inline = (self.gamma_y * dx - self.gamma_x * dy) / det;
        let raw_crline = (-self.beta_y * dx + self.beta_x * dy) / det;
        Ok((raw_inline, raw_crline))
    }

    /// The six affine coefficients
    /// `(alpha_x, beta_x, gamma_x, alpha_y, beta_y, gamma_y)`
    pub fn coefficients(&self) -> (f64, f64, f64, f64, f64, f64) {
        (
            self.alpha_x,
            self.beta_x,
            self.gamma_x,
            self.alpha_y,
            self.beta_y,
            self.gamma_y,
        )
    }

    /// Physical distance per inline step, rounded to 2 decimals
    pub fn inline_bin(&self) -> f64 {
        self.inline_bin
    }

    /// Physical distance per crossline step, rounded to 2 decimals
    pub fn crline_bin(&self) -> f64 {
        self.crline_bin
    }

    /// Surveyed area in square kilometers, rounded to 2 decimals
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Compass bearing of the crossline axis in degrees, 0-360
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    /// Whether the inline axis runs to the left relative to the crossline
    /// axis on a north-up map
    pub fn inverted_axis(&self) -> bool {
        self.inverted_axis
    }
}
