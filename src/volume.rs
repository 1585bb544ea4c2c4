//! Seismic volume: survey geometry plus physical trace storage, addressed
//! by logical indexes

use crate::error::{Result, SurveyError};
use crate::geometry::SurveyGeometry;
use crate::index::VolumeIndex;
use crate::storage::TraceStore;
use crate::transform::CoordinateTransform;
use ndarray::{Array1, Array2, ArrayD};
use std::fmt;

/// A 3-D seismic volume: the survey geometry descriptor, the derived
/// coordinate transform, and a handle to physical trace storage.
///
/// Reads and the single mutation (`update` of one inline section) go through
/// logical indexes; every requested coordinate is validated against the
/// survey ranges and rejected when outside them, never clamped. Callers that
/// want tolerant addressing snap first with [`SeismicVolume::valid_cdp`].
pub struct SeismicVolume {
    geometry: SurveyGeometry,
    transform: CoordinateTransform,
    store: Box<dyn TraceStore>,
}

impl SeismicVolume {
    /// Compose a volume from a survey geometry and a trace store.
    ///
    /// The store's axis layout must agree with the descriptor's ranges.
    pub fn new(geometry: SurveyGeometry, store: Box<dyn TraceStore>) -> Result<Self> {
        let transform = CoordinateTransform::derive(&geometry)?;

        let layout = store.layout();
        let depth_matches = layout.depth.start == geometry.depth_range.start
            && layout.depth.end == geometry.depth_range.end
            && layout.depth.step == geometry.depth_range.step;
        if layout.inline != geometry.inline_range
            || layout.crline != geometry.crline_range
            || !depth_matches
        {
            return Err(SurveyError::Configuration(format!(
                "store layout (inl{};crl{}) does not match {}",
                layout.inline, layout.crline, geometry
            )));
        }

        Ok(Self {
            geometry,
            transform,
            store,
        })
    }

    /// The survey geometry descriptor
    pub fn geometry(&self) -> &SurveyGeometry {
        &self.geometry
    }

    /// The derived coordinate transform
    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// Number of inlines
    pub fn n_inline(&self) -> usize {
        self.geometry.n_inline()
    }

    /// Number of crosslines
    pub fn n_crline(&self) -> usize {
        self.geometry.n_crline()
    }

    /// Number of vertical samples
    pub fn n_depth(&self) -> usize {
        self.geometry.n_depth()
    }

    /// Iterator over inline numbers
    pub fn inlines(&self) -> impl Iterator<Item = i32> {
        self.geometry.inline_range.values()
    }

    /// Iterator over crossline numbers
    pub fn crlines(&self) -> impl Iterator<Item = i32> {
        self.geometry.crline_range.values()
    }

    /// Iterator over depth values
    pub fn depths(&self) -> impl Iterator<Item = f64> {
        self.geometry.depth_range.values()
    }

    /// Iterator over all (inline, crline) pairs, inline-major
    pub fn inline_crlines(&self) -> impl Iterator<Item = (i32, i32)> {
        let crline_range = self.geometry.crline_range;
        self.geometry
            .inline_range
            .values()
            .flat_map(move |inline| crline_range.values().map(move |crline| (inline, crline)))
    }

    /// Retrieve data for the given logical index.
    ///
    /// The shape of the result follows the index variant:
    /// inline section -> `[n_crline, n_depth]`, crossline section ->
    /// `[n_inline, n_depth]`, depth slice -> `[n_inline, n_crline]`,
    /// cdp trace -> `[n_depth]`.
    pub fn data(&self, index: VolumeIndex) -> Result<ArrayD<f32>> {
        match index {
            VolumeIndex::Inline(inline) => Ok(self.inline_data(inline)?.into_dyn()),
            VolumeIndex::Crline(crline) => Ok(self.crline_data(crline)?.into_dyn()),
            VolumeIndex::Depth(depth) => Ok(self.depth_data(depth)?.into_dyn()),
            VolumeIndex::Cdp { inline, crline } => {
                Ok(self.cdp_data((inline, crline))?.into_dyn())
            }
        }
    }

    /// Replace the data of one inline section.
    ///
    /// Defined only for `VolumeIndex::Inline`; any other variant is a
    /// dispatch error. The payload shape must equal
    /// `(n_crline, n_depth)`.
    pub fn update(&mut self, index: VolumeIndex, data: &Array2<f32>) -> Result<()> {
        match index {
            VolumeIndex::Inline(inline) => self.store.write_inline(inline, data),
            other => Err(SurveyError::DispatchType(format!(
                "update is only defined for inline sections, got {}",
                other
            ))),
        }
    }

    /// Data of one inline section
    pub fn inline_data(&self, inline: i32) -> Result<Array2<f32>> {
        self.store.read_inline(inline)
    }

    /// Data of one crossline section
    pub fn crline_data(&self, crline: i32) -> Result<Array2<f32>> {
        self.store.read_crline(crline)
    }

    /// Data of one depth slice; the depth value is converted to a physical
    /// sample index before storage access
    pub fn depth_data(&self, depth: f64) -> Result<Array2<f32>> {
        let depth_index = self.geometry.depth_range.sample_index(depth)?;
        self.store.read_depth_slice(depth_index)
    }

    /// Data of one cdp trace
    pub fn cdp_data(&self, cdp: (i32, i32)) -> Result<Array1<f32>> {
        self.store.read_cdp(cdp.0, cdp.1)
    }

    /// Snap an arbitrary (inline, crline) pair to the nearest defined CDP.
    ///
    /// Pure index-space snapping applied independently per axis with the
    /// same half-up rounding rule as coordinate inversion; the transform is
    /// not consulted.
    pub fn valid_cdp(&self, cdp: (i32, i32)) -> (i32, i32) {
        (
            self.geometry.inline_range.nearest_line(f64::from(cdp.0)),
            self.geometry.crline_range.nearest_line(f64::from(cdp.1)),
        )
    }
}

impl fmt::Display for SeismicVolume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SeismicVolume(inl{};crl{};z[{},{},{}])",
            self.geometry.inline_range,
            self.geometry.crline_range,
            self.geometry.depth_range.start,
            self.geometry.depth_range.end,
            self.geometry.depth_range.step
        )
    }
}
