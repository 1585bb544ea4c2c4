//! Logical index types for addressing slices and traces within a volume

use std::fmt;

/// A logical address into a seismic volume.
///
/// The closed set of ways to pick out a slice or a trace: an inline section,
/// a crossline section, a depth slice, or a single CDP. Variants are pure
/// dispatch labels and carry no storage reference; `SeismicVolume::data`
/// matches on the variant to decide what to read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeIndex {
    /// An inline section, shaped crossline-count x depth-count
    Inline(i32),
    /// A crossline section, shaped inline-count x depth-count
    Crline(i32),
    /// A depth slice, shaped inline-count x crossline-count. Carries a depth
    /// value, not a sample index; conversion happens before storage access.
    Depth(f64),
    /// A single trace at (inline, crline), of depth-count samples
    Cdp { inline: i32, crline: i32 },
}

impl VolumeIndex {
    /// Address a single CDP trace
    pub fn cdp(pair: (i32, i32)) -> Self {
        VolumeIndex::Cdp {
            inline: pair.0,
            crline: pair.1,
        }
    }
}

impl From<(i32, i32)> for VolumeIndex {
    fn from(pair: (i32, i32)) -> Self {
        VolumeIndex::cdp(pair)
    }
}

impl fmt::Display for VolumeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeIndex::Inline(value) => write!(f, "inline {}", value),
            VolumeIndex::Crline(value) => write!(f, "crossline {}", value),
            VolumeIndex::Depth(value) => write!(f, "depth {}", value),
            VolumeIndex::Cdp { inline, crline } => write!(f, "cdp ({}, {})", inline, crline),
        }
    }
}
