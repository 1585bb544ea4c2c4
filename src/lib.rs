//! seisurvey - seismic survey geometry and volume indexing
//!
//! Building blocks for pore-pressure analysis over 3-D seismic data:
//! calibrate an affine mapping between a survey's logical (inline, crossline)
//! grid and physical easting/northing from three control points, then use it
//! to address, iterate, snap and update traces inside an out-of-core volume.
//!
//! # Features
//!
//! - Survey geometry parsing from both historical survey-file schemas
//! - Affine line/coordinate conversion with nearest-grid-line snapping
//! - Closed set of logical volume indexes with exhaustive dispatch
//! - Pluggable trace storage (flat binary files, in-memory)
//! - Well tie-in and neighborhood trace queries
//!
//! # Example
//!
//! ```rust,ignore
//! use seisurvey::{Survey, SurveyGeometry, VolumeIndex, Well};
//!
//! # fn example() -> seisurvey::Result<()> {
//! let mut survey = Survey::from_file("surveys/F3/.survey")?;
//! let tie = survey.add_well(Well::new("CN-1", 618191.0, 6078903.5))?;
//! let section = survey.volume("poststack")?.data(VolumeIndex::Inline(tie.0))?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod geometry;
pub mod index;
pub mod storage;
pub mod survey;
pub mod transform;
pub mod types;
pub mod volume;

mod utils;

// Re-exports
pub use error::{Result, SurveyError};
pub use geometry::SurveyGeometry;
pub use index::VolumeIndex;
pub use storage::{AxisLayout, FlatFileStore, MemoryStore, StoreMetadata, TraceStore};
pub use survey::{Survey, Well};
pub use transform::CoordinateTransform;
pub use types::{ControlPoint, DepthRange, LineRange};
pub use volume::SeismicVolume;

/// Version of the seisurvey crate
pub const SEISURVEY_VERSION: &str = env!("CARGO_PKG_VERSION");
