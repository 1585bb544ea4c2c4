//! Physical trace storage backends and the contract the volume layer
//! requires from them

use crate::error::{Result, SurveyError};
use crate::types::{DepthRange, LineRange};
use crate::utils::{bytes_to_samples, samples_to_bytes};
use chrono::{DateTime, Utc};
use ndarray::{s, Array1, Array2, Array3, Axis};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const METADATA_FILE: &str = "metadata.json";
const DATA_FILE: &str = "samples.bin";

/// Axis metadata exposed by every trace store, used to build a volume
/// "like" an existing one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLayout {
    pub inline: LineRange,
    pub crline: LineRange,
    pub depth: DepthRange,
}

impl AxisLayout {
    pub fn new(inline: LineRange, crline: LineRange, depth: DepthRange) -> Self {
        Self {
            inline,
            crline,
            depth,
        }
    }

    pub fn n_inline(&self) -> usize {
        self.inline.count()
    }

    pub fn n_crline(&self) -> usize {
        self.crline.count()
    }

    pub fn n_depth(&self) -> usize {
        self.depth.count()
    }

    /// Flat trace index for a defined (inline, crline) pair, inline-major
    pub fn trace_index(&self, inline: i32, crline: i32) -> Result<usize> {
        let il_pos = self.inline.position(inline)?;
        let cl_pos = self.crline.position(crline)?;
        Ok(il_pos * self.n_crline() + cl_pos)
    }

    fn check_section_shape(&self, data: &Array2<f32>) -> Result<()> {
        let expected = (self.n_crline(), self.n_depth());
        if data.dim() != expected {
            return Err(SurveyError::ShapeMismatch(format!(
                "inline section payload is {:?}, expected {:?}",
                data.dim(),
                expected
            )));
        }
        Ok(())
    }

    fn check_depth_index(&self, depth_index: usize) -> Result<()> {
        if depth_index >= self.n_depth() {
            return Err(SurveyError::OutOfRange(format!(
                "depth sample index {} exceeds sample count {}",
                depth_index,
                self.n_depth()
            )));
        }
        Ok(())
    }
}

/// Sidecar metadata stored next to the binary sample data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Axis layout of the stored volume
    pub layout: AxisLayout,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,

    /// Property label, e.g. "seis" or "velocity"
    pub property: Option<String>,

    /// True when the vertical axis is depth rather than two-way time
    pub in_depth: bool,
}

impl StoreMetadata {
    pub fn new(layout: AxisLayout) -> Self {
        let now = Utc::now();
        Self {
            layout,
            created_at: now,
            modified_at: now,
            property: None,
            in_depth: false,
        }
    }

    /// Set the property label
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Mark the vertical axis as depth
    pub fn with_in_depth(mut self, in_depth: bool) -> Self {
        self.in_depth = in_depth;
        self
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

/// Contract the volume layer requires from physical trace storage.
///
/// All calls are blocking and acquire the underlying resource for the
/// duration of one operation only; no handle is held across calls.
pub trait TraceStore {
    /// Axis metadata of the stored volume
    fn layout(&self) -> &AxisLayout;

    /// Samples of one inline section, shaped crossline-count x depth-count
    fn read_inline(&self, inline: i32) -> Result<Array2<f32>>;

    /// Replace one inline section; fails on payload shape mismatch
    fn write_inline(&mut self, inline: i32, data: &Array2<f32>) -> Result<()>;

    /// Samples of one crossline section, shaped inline-count x depth-count
    fn read_crline(&self, crline: i32) -> Result<Array2<f32>>;

    /// Samples of one depth slice, shaped inline-count x crossline-count
    fn read_depth_slice(&self, depth_index: usize) -> Result<Array2<f32>>;

    /// Samples of one trace, of depth-count samples
    fn read_cdp(&self, inline: i32, crline: i32) -> Result<Array1<f32>>;
}

/// Filesystem-backed trace store: a directory holding a `metadata.json`
/// sidecar and a flat little-endian f32 sample file in inline-major trace
/// order.
///
/// Every read opens the sample file for the duration of that call, so
/// concurrent readers never contend on a held handle.
pub struct FlatFileStore {
    dir: PathBuf,
    metadata: StoreMetadata,
}

impl FlatFileStore {
    /// Open an existing store directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let metadata_path = dir.join(METADATA_FILE);
        if !metadata_path.exists() {
            return Err(SurveyError::StorageUnavailable(format!(
                "no {} under {}",
                METADATA_FILE,
                dir.display()
            )));
        }
        let text = fs::read_to_string(&metadata_path)?;
        let metadata: StoreMetadata = serde_json::from_str(&text)?;
        if !dir.join(DATA_FILE).exists() {
            return Err(SurveyError::StorageUnavailable(format!(
                "no {} under {}",
                DATA_FILE,
                dir.display()
            )));
        }
        Ok(Self { dir, metadata })
    }

    /// Create a new zero-filled store
    pub fn create(dir: impl AsRef<Path>, metadata: StoreMetadata) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let total_bytes = metadata.layout.n_inline() as u64
            * metadata.layout.n_crline() as u64
            * metadata.layout.n_depth() as u64
            * 4;
        let data_file = fs::File::create(dir.join(DATA_FILE))?;
        data_file.set_len(total_bytes)?;

        let store = Self { dir, metadata };
        store.write_metadata()?;
        Ok(store)
    }

    /// Create a new store with the same layout and contents as an existing
    /// one
    pub fn create_like(dir: impl AsRef<Path>, like: &FlatFileStore) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        fs::copy(like.dir.join(DATA_FILE), dir.join(DATA_FILE))?;

        let store = Self {
            dir,
            metadata: StoreMetadata::new(like.metadata.layout.clone()),
        };
        store.write_metadata()?;
        Ok(store)
    }

    /// Store metadata sidecar
    pub fn metadata(&self) -> &StoreMetadata {
        &self.metadata
    }

    fn write_metadata(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.metadata)?;
        fs::write(self.dir.join(METADATA_FILE), json)?;
        Ok(())
    }

    fn open_data(&self) -> Result<fs::File> {
        let path = self.dir.join(DATA_FILE);
        fs::File::open(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                SurveyError::StorageUnavailable(format!("{} is missing", path.display()))
            } else {
                SurveyError::Io(err)
            }
        })
    }

    /// Byte offset of the first sample of a trace, by trace positions
    fn trace_offset(&self, il_pos: usize, cl_pos: usize) -> u64 {
        let layout = &self.metadata.layout;
        ((il_pos * layout.n_crline() + cl_pos) * layout.n_depth() * 4) as u64
    }

    fn read_at(&self, file: &mut fs::File, offset: u64, len: usize) -> Result<Vec<f32>> {
        file.seek(SeekFrom::Start(offset))?;
        let mut bytes = vec![0u8; len * 4];
        file.read_exact(&mut bytes)?;
        bytes_to_samples(&bytes)
    }
}

impl TraceStore for FlatFileStore {
    fn layout(&self) -> &AxisLayout {
        &self.metadata.layout
    }

    fn read_inline(&self, inline: i32) -> Result<Array2<f32>> {
        let layout = self.metadata.layout.clone();
        let il_pos = layout.inline.position(inline)?;

        let mut file = self.open_data()?;
        let samples = self.read_at(
            &mut file,
            self.trace_offset(il_pos, 0),
            layout.n_crline() * layout.n_depth(),
        )?;
        Array2::from_shape_vec((layout.n_crline(), layout.n_depth()), samples)
            .map_err(|err| SurveyError::ShapeMismatch(err.to_string()))
    }

    fn write_inline(&mut self, inline: i32, data: &Array2<f32>) -> Result<()> {
        let layout = self.metadata.layout.clone();
        let il_pos = layout.inline.position(inline)?;
        layout.check_section_shape(data)?;

        let path = self.dir.join(DATA_FILE);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    SurveyError::StorageUnavailable(format!("{} is missing", path.display()))
                } else {
                    SurveyError::Io(err)
                }
            })?;
        file.seek(SeekFrom::Start(self.trace_offset(il_pos, 0)))?;
        let samples: Vec<f32> = data.iter().copied().collect();
        file.write_all(&samples_to_bytes(&samples))?;

        self.metadata.touch();
        self.write_metadata()
    }

    fn read_crline(&self, crline: i32) -> Result<Array2<f32>> {
        let layout = self.metadata.layout.clone();
        let cl_pos = layout.crline.position(crline)?;

        let mut file = self.open_data()?;
        let mut samples = Vec::with_capacity(layout.n_inline() * layout.n_depth());
        for il_pos in 0..layout.n_inline() {
            let trace = self.read_at(
                &mut file,
                self.trace_offset(il_pos, cl_pos),
                layout.n_depth(),
            )?;
            samples.extend_from_slice(&trace);
        }
        Array2::from_shape_vec((layout.n_inline(), layout.n_depth()), samples)
            .map_err(|err| SurveyError::ShapeMismatch(err.to_string()))
    }

    fn read_depth_slice(&self, depth_index: usize) -> Result<Array2<f32>> {
        let layout = self.metadata.layout.clone();
        layout.check_depth_index(depth_index)?;

        let mut file = self.open_data()?;
        let mut samples = Vec::with_capacity(layout.n_inline() * layout.n_crline());
        for il_pos in 0..layout.n_inline() {
            for cl_pos in 0..layout.n_crline() {
                let offset = self.trace_offset(il_pos, cl_pos) + depth_index as u64 * 4;
                let sample = self.read_at(&mut file, offset, 1)?;
                samples.push(sample[0]);
            }
        }
        Array2::from_shape_vec((layout.n_inline(), layout.n_crline()), samples)
            .map_err(|err| SurveyError::ShapeMismatch(err.to_string()))
    }

    fn read_cdp(&self, inline: i32, crline: i32) -> Result<Array1<f32>> {
        let layout = self.metadata.layout.clone();
        let il_pos = layout.inline.position(inline)?;
        let cl_pos = layout.crline.position(crline)?;

        let mut file = self.open_data()?;
        let samples = self.read_at(
            &mut file,
            self.trace_offset(il_pos, cl_pos),
            layout.n_depth(),
        )?;
        Ok(Array1::from_vec(samples))
    }
}

/// In-memory trace store, for tests and derived volumes
pub struct MemoryStore {
    layout: AxisLayout,
    samples: Array3<f32>,
}

impl MemoryStore {
    /// Create a zero-filled store
    pub fn new(layout: AxisLayout) -> Self {
        let shape = (layout.n_inline(), layout.n_crline(), layout.n_depth());
        Self {
            layout,
            samples: Array3::zeros(shape),
        }
    }

    /// Create a store over existing samples, indexed
    /// [inline position, crossline position, depth sample]
    pub fn from_samples(layout: AxisLayout, samples: Array3<f32>) -> Result<Self> {
        let expected = (layout.n_inline(), layout.n_crline(), layout.n_depth());
        if samples.dim() != expected {
            return Err(SurveyError::ShapeMismatch(format!(
                "sample cube is {:?}, layout expects {:?}",
                samples.dim(),
                expected
            )));
        }
        Ok(Self { layout, samples })
    }
}

impl TraceStore for MemoryStore {
    fn layout(&self) -> &AxisLayout {
        &self.layout
    }

    fn read_inline(&self, inline: i32) -> Result<Array2<f32>> {
        let il_pos = self.layout.inline.position(inline)?;
        Ok(self.samples.index_axis(Axis(0), il_pos).to_owned())
    }

    fn write_inline(&mut self, inline: i32, data: &Array2<f32>) -> Result<()> {
        let il_pos = self.layout.inline.position(inline)?;
        self.layout.check_section_shape(data)?;
        self.samples.index_axis_mut(Axis(0), il_pos).assign(data);
        Ok(())
    }

    fn read_crline(&self, crline: i32) -> Result<Array2<f32>> {
        let cl_pos = self.layout.crline.position(crline)?;
        Ok(self.samples.index_axis(Axis(1), cl_pos).to_owned())
    }

    fn read_depth_slice(&self, depth_index: usize) -> Result<Array2<f32>> {
        self.layout.check_depth_index(depth_index)?;
        Ok(self.samples.index_axis(Axis(2), depth_index).to_owned())
    }

    fn read_cdp(&self, inline: i32, crline: i32) -> Result<Array1<f32>> {
        let il_pos = self.layout.inline.position(inline)?;
        let cl_pos = self.layout.crline.position(crline)?;
        Ok(self.samples.slice(s![il_pos, cl_pos, ..]).to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn small_layout() -> AxisLayout {
        AxisLayout::new(
            LineRange::new(100, 140, 20).unwrap(),
            LineRange::new(300, 360, 20).unwrap(),
            DepthRange::new(0.0, 40.0, 10.0, None).unwrap(),
        )
    }

    fn ramp_section(layout: &AxisLayout, base: f32) -> Array2<f32> {
        Array2::from_shape_fn((layout.n_crline(), layout.n_depth()), |(i, j)| {
            base + (i * layout.n_depth() + j) as f32
        })
    }

    #[test]
    fn test_trace_index() {
        let layout = small_layout();
        assert_eq!(layout.trace_index(100, 300).unwrap(), 0);
        assert_eq!(layout.trace_index(100, 320).unwrap(), 1);
        assert_eq!(layout.trace_index(120, 300).unwrap(), 4);
        assert!(layout.trace_index(90, 300).is_err());
    }

    #[test]
    fn test_flat_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let layout = small_layout();
        let mut store =
            FlatFileStore::create(temp_dir.path(), StoreMetadata::new(layout.clone())).unwrap();

        let section = ramp_section(&layout, 10.0);
        store.write_inline(120, &section).unwrap();

        assert_eq!(store.read_inline(120).unwrap(), section);
        // untouched inline stays zeroed
        assert!(store.read_inline(100).unwrap().iter().all(|&v| v == 0.0));

        // crossline section picks the right column of each inline
        let crline = store.read_crline(320).unwrap();
        assert_eq!(crline.dim(), (3, 5));
        assert_eq!(crline[[1, 0]], section[[1, 0]]);
        assert_eq!(crline[[0, 0]], 0.0);

        // depth slice picks one sample per trace
        let slice = store.read_depth_slice(2).unwrap();
        assert_eq!(slice.dim(), (3, 4));
        assert_eq!(slice[[1, 3]], section[[3, 2]]);

        // cdp trace
        let trace = store.read_cdp(120, 360).unwrap();
        assert_eq!(trace.len(), 5);
        assert_eq!(trace[0], section[[3, 0]]);
    }

    #[test]
    fn test_flat_file_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let layout = small_layout();
        let mut store = FlatFileStore::create(
            temp_dir.path(),
            StoreMetadata::new(layout.clone()).with_property("velocity"),
        )
        .unwrap();
        store.write_inline(100, &ramp_section(&layout, 1.0)).unwrap();

        let reopened = FlatFileStore::open(temp_dir.path()).unwrap();
        assert_eq!(reopened.metadata().property.as_deref(), Some("velocity"));
        assert_eq!(reopened.layout(), &layout);
        assert_eq!(
            reopened.read_inline(100).unwrap(),
            ramp_section(&layout, 1.0)
        );
    }

    #[test]
    fn test_create_like_copies_samples() {
        let temp_dir = TempDir::new().unwrap();
        let layout = small_layout();
        let mut source = FlatFileStore::create(
            temp_dir.path().join("source"),
            StoreMetadata::new(layout.clone()),
        )
        .unwrap();
        source.write_inline(140, &ramp_section(&layout, 5.0)).unwrap();

        let copy = FlatFileStore::create_like(temp_dir.path().join("copy"), &source).unwrap();
        assert_eq!(copy.layout(), source.layout());
        assert_eq!(
            copy.read_inline(140).unwrap(),
            source.read_inline(140).unwrap()
        );
    }

    #[test]
    fn test_open_missing_store() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            FlatFileStore::open(temp_dir.path().join("absent")),
            Err(SurveyError::StorageUnavailable(_))
        ));
    }

    #[test]
    fn test_write_shape_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let layout = small_layout();
        let mut store =
            FlatFileStore::create(temp_dir.path(), StoreMetadata::new(layout)).unwrap();

        let wrong = Array2::<f32>::zeros((2, 2));
        assert!(matches!(
            store.write_inline(100, &wrong),
            Err(SurveyError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_memory_store_shapes() {
        let layout = small_layout();
        let mut store = MemoryStore::new(layout.clone());
        let section = ramp_section(&layout, 0.0);
        store.write_inline(100, &section).unwrap();

        assert_eq!(store.read_inline(100).unwrap().dim(), (4, 5));
        assert_eq!(store.read_crline(300).unwrap().dim(), (3, 5));
        assert_eq!(store.read_depth_slice(0).unwrap().dim(), (3, 4));
        assert_eq!(store.read_cdp(100, 340).unwrap().len(), 5);
        assert_eq!(store.read_cdp(100, 340).unwrap()[1], section[[2, 1]]);
        assert!(store.read_inline(160).is_err());
        assert!(store.read_depth_slice(5).is_err());
    }
}
