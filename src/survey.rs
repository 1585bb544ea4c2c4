//! Survey: seismic volumes and wells tied into one logical grid

use crate::error::{Result, SurveyError};
use crate::geometry::SurveyGeometry;
use crate::transform::CoordinateTransform;
use crate::types::LineRange;
use crate::volume::SeismicVolume;
use ndarray::Array1;
use std::collections::HashMap;
use std::path::Path;

/// A well, reduced to what the survey needs: a name and a physical surface
/// location. Log parsing lives outside this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Well {
    pub name: String,
    /// Physical (east, north) surface location
    pub location: (f64, f64),
}

impl Well {
    pub fn new(name: impl Into<String>, east: f64, north: f64) -> Self {
        Self {
            name: name.into(),
            location: (east, north),
        }
    }
}

/// A survey combines named seismic volumes with wells, tying each well's
/// physical location to a logical (inline, crline) pair.
///
/// A tie is computed once when the well is added and stays fixed until the
/// well is re-added.
pub struct Survey {
    geometry: SurveyGeometry,
    transform: CoordinateTransform,
    volumes: HashMap<String, SeismicVolume>,
    wells: HashMap<String, Well>,
    ties: HashMap<String, (i32, i32)>,
}

impl Survey {
    /// Create an empty survey over the given geometry
    pub fn new(geometry: SurveyGeometry) -> Result<Self> {
        let transform = CoordinateTransform::derive(&geometry)?;
        Ok(Self {
            geometry,
            transform,
            volumes: HashMap::new(),
            wells: HashMap::new(),
            ties: HashMap::new(),
        })
    }

    /// Create a survey from a survey definition file (either schema shape)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(SurveyGeometry::from_file(path)?)
    }

    /// The survey geometry descriptor
    pub fn geometry(&self) -> &SurveyGeometry {
        &self.geometry
    }

    /// The derived coordinate transform
    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// Register a seismic volume under a name
    pub fn add_volume(&mut self, name: impl Into<String>, volume: SeismicVolume) {
        self.volumes.insert(name.into(), volume);
    }

    /// Look up a registered volume
    pub fn volume(&self, name: &str) -> Result<&SeismicVolume> {
        self.volumes
            .get(name)
            .ok_or_else(|| SurveyError::NotFound(format!("seismic volume \"{}\"", name)))
    }

    /// Names of all registered volumes
    pub fn volume_names(&self) -> impl Iterator<Item = &str> {
        self.volumes.keys().map(|name| name.as_str())
    }

    /// Add a well and tie its physical location to the survey grid.
    ///
    /// Returns the computed (inline, crline) tie. Re-adding a well under the
    /// same name recomputes its tie.
    pub fn add_well(&mut self, well: Well) -> Result<(i32, i32)> {
        let (east, north) = well.location;
        let tie = self.transform.coord_to_line(east, north)?;
        self.ties.insert(well.name.clone(), tie);
        self.wells.insert(well.name.clone(), well);
        Ok(tie)
    }

    /// Look up a registered well
    pub fn well(&self, name: &str) -> Result<&Well> {
        self.wells
            .get(name)
            .ok_or_else(|| SurveyError::NotFound(format!("well \"{}\"", name)))
    }

    /// The (inline, crline) tie of a well, if it has been added
    pub fn tie(&self, well_name: &str) -> Option<(i32, i32)> {
        self.ties.get(well_name).copied()
    }

    /// Trace data in the vicinity of a well.
    ///
    /// With `radius == 0` this is the single CDP trace at the tie point.
    /// With `radius > 0` every CDP in the axis-aligned rectangle of
    /// plus/minus `radius` grid steps around the tie is returned, clipped to
    /// the volume range, in inline-major crossline-minor order.
    pub fn get_seis(
        &self,
        volume_name: &str,
        well_name: &str,
        radius: u32,
    ) -> Result<Vec<((i32, i32), Array1<f32>)>> {
        let tie = self
            .tie(well_name)
            .ok_or_else(|| SurveyError::NotFound(format!("well \"{}\"", well_name)))?;
        let volume = self.volume(volume_name)?;

        if radius == 0 {
            let trace = volume.cdp_data(tie)?;
            return Ok(vec![(tie, trace)]);
        }

        let inlines = clipped_lines(volume.geometry().inline_range, tie.0, radius);
        let crlines = clipped_lines(volume.geometry().crline_range, tie.1, radius);

        let mut traces = Vec::with_capacity(inlines.len() * crlines.len());
        for &inline in &inlines {
            for &crline in &crlines {
                let trace = volume.cdp_data((inline, crline))?;
                traces.push(((inline, crline), trace));
            }
        }
        Ok(traces)
    }
}

/// Line numbers within `radius` grid steps of `center`, clipped to the range
fn clipped_lines(range: LineRange, center: i32, radius: u32) -> Vec<i32> {
    let step = range.step.abs();
    let span = radius as i32 * step;
    let lo = (center - span).max(range.min());
    let hi = (center + span).min(range.max());
    (0..)
        .map(|i| lo + i * step)
        .take_while(|&line| line <= hi)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AxisLayout, MemoryStore};
    use crate::types::{ControlPoint, DepthRange, LineRange};

    fn f3_geometry() -> SurveyGeometry {
        SurveyGeometry::new(
            LineRange::new(200, 640, 20).unwrap(),
            LineRange::new(700, 1200, 20).unwrap(),
            DepthRange::new(400.0, 1100.0, 20.0, Some("T".to_string())).unwrap(),
            ControlPoint::new(100, 300, 605835.516689, 6073556.38222),
            ControlPoint::new(100, 1250, 629576.257713, 6074219.892946),
            ControlPoint::new(750, 1250, 629122.546506, 6090463.168806),
        )
    }

    fn f3_survey() -> Survey {
        let geometry = f3_geometry();
        let layout = AxisLayout::new(
            geometry.inline_range,
            geometry.crline_range,
            geometry.depth_range.clone(),
        );
        let volume =
            SeismicVolume::new(geometry.clone(), Box::new(MemoryStore::new(layout))).unwrap();
        let mut survey = Survey::new(geometry).unwrap();
        survey.add_volume("poststack", volume);
        survey
    }

    #[test]
    fn test_well_tie() {
        let mut survey = f3_survey();
        // physical location of grid point (300, 800)
        let tie = survey
            .add_well(Well::new("CN-1", 618191.04009555, 6078903.52942556))
            .unwrap();
        assert_eq!(tie, (300, 800));
        assert_eq!(survey.tie("CN-1"), Some((300, 800)));
        assert_eq!(survey.tie("unknown"), None);
    }

    #[test]
    fn test_get_seis_radius_zero() {
        let mut survey = f3_survey();
        survey
            .add_well(Well::new("CN-1", 618191.04009555, 6078903.52942556))
            .unwrap();
        let traces = survey.get_seis("poststack", "CN-1", 0).unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].0, (300, 800));
        assert_eq!(traces[0].1.len(), 36);
    }

    #[test]
    fn test_get_seis_neighborhood() {
        let mut survey = f3_survey();
        survey
            .add_well(Well::new("CN-1", 618191.04009555, 6078903.52942556))
            .unwrap();
        let traces = survey.get_seis("poststack", "CN-1", 1).unwrap();
        assert_eq!(traces.len(), 9);

        let locations: Vec<(i32, i32)> = traces.iter().map(|(cdp, _)| *cdp).collect();
        let expected: Vec<(i32, i32)> = [280, 300, 320]
            .iter()
            .flat_map(|&inline| [780, 800, 820].iter().map(move |&crline| (inline, crline)))
            .collect();
        assert_eq!(locations, expected);
    }

    #[test]
    fn test_get_seis_clips_at_survey_edge() {
        let mut survey = f3_survey();
        // physical location of the grid corner (200, 700)
        let transform = survey.transform().clone();
        let (x, y) = transform.line_to_coord(200, 700);
        survey.add_well(Well::new("EDGE-1", x, y)).unwrap();
        assert_eq!(survey.tie("EDGE-1"), Some((200, 700)));

        let traces = survey.get_seis("poststack", "EDGE-1", 1).unwrap();
        let locations: Vec<(i32, i32)> = traces.iter().map(|(cdp, _)| *cdp).collect();
        assert_eq!(
            locations,
            vec![(200, 700), (200, 720), (220, 700), (220, 720)]
        );
    }

    #[test]
    fn test_unknown_names() {
        let mut survey = f3_survey();
        survey
            .add_well(Well::new("CN-1", 618191.04009555, 6078903.52942556))
            .unwrap();
        assert!(matches!(
            survey.get_seis("poststack", "absent", 0),
            Err(SurveyError::NotFound(_))
        ));
        assert!(matches!(
            survey.get_seis("absent", "CN-1", 0),
            Err(SurveyError::NotFound(_))
        ));
    }

    #[test]
    fn test_retie_on_re_add() {
        let mut survey = f3_survey();
        survey
            .add_well(Well::new("CN-1", 618191.04009555, 6078903.52942556))
            .unwrap();
        assert_eq!(survey.tie("CN-1"), Some((300, 800)));

        let transform = survey.transform().clone();
        let (x, y) = transform.line_to_coord(320, 820);
        survey.add_well(Well::new("CN-1", x, y)).unwrap();
        assert_eq!(survey.tie("CN-1"), Some((320, 820)));
    }
}
