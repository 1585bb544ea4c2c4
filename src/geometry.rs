//! Survey geometry descriptor and the two historical survey-file schemas

use crate::error::{Result, SurveyError};
use crate::types::{ControlPoint, DepthRange, LineRange};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

/// Required keys of the current survey-file schema
const CURRENT_KEYS: [&str; 6] = [
    "inline_range",
    "crline_range",
    "z_range",
    "point_A",
    "point_B",
    "point_C",
];

/// Required keys of the legacy survey-file schema
const LEGACY_KEYS: [&str; 4] = ["Coordinate", "inline", "crline", "depth"];

/// Immutable description of a 3-D survey: the inline/crossline/depth ranges
/// and three labelled control points calibrating the grid against physical
/// easting/northing coordinates.
///
/// Control points are chosen so that A→B spans the crossline axis direction
/// and B→C spans the inline axis direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyGeometry {
    pub inline_range: LineRange,
    pub crline_range: LineRange,
    pub depth_range: DepthRange,
    pub point_a: ControlPoint,
    pub point_b: ControlPoint,
    pub point_c: ControlPoint,
}

impl SurveyGeometry {
    pub fn new(
        inline_range: LineRange,
        crline_range: LineRange,
        depth_range: DepthRange,
        point_a: ControlPoint,
        point_b: ControlPoint,
        point_c: ControlPoint,
    ) -> Self {
        Self {
            inline_range,
            crline_range,
            depth_range,
            point_a,
            point_b,
            point_c,
        }
    }

    /// Parse a survey definition from JSON, accepting either schema shape.
    ///
    /// The current shape (`inline_range`/`point_A`...) is tried first, then
    /// the legacy shape (`Coordinate`/`inline`...). If neither matches, the
    /// error names the keys missing from each shape.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            SurveyError::Configuration("survey definition is not a JSON object".to_string())
        })?;

        let missing_current: Vec<&str> = CURRENT_KEYS
            .iter()
            .filter(|key| !map.contains_key(**key))
            .copied()
            .collect();
        if missing_current.is_empty() {
            return Self::parse_current(value);
        }

        let missing_legacy: Vec<&str> = LEGACY_KEYS
            .iter()
            .filter(|key| !map.contains_key(**key))
            .copied()
            .collect();
        if missing_legacy.is_empty() {
            return Self::parse_legacy(value);
        }

        Err(SurveyError::Configuration(format!(
            "survey definition matches neither schema: current shape missing [{}], \
             legacy shape missing [{}]",
            missing_current.join(", "),
            missing_legacy.join(", ")
        )))
    }

    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Parse from a survey definition file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    fn parse_current(value: &Value) -> Result<Self> {
        let inline_range = parse_line_range(value, "inline_range")?;
        let crline_range = parse_line_range(value, "crline_range")?;
        let depth_range = parse_depth_range(value, "z_range")?;
        let point_a = parse_point(value, "point_A")?;
        let point_b = parse_point(value, "point_B")?;
        let point_c = parse_point(value, "point_C")?;
        Ok(Self::new(
            inline_range,
            crline_range,
            depth_range,
            point_a,
            point_b,
            point_c,
        ))
    }

    fn parse_legacy(value: &Value) -> Result<Self> {
        let coordinate = value["Coordinate"].as_array().ok_or_else(|| {
            SurveyError::Configuration("\"Coordinate\" is not an array".to_string())
        })?;
        if coordinate.len() != 3 {
            return Err(SurveyError::Configuration(format!(
                "\"Coordinate\" holds {} points, expected 3",
                coordinate.len()
            )));
        }
        let point_a = parse_point_value(&coordinate[0], "Coordinate[0]")?;
        let point_b = parse_point_value(&coordinate[1], "Coordinate[1]")?;
        let point_c = parse_point_value(&coordinate[2], "Coordinate[2]")?;
        let inline_range = parse_line_range(value, "inline")?;
        let crline_range = parse_line_range(value, "crline")?;
        let depth_range = parse_depth_range(value, "depth")?;
        Ok(Self::new(
            inline_range,
            crline_range,
            depth_range,
            point_a,
            point_b,
            point_c,
        ))
    }

    /// Number of inlines in the survey
    pub fn n_inline(&self) -> usize {
        self.inline_range.count()
    }

    /// Number of crosslines in the survey
    pub fn n_crline(&self) -> usize {
        self.crline_range.count()
    }

    /// Number of vertical samples in the survey
    pub fn n_depth(&self) -> usize {
        self.depth_range.count()
    }
}

impl fmt::Display for SurveyGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SurveyGeometry(inl{};crl{};z[{},{},{}])",
            self.inline_range,
            self.crline_range,
            self.depth_range.start,
            self.depth_range.end,
            self.depth_range.step
        )
    }
}

fn numbers(value: &Value, key: &str) -> Result<Vec<f64>> {
    let array = value[key]
        .as_array()
        .ok_or_else(|| SurveyError::Configuration(format!("\"{}\" is not an array", key)))?;
    array
        .iter()
        .map(|item| {
            item.as_f64().ok_or_else(|| {
                SurveyError::Configuration(format!("\"{}\" holds a non-numeric element", key))
            })
        })
        .collect()
}

fn parse_line_range(value: &Value, key: &str) -> Result<LineRange> {
    let nums = numbers(value, key)?;
    if nums.len() != 3 {
        return Err(SurveyError::Configuration(format!(
            "\"{}\" holds {} elements, expected [start, end, step]",
            key,
            nums.len()
        )));
    }
    LineRange::new(nums[0] as i32, nums[1] as i32, nums[2] as i32)
}

fn parse_depth_range(value: &Value, key: &str) -> Result<DepthRange> {
    let array = value[key]
        .as_array()
        .ok_or_else(|| SurveyError::Configuration(format!("\"{}\" is not an array", key)))?;
    if array.len() != 3 && array.len() != 4 {
        return Err(SurveyError::Configuration(format!(
            "\"{}\" holds {} elements, expected [start, end, step] or [start, end, step, unit]",
            key,
            array.len()
        )));
    }
    let mut nums = Vec::with_capacity(3);
    for item in &array[..3] {
        nums.push(item.as_f64().ok_or_else(|| {
            SurveyError::Configuration(format!("\"{}\" holds a non-numeric element", key))
        })?);
    }
    let unit = array
        .get(3)
        .and_then(|item| item.as_str())
        .map(|unit| unit.to_string());
    DepthRange::new(nums[0], nums[1], nums[2], unit)
}

fn parse_point(value: &Value, key: &str) -> Result<ControlPoint> {
    parse_point_value(&value[key], key)
}

fn parse_point_value(value: &Value, label: &str) -> Result<ControlPoint> {
    let array = value
        .as_array()
        .ok_or_else(|| SurveyError::Configuration(format!("\"{}\" is not an array", label)))?;
    if array.len() != 4 {
        return Err(SurveyError::Configuration(format!(
            "\"{}\" holds {} elements, expected [inline, crline, east, north]",
            label,
            array.len()
        )));
    }
    let mut nums = Vec::with_capacity(4);
    for item in array {
        nums.push(item.as_f64().ok_or_else(|| {
            SurveyError::Configuration(format!("\"{}\" holds a non-numeric element", label))
        })?);
    }
    Ok(ControlPoint::new(
        nums[0] as i32,
        nums[1] as i32,
        nums[2],
        nums[3],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn current_shape() -> Value {
        json!({
            "inline_range": [200, 640, 20],
            "crline_range": [700, 1200, 20],
            "z_range": [400, 1100, 20, "T"],
            "point_A": [100, 300, 605835.516689, 6073556.38222],
            "point_B": [100, 1250, 629576.257713, 6074219.892946],
            "point_C": [750, 1250, 629122.546506, 6090463.168806]
        })
    }

    fn legacy_shape() -> Value {
        json!({
            "Coordinate": [
                [100, 300, 605835.516689, 6073556.38222],
                [100, 1250, 629576.257713, 6074219.892946],
                [750, 1250, 629122.546506, 6090463.168806]
            ],
            "inline": [200, 640, 20],
            "crline": [700, 1200, 20],
            "depth": [400, 1100, 20]
        })
    }

    #[test]
    fn test_both_schemas_normalize_identically() {
        let current = SurveyGeometry::from_value(&current_shape()).unwrap();
        let legacy = SurveyGeometry::from_value(&legacy_shape()).unwrap();

        assert_eq!(current.inline_range, legacy.inline_range);
        assert_eq!(current.crline_range, legacy.crline_range);
        assert_eq!(current.point_a, legacy.point_a);
        assert_eq!(current.point_b, legacy.point_b);
        assert_eq!(current.point_c, legacy.point_c);
        assert_eq!(current.depth_range.start, legacy.depth_range.start);
        assert_eq!(current.depth_range.unit, Some("T".to_string()));
        assert_eq!(legacy.depth_range.unit, None);
    }

    #[test]
    fn test_counts() {
        let geometry = SurveyGeometry::from_value(&current_shape()).unwrap();
        assert_eq!(geometry.n_inline(), 23);
        assert_eq!(geometry.n_crline(), 26);
        assert_eq!(geometry.n_depth(), 36);
    }

    #[test]
    fn test_missing_keys_are_named() {
        let mut broken = current_shape();
        broken.as_object_mut().unwrap().remove("point_B");

        let err = SurveyGeometry::from_value(&broken).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("point_B"));
        assert!(message.contains("Coordinate"));
    }

    #[test]
    fn test_zero_step_rejected() {
        let mut broken = current_shape();
        broken["inline_range"] = json!([200, 640, 0]);
        assert!(matches!(
            SurveyGeometry::from_value(&broken),
            Err(SurveyError::Configuration(_))
        ));
    }

    #[test]
    fn test_malformed_point_rejected() {
        let mut broken = current_shape();
        broken["point_A"] = json!([100, 300]);
        assert!(SurveyGeometry::from_value(&broken).is_err());
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(SurveyGeometry::from_value(&json!([1, 2, 3])).is_err());
    }
}
