//! Data types shared by the transform pipeline and its collaborators.

use crate::{
    constants::{TRANSFORMED_HAND_COORDS, TRANSFORMED_HAND_FRAME, WRIST_INDEX},
    Error, Result,
};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which hand an instance processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandSide {
    /// Left hand
    Left,
    /// Right hand
    Right,
}

impl HandSide {
    /// Lowercase tag used in topics, file names and records
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Name reported when the component starts
    #[must_use]
    pub fn component_name(self) -> String {
        format!("{}_hand_keypoint_transform", self.as_str())
    }

    /// Primary output topic
    #[must_use]
    pub fn coords_topic(self) -> String {
        format!("{}_{}", self.as_str(), TRANSFORMED_HAND_COORDS)
    }

    /// Legacy output topic carrying the same payload as [`Self::coords_topic`]
    #[must_use]
    pub fn frame_topic(self) -> String {
        format!("{}_{}", self.as_str(), TRANSFORMED_HAND_FRAME)
    }
}

impl fmt::Display for HandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(Error::Config(format!("hand side must be left or right, got '{other}'"))),
        }
    }
}

/// Whether a keypoint set is absolute or relative to a reference pose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandMode {
    /// Relative to a reference pose
    Relative = 0,
    /// Absolute tracking space
    Absolute = 1,
}

impl HandMode {
    #[must_use]
    pub fn from_is_relative(is_relative: bool) -> Self {
        if is_relative {
            Self::Relative
        } else {
            Self::Absolute
        }
    }

    #[must_use]
    pub fn is_relative(self) -> bool {
        self == Self::Relative
    }
}

/// Ordered 3D hand landmarks; index 0 is the wrist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<[f64; 3]>", into = "Vec<[f64; 3]>")]
pub struct KeypointSet {
    points: Vec<Vector3<f64>>,
}

impl KeypointSet {
    #[must_use]
    pub fn new(points: Vec<Vector3<f64>>) -> Self {
        Self { points }
    }

    /// Build from `[x, y, z]` rows
    #[must_use]
    pub fn from_rows(rows: &[[f64; 3]]) -> Self {
        Self {
            points: rows.iter().map(|r| Vector3::new(r[0], r[1], r[2])).collect(),
        }
    }

    /// Reshape a flat `x0, y0, z0, x1, ...` buffer into exactly `expected` points
    ///
    /// # Errors
    ///
    /// Returns `MalformedFrame` if the buffer does not hold `expected * 3` values
    pub fn from_flat(values: &[f64], expected: usize) -> Result<Self> {
        if values.len() != expected * 3 {
            return Err(Error::MalformedFrame(format!(
                "expected {} coordinate values ({} keypoints × 3), got {}",
                expected * 3,
                expected,
                values.len()
            )));
        }

        Ok(Self {
            points: values
                .chunks_exact(3)
                .map(|c| Vector3::new(c[0], c[1], c[2]))
                .collect(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Vector3<f64>> {
        self.points.get(index)
    }

    /// The wrist landmark, if the set is non-empty
    #[must_use]
    pub fn wrist(&self) -> Option<&Vector3<f64>> {
        self.points.get(WRIST_INDEX)
    }

    /// Copy with `offset` subtracted from every point
    #[must_use]
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            points: self.points.iter().map(|p| p - offset).collect(),
        }
    }

    #[must_use]
    pub fn to_rows(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| [p.x, p.y, p.z]).collect()
    }

    /// Fail with `MalformedFrame` unless the set has exactly `expected` points
    ///
    /// # Errors
    ///
    /// Returns `MalformedFrame` on a count mismatch or a non-finite coordinate
    pub fn ensure_shape(&self, expected: usize) -> Result<()> {
        if self.points.len() != expected {
            return Err(Error::MalformedFrame(format!(
                "expected {expected} keypoints, got {}",
                self.points.len()
            )));
        }
        if let Some(index) = self.points.iter().position(|p| !p.iter().all(|v| v.is_finite())) {
            return Err(Error::MalformedFrame(format!("keypoint {index} is not finite")));
        }
        Ok(())
    }
}

impl From<Vec<[f64; 3]>> for KeypointSet {
    fn from(rows: Vec<[f64; 3]>) -> Self {
        Self::from_rows(&rows)
    }
}

impl From<KeypointSet> for Vec<[f64; 3]> {
    fn from(set: KeypointSet) -> Self {
        set.to_rows()
    }
}

/// Three basis vectors without an origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub x: Vector3<f64>,
    pub y: Vector3<f64>,
    pub z: Vector3<f64>,
}

impl Basis {
    #[must_use]
    pub fn new(x: Vector3<f64>, y: Vector3<f64>, z: Vector3<f64>) -> Self {
        Self { x, y, z }
    }

    /// The canonical x, y, z axes
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Vector3::x(), Vector3::y(), Vector3::z())
    }

    /// 3×3 matrix whose rows are x, y and z
    #[must_use]
    pub fn to_row_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_rows(&[self.x.transpose(), self.y.transpose(), self.z.transpose()])
    }

    /// Unit length and pairwise orthogonal within `eps`
    #[must_use]
    pub fn is_orthonormal(&self, eps: f64) -> bool {
        let unit = [self.x, self.y, self.z].iter().all(|v| (v.norm() - 1.0).abs() < eps);
        unit && self.x.dot(&self.y).abs() < eps
            && self.y.dot(&self.z).abs() < eps
            && self.x.dot(&self.z).abs() < eps
    }

    /// z agrees with x × y within `eps`
    #[must_use]
    pub fn is_right_handed(&self, eps: f64) -> bool {
        (self.x.cross(&self.y) - self.z).norm() < eps
    }
}

/// Origin plus an orthonormal right-handed basis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 3]; 4]", into = "[[f64; 3]; 4]")]
pub struct CoordinateFrame {
    pub origin: Vector3<f64>,
    pub basis: Basis,
}

impl CoordinateFrame {
    #[must_use]
    pub fn new(origin: Vector3<f64>, basis: Basis) -> Self {
        Self { origin, basis }
    }

    /// `[origin, x, y, z]`, the order used on the wire and in logs
    #[must_use]
    pub fn vectors(&self) -> [Vector3<f64>; 4] {
        [self.origin, self.basis.x, self.basis.y, self.basis.z]
    }

    #[must_use]
    pub fn from_vectors(vectors: [Vector3<f64>; 4]) -> Self {
        let [origin, x, y, z] = vectors;
        Self::new(origin, Basis::new(x, y, z))
    }

    #[must_use]
    pub fn to_rows(&self) -> [[f64; 3]; 4] {
        self.vectors().map(|v| [v.x, v.y, v.z])
    }
}

impl From<[[f64; 3]; 4]> for CoordinateFrame {
    fn from(rows: [[f64; 3]; 4]) -> Self {
        Self::from_vectors(rows.map(|r| Vector3::new(r[0], r[1], r[2])))
    }
}

impl From<CoordinateFrame> for [[f64; 3]; 4] {
    fn from(frame: CoordinateFrame) -> Self {
        frame.to_rows()
    }
}

/// Keypoint payload as the VR detector sends it, either flat or as `[x, y, z]` rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawKeypoints {
    Rows(Vec<[f64; 3]>),
    Flat(Vec<f64>),
}

/// One acquired frame from the VR input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    pub keypoints: RawKeypoints,
    #[serde(default)]
    pub is_relative: bool,
}

impl InputFrame {
    #[must_use]
    pub fn from_rows(rows: Vec<[f64; 3]>, is_relative: bool) -> Self {
        Self {
            keypoints: RawKeypoints::Rows(rows),
            is_relative,
        }
    }

    #[must_use]
    pub fn mode(&self) -> HandMode {
        HandMode::from_is_relative(self.is_relative)
    }

    /// Reshape into `expected` keypoints
    ///
    /// # Errors
    ///
    /// Returns `MalformedFrame` if the payload has a different number of points
    pub fn to_keypoint_set(&self, expected: usize) -> Result<KeypointSet> {
        let set = match &self.keypoints {
            RawKeypoints::Rows(rows) => KeypointSet::from_rows(rows),
            RawKeypoints::Flat(values) => KeypointSet::from_flat(values, expected)?,
        };
        set.ensure_shape(expected)?;
        Ok(set)
    }
}

/// Smoothed result published for downstream controllers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub timestamp_s: f64,
    pub hand_side: HandSide,
    pub keypoints: KeypointSet,
    pub is_relative: bool,
    pub frame_vectors: CoordinateFrame,
}
