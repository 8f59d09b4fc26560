//! Stable hand frames derived from the wrist and three knuckle landmarks.
//!
//! Using several knuckles instead of a single finger keeps the frame steady
//! when one landmark jitters.

use crate::{
    constants::{OCULUS_KNUCKLES, WRIST_INDEX},
    orthogonalize::{normalize, orthogonalize},
    types::{Basis, CoordinateFrame, HandSide, KeypointSet},
    Error, Result,
};
use nalgebra::Vector3;

/// Positions of the landmarks used to build the frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnuckleIndices {
    pub wrist: usize,
    pub index: usize,
    pub middle: usize,
    pub pinky: usize,
}

impl KnuckleIndices {
    /// Pick index, middle and pinky from an ordered knuckle list
    /// (first, second and last entry; with two entries pinky is the middle)
    ///
    /// # Errors
    ///
    /// Returns `Config` if fewer than two knuckles are listed
    pub fn from_knuckles(knuckles: &[usize]) -> Result<Self> {
        match knuckles {
            [index, middle, rest @ ..] => Ok(Self {
                wrist: WRIST_INDEX,
                index: *index,
                middle: *middle,
                pinky: *rest.last().unwrap_or(middle),
            }),
            _ => Err(Error::Config(format!(
                "need at least two knuckle indices, got {}",
                knuckles.len()
            ))),
        }
    }

    /// Largest index referenced
    #[must_use]
    pub fn max_index(&self) -> usize {
        self.wrist.max(self.index).max(self.middle).max(self.pinky)
    }
}

impl Default for KnuckleIndices {
    fn default() -> Self {
        Self {
            wrist: WRIST_INDEX,
            index: OCULUS_KNUCKLES[0],
            middle: OCULUS_KNUCKLES[1],
            pinky: OCULUS_KNUCKLES[OCULUS_KNUCKLES.len() - 1],
        }
    }
}

/// Palm axes before orthogonalization
struct PalmAxes {
    wrist: Vector3<f64>,
    normal: Vector3<f64>,
    direction: Vector3<f64>,
    side: Vector3<f64>,
}

/// Builds the rotation-alignment and hand-direction frames
#[derive(Debug, Clone)]
pub struct FrameStabilizer {
    hand_side: HandSide,
    indices: KnuckleIndices,
}

impl FrameStabilizer {
    #[must_use]
    pub fn new(hand_side: HandSide, indices: KnuckleIndices) -> Self {
        Self { hand_side, indices }
    }

    #[must_use]
    pub fn indices(&self) -> KnuckleIndices {
        self.indices
    }

    #[must_use]
    pub fn hand_side(&self) -> HandSide {
        self.hand_side
    }

    fn landmark(&self, keypoints: &KeypointSet, index: usize) -> Result<Vector3<f64>> {
        keypoints.get(index).copied().ok_or_else(|| {
            Error::MalformedFrame(format!(
                "landmark {index} missing from a set of {} keypoints",
                keypoints.len()
            ))
        })
    }

    fn palm_axes(&self, keypoints: &KeypointSet) -> Result<PalmAxes> {
        let wrist = self.landmark(keypoints, self.indices.wrist)?;
        let v1 = self.landmark(keypoints, self.indices.index)? - wrist;
        let v2 = self.landmark(keypoints, self.indices.pinky)? - wrist;
        let v3 = self.landmark(keypoints, self.indices.middle)? - wrist;

        // Left and right share the same construction.
        let normal = normalize(&v1.cross(&v3))?;
        let direction = normalize(&((v1 + v2 + v3) / 3.0))?;
        let side = normalize(&direction.cross(&normal))?;

        Ok(PalmAxes {
            wrist,
            normal,
            direction,
            side,
        })
    }

    /// Basis the keypoints are rotated into: x = side, y = palm direction,
    /// z = palm normal
    ///
    /// # Errors
    ///
    /// `MalformedFrame` for missing landmarks, `DegenerateGeometry` for
    /// collinear or coincident ones
    pub fn rotation_frame(&self, keypoints: &KeypointSet) -> Result<Basis> {
        let axes = self.palm_axes(keypoints)?;
        orthogonalize(&axes.side, &axes.direction, &axes.normal)
    }

    /// Wrist-anchored frame for downstream consumers: x = side,
    /// y = palm normal, z = palm direction
    ///
    /// # Errors
    ///
    /// `MalformedFrame` for missing landmarks, `DegenerateGeometry` for
    /// collinear or coincident ones
    pub fn hand_direction_frame(&self, keypoints: &KeypointSet) -> Result<CoordinateFrame> {
        let axes = self.palm_axes(keypoints)?;
        let basis = orthogonalize(&axes.side, &axes.normal, &axes.direction)?;
        Ok(CoordinateFrame::new(axes.wrist, basis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn square_palm() -> (FrameStabilizer, KeypointSet) {
        let indices = KnuckleIndices {
            wrist: 0,
            index: 1,
            middle: 2,
            pinky: 3,
        };
        let keypoints = KeypointSet::from_rows(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ]);
        (FrameStabilizer::new(HandSide::Right, indices), keypoints)
    }

    #[test]
    fn test_knuckle_indices_from_list() {
        let indices = KnuckleIndices::from_knuckles(&[6, 9, 12, 16]).unwrap();
        assert_eq!(indices, KnuckleIndices::default());
        assert_eq!(indices.max_index(), 16);

        let two = KnuckleIndices::from_knuckles(&[3, 5]).unwrap();
        assert_eq!((two.index, two.middle, two.pinky), (3, 5, 5));

        assert!(matches!(KnuckleIndices::from_knuckles(&[4]), Err(Error::Config(_))));
    }

    #[test]
    fn test_rotation_frame_of_square_palm() {
        let (stabilizer, keypoints) = square_palm();
        let basis = stabilizer.rotation_frame(&keypoints).unwrap();
        let s = std::f64::consts::FRAC_1_SQRT_2;

        assert!((basis.x - Vector3::new(s, -s, 0.0)).norm() < EPS);
        assert!((basis.y - Vector3::new(s, s, 0.0)).norm() < EPS);
        assert!((basis.z - Vector3::z()).norm() < EPS);
        assert!(basis.is_right_handed(EPS));
    }

    #[test]
    fn test_hand_direction_frame_of_square_palm() {
        let (stabilizer, keypoints) = square_palm();
        let frame = stabilizer.hand_direction_frame(&keypoints).unwrap();
        let s = std::f64::consts::FRAC_1_SQRT_2;

        assert_eq!(frame.origin, Vector3::zeros());
        assert!((frame.basis.x - Vector3::new(s, -s, 0.0)).norm() < EPS);
        assert!((frame.basis.y - Vector3::z()).norm() < EPS);
        assert!(frame.basis.is_orthonormal(EPS));
        assert!(frame.basis.is_right_handed(EPS));
    }

    #[test]
    fn test_hand_direction_origin_is_wrist() {
        let (stabilizer, keypoints) = square_palm();
        let offset = Vector3::new(0.5, -2.0, 3.0);
        let moved = KeypointSet::new(keypoints.points().iter().map(|p| p + offset).collect());

        let frame = stabilizer.hand_direction_frame(&moved).unwrap();
        assert!((frame.origin - offset).norm() < EPS);
    }

    #[test]
    fn test_both_sides_match() {
        let (right, keypoints) = square_palm();
        let left = FrameStabilizer::new(HandSide::Left, right.indices());
        assert_eq!(
            right.hand_direction_frame(&keypoints).unwrap(),
            left.hand_direction_frame(&keypoints).unwrap()
        );
    }

    #[test]
    fn test_collinear_knuckles_are_degenerate() {
        let (stabilizer, _) = square_palm();
        let line = KeypointSet::from_rows(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [3.0, 0.0, 0.0],
        ]);
        assert!(matches!(
            stabilizer.rotation_frame(&line),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_missing_landmark_is_malformed() {
        let (stabilizer, _) = square_palm();
        let short = KeypointSet::from_rows(&[[0.0; 3], [1.0, 0.0, 0.0]]);
        assert!(matches!(
            stabilizer.hand_direction_frame(&short),
            Err(Error::MalformedFrame(_))
        ));
    }
}
