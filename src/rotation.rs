//! Wrist-relative rotation of hand keypoints into the stabilized palm frame.

use crate::{
    constants::SINGULAR_DETERMINANT_EPSILON,
    frame_stabilizer::FrameStabilizer,
    types::{Basis, CoordinateFrame, KeypointSet},
    Error, Result,
};
use log::debug;
use nalgebra::Matrix3;

/// Keypoints in the palm frame plus the hand-direction frame in tracking space
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub keypoints: KeypointSet,
    pub hand_frame: CoordinateFrame,
}

/// Translates keypoints to the wrist and rotates them into palm axes
#[derive(Debug, Clone)]
pub struct RotationTransformer {
    stabilizer: FrameStabilizer,
    num_keypoints: usize,
}

impl RotationTransformer {
    #[must_use]
    pub fn new(stabilizer: FrameStabilizer, num_keypoints: usize) -> Self {
        Self {
            stabilizer,
            num_keypoints,
        }
    }

    #[must_use]
    pub fn num_keypoints(&self) -> usize {
        self.num_keypoints
    }

    /// Matrix `R` with `R · F = I` in the row-vector sense, i.e. the transpose of
    /// `F⁻¹`, where the rows of `F` are the frame axes
    ///
    /// # Errors
    ///
    /// Returns `DegenerateGeometry` if `F` is singular
    pub fn rotation_matrix(frame: &Basis) -> Result<Matrix3<f64>> {
        let frame_matrix = frame.to_row_matrix();
        let det = frame_matrix.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_DETERMINANT_EPSILON {
            return Err(Error::DegenerateGeometry(format!(
                "rotation frame is singular (det = {det:.3e})"
            )));
        }

        let inverse = frame_matrix
            .try_inverse()
            .ok_or_else(|| Error::DegenerateGeometry("rotation frame could not be inverted".to_string()))?;
        Ok(inverse.transpose())
    }

    /// Run the full transform on one raw keypoint set
    ///
    /// # Errors
    ///
    /// `MalformedFrame` if the set does not have the configured size,
    /// `DegenerateGeometry` if the palm landmarks do not span a frame
    pub fn transform(&self, keypoints: &KeypointSet) -> Result<TransformOutput> {
        keypoints.ensure_shape(self.num_keypoints)?;
        let wrist = *keypoints
            .wrist()
            .ok_or_else(|| Error::MalformedFrame("keypoint set is empty".to_string()))?;

        let translated = keypoints.translated(&wrist);
        let rotation_frame = self.stabilizer.rotation_frame(&translated)?;
        let rotation = Self::rotation_matrix(&rotation_frame)?;

        let rotated = KeypointSet::new(translated.points().iter().map(|p| rotation * p).collect());
        let hand_frame = self.stabilizer.hand_direction_frame(keypoints)?;

        debug!(
            "Transformed {} keypoints for {} hand",
            rotated.len(),
            self.stabilizer.hand_side()
        );

        Ok(TransformOutput {
            keypoints: rotated,
            hand_frame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frame_stabilizer::KnuckleIndices, types::HandSide};
    use nalgebra::Vector3;

    const EPS: f64 = 1e-12;

    fn square_palm_transformer() -> RotationTransformer {
        let indices = KnuckleIndices {
            wrist: 0,
            index: 1,
            middle: 2,
            pinky: 3,
        };
        RotationTransformer::new(FrameStabilizer::new(HandSide::Right, indices), 4)
    }

    fn square_palm(offset: Vector3<f64>) -> KeypointSet {
        KeypointSet::new(
            [
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(1.0, 1.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ]
            .iter()
            .map(|p| p + offset)
            .collect(),
        )
    }

    #[test]
    fn test_rotation_of_orthonormal_frame_is_the_frame() {
        let basis = Basis::new(Vector3::y(), -Vector3::x(), Vector3::z());
        let rotation = RotationTransformer::rotation_matrix(&basis).unwrap();
        assert!((rotation - basis.to_row_matrix()).norm() < EPS);
        assert!((rotation * Vector3::y() - Vector3::x()).norm() < EPS);
    }

    #[test]
    fn test_singular_frame_is_degenerate() {
        let flat = Basis::new(Vector3::x(), Vector3::x(), Vector3::z());
        assert!(matches!(
            RotationTransformer::rotation_matrix(&flat),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_square_palm_is_rotated_into_palm_axes() {
        let transformer = square_palm_transformer();
        let output = transformer.transform(&square_palm(Vector3::zeros())).unwrap();
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let points = output.keypoints.points();

        assert!(points[0].norm() < EPS);
        assert!((points[1] - Vector3::new(s, s, 0.0)).norm() < EPS);
        assert!((points[2] - Vector3::new(0.0, 2.0 * s, 0.0)).norm() < EPS);
        assert!((points[3] - Vector3::new(-s, s, 0.0)).norm() < EPS);
    }

    #[test]
    fn test_translation_does_not_change_rotated_keypoints() {
        let transformer = square_palm_transformer();
        let at_origin = transformer.transform(&square_palm(Vector3::zeros())).unwrap();
        let offset = Vector3::new(3.0, -1.0, 0.25);
        let shifted = transformer.transform(&square_palm(offset)).unwrap();

        for (a, b) in at_origin.keypoints.points().iter().zip(shifted.keypoints.points()) {
            assert!((a - b).norm() < 1e-9);
        }
        assert!((shifted.hand_frame.origin - offset).norm() < EPS);
    }

    #[test]
    fn test_wrong_keypoint_count_is_malformed() {
        let transformer = square_palm_transformer();
        let three = KeypointSet::from_rows(&[[0.0; 3], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
        assert!(matches!(transformer.transform(&three), Err(Error::MalformedFrame(_))));
    }

    #[test]
    fn test_coincident_landmarks_are_degenerate() {
        let transformer = square_palm_transformer();
        let collapsed = KeypointSet::from_rows(&[[0.5, 0.5, 0.5]; 4]);
        assert!(matches!(
            transformer.transform(&collapsed),
            Err(Error::DegenerateGeometry(_))
        ));
    }
}
