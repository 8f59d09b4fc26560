use super::MovingAverageWindow;
use crate::{
    types::{CoordinateFrame, KeypointSet},
    Result,
};

/// Keypoint and frame windows advanced together, one sample per tick.
///
/// The smoothed frame is a plain mean and is generally not orthonormal;
/// callers re-orthogonalize it before use.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    keypoints: MovingAverageWindow<KeypointSet>,
    frames: MovingAverageWindow<CoordinateFrame>,
}

impl TemporalSmoother {
    #[must_use]
    pub fn new(moving_average_limit: usize) -> Self {
        Self {
            keypoints: MovingAverageWindow::new(moving_average_limit),
            frames: MovingAverageWindow::new(moving_average_limit),
        }
    }

    /// Add one tick's keypoints and frame, returning both window means
    ///
    /// # Errors
    ///
    /// Returns `MalformedFrame` if the keypoint count changed since the
    /// previous sample; neither window is modified in that case
    pub fn apply(
        &mut self,
        keypoints: KeypointSet,
        frame: CoordinateFrame,
    ) -> Result<(KeypointSet, CoordinateFrame)> {
        let smoothed_keypoints = self.keypoints.apply(keypoints)?;
        let smoothed_frame = self.frames.apply(frame)?;
        Ok((smoothed_keypoints, smoothed_frame))
    }

    pub fn reset(&mut self) {
        self.keypoints.reset();
        self.frames.reset();
    }

    /// Number of ticks currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.keypoints.capacity()
    }

    #[must_use]
    pub fn keypoint_window(&self) -> &MovingAverageWindow<KeypointSet> {
        &self.keypoints
    }

    #[must_use]
    pub fn frame_window(&self) -> &MovingAverageWindow<CoordinateFrame> {
        &self.frames
    }
}
