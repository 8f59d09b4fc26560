//! Temporal smoothing of keypoints and hand frames.
//!
//! This module keeps bounded histories of recent samples and averages them
//! elementwise, reducing jitter in the streamed hand pose.

/// Bounded sliding-window mean
pub mod moving_average;

/// Paired keypoint and frame windows for one hand
pub mod temporal_smoother;

pub use moving_average::MovingAverageWindow;
pub use temporal_smoother::TemporalSmoother;

use crate::{
    types::{Basis, CoordinateFrame, KeypointSet},
    Error, Result,
};
use nalgebra::Vector3;

/// A sample that can be averaged as a fixed-length list of 3D vectors
pub trait WindowSample: Clone {
    /// Number of vectors in the sample
    fn vector_count(&self) -> usize;

    /// The vectors, in a stable order
    fn to_vectors(&self) -> Vec<Vector3<f64>>;

    /// Rebuild a sample from vectors in the order of [`Self::to_vectors`]
    ///
    /// # Errors
    ///
    /// Returns `MalformedFrame` if the vector count does not fit the type
    fn from_vectors(vectors: Vec<Vector3<f64>>) -> Result<Self>;
}

impl WindowSample for KeypointSet {
    fn vector_count(&self) -> usize {
        self.len()
    }

    fn to_vectors(&self) -> Vec<Vector3<f64>> {
        self.points().to_vec()
    }

    fn from_vectors(vectors: Vec<Vector3<f64>>) -> Result<Self> {
        Ok(Self::new(vectors))
    }
}

impl WindowSample for CoordinateFrame {
    fn vector_count(&self) -> usize {
        4
    }

    fn to_vectors(&self) -> Vec<Vector3<f64>> {
        self.vectors().to_vec()
    }

    fn from_vectors(vectors: Vec<Vector3<f64>>) -> Result<Self> {
        let vectors: [Vector3<f64>; 4] = vectors.try_into().map_err(|v: Vec<Vector3<f64>>| {
            Error::MalformedFrame(format!("a coordinate frame has 4 vectors, got {}", v.len()))
        })?;
        let [origin, x, y, z] = vectors;
        Ok(Self::new(origin, Basis::new(x, y, z)))
    }
}
