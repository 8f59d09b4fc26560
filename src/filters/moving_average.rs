use std::collections::VecDeque;

use super::WindowSample;
use crate::{Error, Result};
use nalgebra::Vector3;

/// Moving average over the last `window_size` samples
#[derive(Debug, Clone)]
pub struct MovingAverageWindow<T> {
    window_size: usize,
    buffer: VecDeque<T>,
}

impl<T: WindowSample> MovingAverageWindow<T> {
    /// # Panics
    ///
    /// Panics if `window_size` is zero; configuration validation rejects it first
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "Window size must be greater than 0");
        Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size),
        }
    }

    /// Push `sample`, evicting the oldest once full, and return the window mean
    ///
    /// # Errors
    ///
    /// Returns `MalformedFrame` without touching the window if `sample` has a
    /// different shape than the samples already held
    pub fn apply(&mut self, sample: T) -> Result<T> {
        if let Some(front) = self.buffer.front() {
            if front.vector_count() != sample.vector_count() {
                return Err(Error::MalformedFrame(format!(
                    "sample has {} vectors, window holds samples of {}",
                    sample.vector_count(),
                    front.vector_count()
                )));
            }
        }

        if self.buffer.len() >= self.window_size {
            self.buffer.pop_front();
        }
        self.buffer.push_back(sample);

        self.mean()
    }

    /// Elementwise arithmetic mean of the current window
    ///
    /// # Errors
    ///
    /// Returns `MalformedFrame` if the window is empty
    pub fn mean(&self) -> Result<T> {
        let first = self
            .buffer
            .front()
            .ok_or_else(|| Error::MalformedFrame("cannot average an empty window".to_string()))?;

        let mut sum = vec![Vector3::zeros(); first.vector_count()];
        for sample in &self.buffer {
            for (acc, v) in sum.iter_mut().zip(sample.to_vectors()) {
                *acc += v;
            }
        }

        let count = self.buffer.len() as f64;
        T::from_vectors(sum.into_iter().map(|v| v / count).collect())
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.window_size
    }

    /// Held samples, oldest first
    pub fn samples(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }
}
