//! Hand keypoint stabilization for VR teleoperation.
//!
//! This library turns raw 3D hand landmarks streamed from a VR headset into
//! a stable, hand-local representation for downstream motion controllers:
//! - Palm frames built from the wrist and three knuckles
//! - Gram-Schmidt re-orthogonalization that keeps frames right-handed
//! - Rotation of every keypoint into the palm frame
//! - Moving-average smoothing of keypoints and frames
//!
//! The pipeline runs once per tick of a fixed-rate loop:
//! 1. Acquire a keypoint frame from the subscriber
//! 2. Translate to the wrist and rotate into the palm frame
//! 3. Smooth keypoints and hand frame over the last K ticks
//! 4. Re-orthogonalize the smoothed frame
//! 5. Publish and optionally log the result
//!
//! # Examples
//!
//! ## Transforming a single frame
//!
//! ```
//! use hand_keypoint_stabilizer::{
//!     frame_stabilizer::{FrameStabilizer, KnuckleIndices},
//!     rotation::RotationTransformer,
//!     types::{HandSide, KeypointSet},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let indices = KnuckleIndices { wrist: 0, index: 1, middle: 2, pinky: 3 };
//! let transformer = RotationTransformer::new(FrameStabilizer::new(HandSide::Right, indices), 4);
//!
//! let keypoints = KeypointSet::from_rows(&[
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [1.0, 1.0, 0.0],
//!     [0.0, 1.0, 0.0],
//! ]);
//! let output = transformer.transform(&keypoints)?;
//! assert!(output.hand_frame.basis.is_orthonormal(1e-9));
//! # Ok(())
//! # }
//! ```
//!
//! ## Running the loop
//!
//! ```no_run
//! use hand_keypoint_stabilizer::{app::HandTransformApp, config::Config};
//! use std::sync::atomic::AtomicBool;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut app = HandTransformApp::from_config(Config::default())?;
//! let running = AtomicBool::new(true);
//! app.run(&running);
//! # Ok(())
//! # }
//! ```

/// Gram-Schmidt basis reconstruction
pub mod orthogonalize;

/// Palm frames from wrist and knuckle landmarks
pub mod frame_stabilizer;

/// Wrist-relative rotation into the palm frame
pub mod rotation;

/// Moving-average smoothing of keypoints and frames
pub mod filters;

/// Keypoint subscription and record publication
pub mod transport;

/// JSON logging of smoothed frames
pub mod keypoint_logger;

/// Fixed-rate loop pacing
pub mod timer;

/// Keypoint sets, frames and records
pub mod types;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
