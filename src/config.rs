//! Configuration management for the hand keypoint stabilizer

use crate::{
    constants::{
        DEFAULT_AUTO_SAVE_INTERVAL, DEFAULT_HOST, DEFAULT_KEYPOINT_SUB_PORT,
        DEFAULT_KEYPOINT_TRANSFORM_PUB_PORT, DEFAULT_LOG_DIR, DEFAULT_MOVING_AVERAGE_LIMIT,
        DEFAULT_VR_FREQUENCY_HZ, OCULUS_KNUCKLES, OCULUS_NUM_KEYPOINTS, WRIST_INDEX,
    },
    frame_stabilizer::KnuckleIndices,
    types::HandSide,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transport endpoints
    pub network: NetworkConfig,

    /// Hand side and landmark layout
    pub hand: HandConfig,

    /// Temporal smoothing
    pub smoothing: SmoothingConfig,

    /// Keypoint log persistence
    pub logging: LoggingConfig,

    /// Loop timing
    pub timing: TimingConfig,
}

/// Where keypoints come from and where results go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Host for both subscription and publication
    pub host: String,

    /// Port the raw keypoints arrive on
    pub keypoint_sub_port: u16,

    /// Port the transformed keypoints are published to
    pub keypoint_transform_pub_port: u16,
}

/// Hand layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandConfig {
    /// Which hand this instance processes
    pub side: HandSide,

    /// Keypoints per frame
    pub num_keypoints: usize,

    /// Knuckle indices ordered index finger first, pinky last
    pub knuckles: Vec<usize>,
}

/// Smoothing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of frames in the moving average
    pub moving_average_limit: usize,
}

/// Keypoint logger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Record smoothed frames to JSON
    pub enabled: bool,

    /// Directory for log files
    pub log_dir: PathBuf,

    /// Frames between auto-saves
    pub auto_save_interval: usize,
}

/// Loop timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Target tick rate in Hz
    pub frequency_hz: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            keypoint_sub_port: DEFAULT_KEYPOINT_SUB_PORT,
            keypoint_transform_pub_port: DEFAULT_KEYPOINT_TRANSFORM_PUB_PORT,
        }
    }
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            side: HandSide::Right,
            num_keypoints: OCULUS_NUM_KEYPOINTS,
            knuckles: OCULUS_KNUCKLES.to_vec(),
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            moving_average_limit: DEFAULT_MOVING_AVERAGE_LIMIT,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            auto_save_interval: DEFAULT_AUTO_SAVE_INTERVAL,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_VR_FREQUENCY_HZ,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Config` if it does not parse
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `Config` if the text does not parse
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns `Config` on serialization failure and `Io` on write failure
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Landmark indices used for the palm frames
    ///
    /// # Errors
    ///
    /// Returns `Config` if fewer than two knuckles are configured
    pub fn knuckle_indices(&self) -> Result<KnuckleIndices> {
        KnuckleIndices::from_knuckles(&self.hand.knuckles)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `Config` describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if self.smoothing.moving_average_limit == 0 {
            return Err(Error::Config(
                "Moving average limit must be greater than 0".to_string(),
            ));
        }
        if self.logging.auto_save_interval == 0 {
            return Err(Error::Config(
                "Auto-save interval must be greater than 0".to_string(),
            ));
        }
        if !self.timing.frequency_hz.is_finite() || self.timing.frequency_hz <= 0.0 {
            return Err(Error::Config(format!(
                "Frequency must be a positive number of Hz, got {}",
                self.timing.frequency_hz
            )));
        }
        if self.network.host.trim().is_empty() {
            return Err(Error::Config("Host must not be empty".to_string()));
        }

        // Wrist plus three knuckles
        if self.hand.num_keypoints < 4 {
            return Err(Error::Config(format!(
                "At least 4 keypoints are required, got {}",
                self.hand.num_keypoints
            )));
        }
        let indices = self.knuckle_indices()?;
        if indices.max_index() >= self.hand.num_keypoints {
            return Err(Error::Config(format!(
                "Knuckle index {} out of range for {} keypoints",
                indices.max_index(),
                self.hand.num_keypoints
            )));
        }
        if self.hand.knuckles.contains(&WRIST_INDEX) {
            return Err(Error::Config(format!(
                "Knuckle indices must not include the wrist ({WRIST_INDEX})"
            )));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Hand Keypoint Stabilizer Configuration

# Transport endpoints
network:
  host: "127.0.0.1"
  keypoint_sub_port: 8087
  keypoint_transform_pub_port: 8089

# Hand layout (Oculus skeleton)
hand:
  side: right
  num_keypoints: 24
  knuckles: [6, 9, 12, 16]

# Temporal smoothing
smoothing:
  moving_average_limit: 5

# Keypoint logging
logging:
  enabled: false
  log_dir: "data/keypoint_logs"
  auto_save_interval: 100

# Loop timing
timing:
  frequency_hz: 60.0
"#;
