//! Constants used throughout the application

/// Number of keypoints in an Oculus hand skeleton
pub const OCULUS_NUM_KEYPOINTS: usize = 24;

/// Knuckle landmark indices in the Oculus skeleton (index, middle, ring, pinky)
pub const OCULUS_KNUCKLES: [usize; 4] = [6, 9, 12, 16];

/// The wrist is always the first keypoint
pub const WRIST_INDEX: usize = 0;

/// Default moving average window size
pub const DEFAULT_MOVING_AVERAGE_LIMIT: usize = 5;

/// Default number of logged frames between auto-saves
pub const DEFAULT_AUTO_SAVE_INTERVAL: usize = 100;

/// Default streaming frequency of the VR input
pub const DEFAULT_VR_FREQUENCY_HZ: f64 = 60.0;

/// Default keypoint log directory
pub const DEFAULT_LOG_DIR: &str = "data/keypoint_logs";

/// Default transport endpoints
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_KEYPOINT_SUB_PORT: u16 = 8087;
pub const DEFAULT_KEYPOINT_TRANSFORM_PUB_PORT: u16 = 8089;

/// Topic suffixes, prefixed with the hand side
pub const TRANSFORMED_HAND_COORDS: &str = "transformed_hand_coords";
pub const TRANSFORMED_HAND_FRAME: &str = "transformed_hand_frame";

/// Vectors shorter than this cannot be normalized
pub const DEGENERATE_NORM_EPSILON: f64 = 1e-9;

/// Rotation frames with a smaller determinant are treated as singular
pub const SINGULAR_DETERMINANT_EPSILON: f64 = 1e-9;

/// Seconds between loop throughput reports
pub const STATS_INTERVAL_SECS: u64 = 10;

/// Largest UDP datagram we accept
pub const MAX_DATAGRAM_SIZE: usize = 65_507;
