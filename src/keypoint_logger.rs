//! Recording of smoothed keypoints and hand frames to JSON.
//!
//! Frames are buffered in memory and written out every `auto_save_interval`
//! frames. Each save drains the buffer into its own numbered document, so
//! the buffer never holds more than one interval of frames. The owner
//! calls [`FrameLogger::flush`] on shutdown; dropping the logger flushes too.

use crate::{
    timer::wall_clock_seconds,
    types::{CoordinateFrame, HandSide, KeypointSet},
    Error, Result,
};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination for smoothed frames
pub trait FrameLogger {
    /// Record one frame
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if a triggered auto-save fails
    fn log_frame(&mut self, keypoints: &KeypointSet, frame: &CoordinateFrame) -> Result<()>;

    /// Write out everything buffered
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the write fails
    fn flush(&mut self) -> Result<()>;
}

/// Frame axes as stored in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedCoordinateFrame {
    pub origin: [f64; 3],
    pub x_vector: [f64; 3],
    pub y_vector: [f64; 3],
    pub z_vector: [f64; 3],
}

impl From<&CoordinateFrame> for LoggedCoordinateFrame {
    fn from(frame: &CoordinateFrame) -> Self {
        let [origin, x_vector, y_vector, z_vector] = frame.to_rows();
        Self {
            origin,
            x_vector,
            y_vector,
            z_vector,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedFrame {
    pub frame_id: u64,
    pub timestamp: f64,
    pub keypoints: Vec<[f64; 3]>,
    pub coordinate_frame: LoggedCoordinateFrame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMetadata {
    pub save_timestamp: String,
    pub moving_average_limit: usize,
}

/// One saved log document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointLog {
    pub hand_side: HandSide,
    pub total_frames: usize,
    pub frames: Vec<LoggedFrame>,
    pub metadata: LogMetadata,
}

impl KeypointLog {
    /// Read a saved document back
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Json` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// JSON keypoint logger for one hand
pub struct KeypointLogger {
    hand_side: HandSide,
    log_dir: PathBuf,
    file_stem: String,
    auto_save_interval: usize,
    moving_average_limit: usize,
    frame_counter: u64,
    buffer: Vec<LoggedFrame>,
    saved_files: Vec<PathBuf>,
}

impl KeypointLogger {
    /// Create the log directory and pick a timestamped file name
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the directory cannot be created, `Config`
    /// if `auto_save_interval` is zero
    pub fn new<P: AsRef<Path>>(
        hand_side: HandSide,
        log_dir: P,
        auto_save_interval: usize,
        moving_average_limit: usize,
    ) -> Result<Self> {
        if auto_save_interval == 0 {
            return Err(Error::Config("Auto-save interval must be greater than 0".to_string()));
        }

        let log_dir = log_dir.as_ref().to_path_buf();
        fs::create_dir_all(&log_dir).map_err(|e| {
            Error::Persistence(format!("Failed to create log directory {}: {e}", log_dir.display()))
        })?;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let file_stem = format!("keypoints_{}_{}", hand_side, timestamp);

        info!(
            "Logging enabled for {} hand. Data will be saved to: {}",
            hand_side,
            log_dir.join(format!("{file_stem}_*.json")).display()
        );

        Ok(Self {
            hand_side,
            log_dir,
            file_stem,
            auto_save_interval,
            moving_average_limit,
            frame_counter: 0,
            buffer: Vec::with_capacity(auto_save_interval),
            saved_files: Vec::new(),
        })
    }

    /// Total frames logged since creation
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    /// Frames waiting for the next save
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Documents written so far, oldest first
    #[must_use]
    pub fn saved_files(&self) -> &[PathBuf] {
        &self.saved_files
    }

    fn next_path(&self) -> PathBuf {
        self.log_dir
            .join(format!("{}_{:03}.json", self.file_stem, self.saved_files.len()))
    }

    /// Drain the buffer into a new document. Frames are dropped from memory
    /// even if the write fails.
    fn save_data(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let frames = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.auto_save_interval));
        let log = KeypointLog {
            hand_side: self.hand_side,
            total_frames: frames.len(),
            frames,
            metadata: LogMetadata {
                save_timestamp: chrono::Local::now().to_rfc3339(),
                moving_average_limit: self.moving_average_limit,
            },
        };

        let path = self.next_path();
        write_json(&path, &log).map_err(|e| {
            Error::Persistence(format!(
                "Failed to save {} frames to {}: {e}",
                log.total_frames,
                path.display()
            ))
        })?;

        info!("Saved {} frames to {}", log.total_frames, path.display());
        self.saved_files.push(path);
        Ok(())
    }
}

fn write_json(path: &Path, log: &KeypointLog) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, log)?;
    writer.flush()?;
    Ok(())
}

impl FrameLogger for KeypointLogger {
    fn log_frame(&mut self, keypoints: &KeypointSet, frame: &CoordinateFrame) -> Result<()> {
        self.buffer.push(LoggedFrame {
            frame_id: self.frame_counter,
            timestamp: wall_clock_seconds(),
            keypoints: keypoints.to_rows(),
            coordinate_frame: LoggedCoordinateFrame::from(frame),
        });
        self.frame_counter += 1;

        if self.frame_counter % self.auto_save_interval as u64 == 0 {
            self.save_data()?;
            debug!("Auto-saved at frame {}", self.frame_counter);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.save_data()
    }
}

impl Drop for KeypointLogger {
    fn drop(&mut self) {
        if let Err(e) = self.save_data() {
            error!("Error saving logged data: {}", e);
        }
    }
}
