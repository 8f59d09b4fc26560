//! Fixed-rate streaming loop for one hand.
//!
//! Every tick acquires a raw keypoint frame, rotates it into the palm frame,
//! smooths keypoints and hand frame over the moving-average window,
//! re-orthogonalizes the smoothed frame and publishes the result. Bad input
//! only costs the tick it arrived on.

use crate::{
    config::Config,
    constants::STATS_INTERVAL_SECS,
    error::Result,
    filters::TemporalSmoother,
    frame_stabilizer::FrameStabilizer,
    keypoint_logger::{FrameLogger, KeypointLogger},
    orthogonalize::reorthogonalize,
    rotation::RotationTransformer,
    timer::{wall_clock_seconds, FrequencyTimer},
    transport::{FrameAcquirer, Publisher, UdpKeypointSubscriber, UdpPublisher},
    types::{CoordinateFrame, HandSide, InputFrame, OutputRecord},
};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing was acquired
    NoData,
    /// Input was acquired but rejected
    Skipped,
    /// A record was built and handed to the publisher
    Published(Box<OutputRecord>),
}

/// Tick counters, reported periodically
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub published: u64,
    pub skipped: u64,
    pub empty: u64,
    pub publish_failures: u64,
    pub log_failures: u64,
}

impl LoopStats {
    fn record(&mut self, outcome: &TickOutcome) {
        self.ticks += 1;
        match outcome {
            TickOutcome::NoData => self.empty += 1,
            TickOutcome::Skipped => self.skipped += 1,
            TickOutcome::Published(_) => self.published += 1,
        }
    }
}

/// Streaming loop controller for one hand side
pub struct HandTransformApp {
    config: Config,
    hand_side: HandSide,
    coords_topic: String,
    frame_topic: String,
    acquirer: Box<dyn FrameAcquirer>,
    publisher: Box<dyn Publisher>,
    logger: Option<Box<dyn FrameLogger>>,
    transformer: RotationTransformer,
    smoother: TemporalSmoother,
    timer: FrequencyTimer,
    stats: LoopStats,
    shut_down: bool,
}

impl HandTransformApp {
    /// Assemble the loop from explicit collaborators
    ///
    /// # Errors
    ///
    /// Returns `Config` if the configuration is invalid
    pub fn new(
        config: Config,
        acquirer: Box<dyn FrameAcquirer>,
        publisher: Box<dyn Publisher>,
        logger: Option<Box<dyn FrameLogger>>,
    ) -> Result<Self> {
        config.validate()?;

        let hand_side = config.hand.side;
        info!("Starting component: {}", hand_side.component_name());

        let stabilizer = FrameStabilizer::new(hand_side, config.knuckle_indices()?);
        let transformer = RotationTransformer::new(stabilizer, config.hand.num_keypoints);
        let smoother = TemporalSmoother::new(config.smoothing.moving_average_limit);
        let timer = FrequencyTimer::new(config.timing.frequency_hz)?;

        Ok(Self {
            coords_topic: hand_side.coords_topic(),
            frame_topic: hand_side.frame_topic(),
            config,
            hand_side,
            acquirer,
            publisher,
            logger,
            transformer,
            smoother,
            timer,
            stats: LoopStats::default(),
            shut_down: false,
        })
    }

    /// Build the loop with the UDP transport and, if enabled, the JSON logger
    ///
    /// # Errors
    ///
    /// Returns `Config` for invalid configuration, `Transport` if sockets
    /// cannot be bound and `Persistence` if the log directory is unusable
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;

        let period = FrequencyTimer::new(config.timing.frequency_hz)?.period();
        let acquirer = UdpKeypointSubscriber::bind(
            &config.network.host,
            config.network.keypoint_sub_port,
            config.hand.side.as_str(),
            period,
        )?;
        let publisher = UdpPublisher::new()?;

        let logger: Option<Box<dyn FrameLogger>> = if config.logging.enabled {
            Some(Box::new(KeypointLogger::new(
                config.hand.side,
                &config.logging.log_dir,
                config.logging.auto_save_interval,
                config.smoothing.moving_average_limit,
            )?))
        } else {
            None
        };

        Self::new(config, Box::new(acquirer), Box::new(publisher), logger)
    }

    #[must_use]
    pub fn hand_side(&self) -> HandSide {
        self.hand_side
    }

    #[must_use]
    pub fn smoother(&self) -> &TemporalSmoother {
        &self.smoother
    }

    #[must_use]
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Transform, smooth and re-orthogonalize one acquired frame
    ///
    /// # Errors
    ///
    /// `MalformedFrame` or `DegenerateGeometry`; the smoothing windows are only
    /// touched once the transform has succeeded
    pub fn process_frame(&mut self, input: &InputFrame) -> Result<OutputRecord> {
        let keypoints = input.to_keypoint_set(self.transformer.num_keypoints())?;
        let transformed = self.transformer.transform(&keypoints)?;

        let (smoothed_keypoints, smoothed_frame) = self
            .smoother
            .apply(transformed.keypoints, transformed.hand_frame)?;

        let basis = reorthogonalize(&smoothed_frame.basis)?;
        let frame = CoordinateFrame::new(smoothed_frame.origin, basis);

        Ok(OutputRecord {
            timestamp_s: wall_clock_seconds(),
            hand_side: self.hand_side,
            keypoints: smoothed_keypoints,
            is_relative: input.mode().is_relative(),
            frame_vectors: frame,
        })
    }

    /// One pass of acquire → transform → smooth → publish → log
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.run_tick();
        self.stats.record(&outcome);
        outcome
    }

    fn run_tick(&mut self) -> TickOutcome {
        let input = match self.acquirer.receive() {
            Ok(Some(input)) => input,
            Ok(None) => return TickOutcome::NoData,
            Err(e) => {
                warn!("Keypoint acquisition failed: {}", e);
                return TickOutcome::Skipped;
            }
        };

        let record = match self.process_frame(&input) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping {} hand frame: {}", self.hand_side, e);
                return TickOutcome::Skipped;
            }
        };

        self.publish(&record);
        self.log_frame(&record);
        debug!("Published {} hand frame", self.hand_side);

        TickOutcome::Published(Box::new(record))
    }

    fn publish(&mut self, record: &OutputRecord) {
        let host = &self.config.network.host;
        let port = self.config.network.keypoint_transform_pub_port;

        // The frame topic is a legacy alias of the coords topic, kept for
        // consumers that have not moved over yet.
        for topic in [&self.coords_topic, &self.frame_topic] {
            if let Err(e) = self.publisher.publish(host, port, topic, record) {
                self.stats.publish_failures += 1;
                warn!("Publish to '{}' failed: {}", topic, e);
            }
        }
    }

    fn log_frame(&mut self, record: &OutputRecord) {
        if let Some(logger) = &mut self.logger {
            if let Err(e) = logger.log_frame(&record.keypoints, &record.frame_vectors) {
                self.stats.log_failures += 1;
                error!("Keypoint logging failed: {}", e);
            }
        }
    }

    /// Tick at the configured frequency until `running` is cleared, then shut down
    pub fn run(&mut self, running: &AtomicBool) {
        info!(
            "Streaming {} hand at {} Hz (moving average over {} frames)",
            self.hand_side, self.config.timing.frequency_hz, self.config.smoothing.moving_average_limit
        );

        let mut last_report = Instant::now();
        while running.load(Ordering::SeqCst) {
            self.timer.start_loop();
            self.tick();

            if last_report.elapsed() >= Duration::from_secs(STATS_INTERVAL_SECS) {
                let s = self.stats;
                info!(
                    "{} hand: {} ticks, {} published, {} skipped, {} empty, {} publish failures",
                    self.hand_side, s.ticks, s.published, s.skipped, s.empty, s.publish_failures
                );
                last_report = Instant::now();
            }

            self.timer.end_loop();
        }

        info!("Stream for {} hand stopping", self.hand_side);
        self.shutdown();
    }

    /// Flush the logger and release the acquirer. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        if let Some(logger) = &mut self.logger {
            info!("Saving final logged data...");
            if let Err(e) = logger.flush() {
                error!("Error saving logged data: {}", e);
            }
        }
        self.acquirer.release();
        info!("{} shut down", self.hand_side.component_name());
    }
}

impl Drop for HandTransformApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}
