//! Hand keypoint stabilizer for streaming VR hand tracking into teleoperation.

use anyhow::{Context, Result};
use clap::Parser;
use hand_keypoint_stabilizer::{
    app::HandTransformApp,
    config::{Config, EXAMPLE_CONFIG},
    types::HandSide,
};
use log::info;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Hand to process (left, right)
    #[arg(long)]
    hand: Option<HandSide>,

    /// Host for subscription and publication
    #[arg(long)]
    host: Option<String>,

    /// Port raw keypoints arrive on
    #[arg(long)]
    sub_port: Option<u16>,

    /// Port transformed keypoints are published to
    #[arg(long)]
    pub_port: Option<u16>,

    /// Moving average window size
    #[arg(short, long)]
    window: Option<usize>,

    /// Loop frequency in Hz
    #[arg(short, long)]
    frequency: Option<f64>,

    /// Record smoothed frames to JSON
    #[arg(long)]
    log: bool,

    /// Directory for keypoint logs
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Frames between keypoint log saves
    #[arg(long)]
    auto_save_interval: Option<usize>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_example_config: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(hand) = self.hand {
            config.hand.side = hand;
        }
        if let Some(host) = &self.host {
            config.network.host.clone_from(host);
        }
        if let Some(port) = self.sub_port {
            config.network.keypoint_sub_port = port;
        }
        if let Some(port) = self.pub_port {
            config.network.keypoint_transform_pub_port = port;
        }
        if let Some(window) = self.window {
            config.smoothing.moving_average_limit = window;
        }
        if let Some(frequency) = self.frequency {
            config.timing.frequency_hz = frequency;
        }
        if self.log {
            config.logging.enabled = true;
        }
        if let Some(dir) = &self.log_dir {
            config.logging.log_dir.clone_from(dir);
        }
        if let Some(interval) = self.auto_save_interval {
            config.logging.auto_save_interval = interval;
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_example_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Hand Keypoint Stabilizer");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config file {}", config_path.display()))?
    } else {
        Config::default()
    };
    args.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
        })
        .context("Failed to install termination handler")?;
    }

    // Create and run application
    let mut app = HandTransformApp::from_config(config)?;
    app.run(&running);

    Ok(())
}
