//! Warnings emitted for rejected ticks
//!
//! Installs a process-wide logger, so this file holds a single test.


use hand_keypoint_stabilizer::{
    app::{HandTransformApp, TickOutcome},
    types::InputFrame,
};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;
use test_helpers::{four_point_config, RecordingPublisher, ScriptedAcquirer, SQUARE_PALM};

struct CapturingLogger {
    warnings: Mutex<Vec<String>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Warn {
            self.warnings.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    warnings: Mutex::new(Vec::new()),
};

#[test]
fn test_one_warning_per_rejected_tick() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Warn);

    let frames = vec![
        Some(InputFrame::from_rows(SQUARE_PALM.to_vec(), false)),
        Some(InputFrame::from_rows(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], false)),
        None,
        Some(InputFrame::from_rows(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]],
            false,
        )),
        Some(InputFrame::from_rows(SQUARE_PALM.to_vec(), false)),
    ];
    let mut app = HandTransformApp::new(
        four_point_config(5),
        Box::new(ScriptedAcquirer::new(frames)),
        Box::new(RecordingPublisher::default()),
        None,
    )
    .unwrap();

    let outcomes: Vec<TickOutcome> = (0..5).map(|_| app.tick()).collect();
    assert_eq!(outcomes[1], TickOutcome::Skipped);
    assert_eq!(outcomes[2], TickOutcome::NoData);
    assert_eq!(outcomes[3], TickOutcome::Skipped);
    drop(app);

    let warnings = LOGGER.warnings.lock().unwrap();
    assert_eq!(warnings.len(), 2, "unexpected warnings: {warnings:?}");
    assert!(warnings[0].contains("Malformed frame"));
    assert!(warnings[1].contains("Degenerate geometry"));
}
