#![allow(dead_code)]

use holdtap_core::{Config, Engine, Keymap, RecordingSink, Report, KeyEvent, KeyPos};
use std::time::{Duration, Instant};

pub const TAPPING_TERM: u64 = 200;

/// Scan-loop stand-in: queues physical events and advances a 1 ms clock per
/// loop, recording every emitted report.
pub struct TestDriver {
    pub engine: Engine<Keymap, RecordingSink>,
    reports: RecordingSink,
    pending: Vec<KeyEvent>,
    now: Instant,
}

impl TestDriver {
    pub fn new(keymap: Keymap) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();

        let reports = RecordingSink::new();
        let config = Config::with_tapping_term_ms(TAPPING_TERM);
        Self {
            engine: Engine::new(config, keymap, reports.clone()).expect("invalid test config"),
            reports,
            pending: Vec::new(),
            now: Instant::now(),
        }
    }

    pub fn press(&mut self, pos: KeyPos) {
        self.pending.push(KeyEvent::press(pos));
    }

    pub fn release(&mut self, pos: KeyPos) {
        self.pending.push(KeyEvent::release(pos));
    }

    pub fn run_one_scan_loop(&mut self) {
        let events = std::mem::take(&mut self.pending);
        self.engine.on_tick(self.now, &events);
        self.now += Duration::from_millis(1);
    }

    pub fn idle_for(&mut self, ms: u64) {
        for _ in 0..ms {
            self.run_one_scan_loop();
        }
    }

    /// Reports emitted since the last call.
    pub fn take_reports(&mut self) -> Vec<Report> {
        self.reports.take()
    }
}
