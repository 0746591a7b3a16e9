use crate::keycode::{KeyCode, Modifier};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

/// Number of non-modifier key slots in a boot keyboard report.
pub const REPORT_KEYS: usize = 6;

/// Snapshot of the keys visible to the host.
///
/// Keys occupy the front of `keys` in ascending order, so two reports holding
/// the same set of keys always compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Report {
    pub modifiers: u8,
    pub keys: [u8; REPORT_KEYS],
}

impl Report {
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            keys: [0; REPORT_KEYS],
        }
    }

    /// Builds a report from a list of key codes; modifier usages go to the
    /// modifier byte.
    pub fn from_codes(codes: &[KeyCode]) -> Self {
        let mut report = Self::empty();
        for code in codes {
            report.add(*code);
        }
        report
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers == 0 && self.keys[0] == 0
    }

    pub fn contains(&self, code: KeyCode) -> bool {
        match code.modifier() {
            Some(m) => self.modifiers & m.bit() != 0,
            None => code != KeyCode::NO && self.keys.contains(&code.0),
        }
    }

    pub fn add(&mut self, code: KeyCode) {
        if let Some(m) = code.modifier() {
            self.modifiers |= m.bit();
            return;
        }
        if code == KeyCode::NO || self.keys.contains(&code.0) {
            return;
        }
        let len = self.key_count();
        if len == REPORT_KEYS {
            warn!("Report full, dropping {}", code);
            return;
        }
        let at = self.keys[..len]
            .iter()
            .position(|&k| k > code.0)
            .unwrap_or(len);
        self.keys.copy_within(at..len, at + 1);
        self.keys[at] = code.0;
    }

    pub fn remove(&mut self, code: KeyCode) {
        if let Some(m) = code.modifier() {
            self.modifiers &= !m.bit();
            return;
        }
        let len = self.key_count();
        if let Some(at) = self.keys[..len].iter().position(|&k| k == code.0) {
            self.keys.copy_within(at + 1..len, at);
            self.keys[len - 1] = 0;
        }
    }

    pub fn key_count(&self) -> usize {
        self.keys.iter().take_while(|&&k| k != 0).count()
    }

    /// Every active code, modifiers first.
    pub fn codes(&self) -> impl Iterator<Item = KeyCode> + '_ {
        Modifier::iter_bits(self.modifiers)
            .map(Modifier::keycode)
            .chain(self.keys.iter().take_while(|&&k| k != 0).map(|&k| KeyCode(k)))
    }

    /// 8-byte boot protocol layout: modifiers, reserved, six keys.
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[0] = self.modifiers;
        out[2..].copy_from_slice(&self.keys);
        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, code) in self.codes().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", code)?;
        }
        f.write_str("}")
    }
}

/// Receives every report the engine emits.
pub trait ReportSink {
    fn send_report(&mut self, report: &Report);
}

impl ReportSink for Vec<Report> {
    fn send_report(&mut self, report: &Report) {
        self.push(*report);
    }
}

/// Cloneable sink whose handle can be read while the engine owns a copy.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains everything recorded so far.
    pub fn take(&self) -> Vec<Report> {
        std::mem::take(&mut *self.reports.lock())
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl ReportSink for RecordingSink {
    fn send_report(&mut self, report: &Report) {
        self.reports.lock().push(*report);
    }
}

/// Forwards reports to a transport thread.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<Report>,
}

impl ChannelSink {
    pub fn new(tx: Sender<Report>) -> Self {
        Self { tx }
    }
}

impl ReportSink for ChannelSink {
    fn send_report(&mut self, report: &Report) {
        if self.tx.send(*report).is_err() {
            warn!("Report receiver disconnected, dropping {}", report);
        }
    }
}

/// Holds the pending report and emits it to the sink when it changed since
/// the last emission.
#[derive(Debug)]
pub struct Reporter<S> {
    pending: Report,
    last_sent: Report,
    sink: S,
}

impl<S: ReportSink> Reporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            pending: Report::empty(),
            last_sent: Report::empty(),
            sink,
        }
    }

    pub fn apply(&mut self, code: KeyCode, down: bool) {
        if down {
            self.pending.add(code);
        } else {
            self.pending.remove(code);
        }
    }

    /// Returns true when a report was emitted.
    pub fn commit(&mut self) -> bool {
        if self.pending == self.last_sent {
            return false;
        }
        trace!("report {}", self.pending);
        self.sink.send_report(&self.pending);
        self.last_sent = self.pending;
        true
    }

    pub fn pending(&self) -> &Report {
        &self.pending
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
