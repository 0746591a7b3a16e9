use crate::types::{Action, KeyPos, LayerId};
use std::time::{Duration, Instant};

/// Maximum number of tap-hold keys tracked at once.
pub const TAP_HOLD_SLOTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapHoldState {
    Idle,
    /// Pressed, neither released nor past the tapping term. Never reported.
    Waiting,
    /// Released inside the term; the tap pair is being emitted.
    ResolvedTap,
    /// Term elapsed while held; the hold action is active.
    ResolvedHold,
}

/// What a state transition asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Emit the tap action as a down/up pair.
    Tap(Action),
    /// Activate the hold action.
    Hold(Action),
    /// Release the active hold action.
    HoldRelease(Action),
    Ignored,
}

/// One dual-action key. The binding is frozen at press time from the layer
/// active then, and never looked up again.
#[derive(Debug, Clone)]
pub struct TapHoldKey {
    pub pos: KeyPos,
    pub layer: LayerId,
    pub tap: Action,
    pub hold: Action,
    pub state: TapHoldState,
    pub press_time: Instant,
    pub seq: u64,
}

impl TapHoldKey {
    /// `Idle -> Waiting`.
    pub fn press(
        pos: KeyPos,
        layer: LayerId,
        tap: Action,
        hold: Action,
        now: Instant,
        seq: u64,
    ) -> Self {
        Self {
            pos,
            layer,
            tap,
            hold,
            state: TapHoldState::Waiting,
            press_time: now,
            seq,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.state == TapHoldState::Waiting
    }

    /// Reaching the term exactly counts as expired.
    pub fn term_expired(&self, now: Instant, term: Duration) -> bool {
        now.saturating_duration_since(self.press_time) >= term
    }

    pub fn deadline(&self, term: Duration) -> Instant {
        self.press_time + term
    }

    /// `Waiting -> ResolvedHold` once the term has elapsed.
    pub fn on_tick(&mut self, now: Instant, term: Duration) -> Resolution {
        if self.is_waiting() && self.term_expired(now, term) {
            self.state = TapHoldState::ResolvedHold;
            Resolution::Hold(self.hold)
        } else {
            Resolution::Ignored
        }
    }

    /// Physical release. Expiry is only decided by [`TapHoldKey::on_tick`],
    /// which the engine runs for `now` before handling any release, so a key
    /// still `Waiting` here is a tap.
    pub fn on_release(&mut self) -> Resolution {
        match self.state {
            TapHoldState::Waiting => {
                self.state = TapHoldState::ResolvedTap;
                Resolution::Tap(self.tap)
            }
            TapHoldState::ResolvedHold => {
                self.state = TapHoldState::Idle;
                Resolution::HoldRelease(self.hold)
            }
            TapHoldState::Idle | TapHoldState::ResolvedTap => Resolution::Ignored,
        }
    }

    /// `ResolvedTap -> Idle` after the tap's key-up has been emitted.
    pub fn finish_tap(&mut self) {
        if self.state == TapHoldState::ResolvedTap {
            self.state = TapHoldState::Idle;
        }
    }
}
