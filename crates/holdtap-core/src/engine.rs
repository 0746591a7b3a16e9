use crate::config::Config;
use crate::deferred::{DeferredEffect, DeferredQueue, EffectKind};
use crate::error::ConfigError;
use crate::keymap::{ActionResolver, LayerState};
use crate::report::{Report, ReportSink, Reporter};
use crate::tap_hold::{Resolution, TapHoldKey, TAP_HOLD_SLOTS};
use crate::types::{Action, Binding, KeyEdge, KeyEvent, KeyPos};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Upper bound on simultaneously held single-action keys.
const HELD_SLOTS: usize = 32;

/// A single-action key that is down, with the action it pressed.
#[derive(Debug, Clone, Copy)]
struct HeldKey {
    pos: KeyPos,
    action: Action,
}

/// Tap-hold resolution engine, driven once per scan tick.
///
/// Ticks must keep arriving while a key is waiting: resolution as hold only
/// happens inside [`Engine::on_tick`]. [`Engine::next_deadline`] tells the
/// driver when the next expiry is due.
pub struct Engine<R, S> {
    config: Config,
    term: Duration,
    resolver: R,
    reporter: Reporter<S>,
    layers: LayerState,
    tap_holds: Vec<TapHoldKey>,
    held: Vec<HeldKey>,
    deferred: DeferredQueue,
    next_seq: u64,
}

impl<R: ActionResolver, S: ReportSink> Engine<R, S> {
    /// Fails when the config does not validate; a zero tapping term would
    /// make every tap-hold key expire on the tick it was pressed in.
    pub fn new(config: Config, resolver: R, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let term = config.tapping_term();
        Ok(Self {
            config,
            term,
            resolver,
            reporter: Reporter::new(sink),
            layers: LayerState::default(),
            tap_holds: Vec::with_capacity(TAP_HOLD_SLOTS),
            held: Vec::with_capacity(HELD_SLOTS),
            deferred: DeferredQueue::default(),
            next_seq: 0,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layers(&self) -> LayerState {
        self.layers
    }

    pub fn pending_report(&self) -> &Report {
        self.reporter.pending()
    }

    pub fn sink(&self) -> &S {
        self.reporter.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.reporter.sink_mut()
    }

    pub fn tap_hold_keys(&self) -> &[TapHoldKey] {
        &self.tap_holds
    }

    pub fn deferred(&self) -> &DeferredQueue {
        &self.deferred
    }

    /// No key held, nothing waiting, nothing deferred.
    pub fn is_idle(&self) -> bool {
        self.tap_holds.is_empty() && self.held.is_empty() && self.deferred.is_empty()
    }

    /// Earliest instant at which a waiting key resolves as hold.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tap_holds
            .iter()
            .filter(|k| k.is_waiting())
            .map(|k| k.deadline(self.term))
            .min()
    }

    /// Processes one scan tick. Events are handled in the order given.
    pub fn on_tick(&mut self, now: Instant, events: &[KeyEvent]) {
        self.expire(now);
        self.reporter.commit();

        for event in events {
            match event.edge {
                KeyEdge::Down => self.on_press(event.pos, now),
                KeyEdge::Up => self.on_release(event.pos),
            }
        }

        self.expire(now);
        self.reporter.commit();
    }

    fn on_press(&mut self, pos: KeyPos, now: Instant) {
        if self.is_down(pos) {
            trace!("Duplicate press at {} ignored", pos);
            return;
        }

        let (layer, binding) = self.layers.lookup(&self.resolver, pos);
        match binding {
            Binding::TapHold { tap, hold } => {
                if self.tap_holds.len() >= TAP_HOLD_SLOTS {
                    warn!("No free tap-hold slot, press at {} ignored", pos);
                    return;
                }
                let seq = self.bump_seq();
                debug!(
                    "Tap-hold {} waiting (layer {}, tap {}, hold {}, seq {})",
                    pos, layer, tap, hold, seq
                );
                self.tap_holds
                    .push(TapHoldKey::press(pos, layer, tap, hold, now, seq));
            }
            Binding::Press(action) => {
                if self.held.len() >= HELD_SLOTS {
                    warn!("Too many keys held, press at {} ignored", pos);
                    return;
                }
                trace!("Press {} -> {} (layer {})", pos, action, layer);
                self.held.push(HeldKey { pos, action });
                // A quick re-press must not overtake its own deferred release.
                if action.is_stateful() && self.deferred.contains(pos) {
                    self.defer(pos, action, true);
                } else {
                    self.apply(action, true);
                }
            }
            Binding::None | Binding::Transparent => {
                trace!("Press at {} has no binding", pos);
            }
        }
    }

    fn on_release(&mut self, pos: KeyPos) {
        if let Some(idx) = self.tap_holds.iter().position(|k| k.pos == pos) {
            self.release_tap_hold(idx);
            return;
        }

        let Some(idx) = self.held.iter().position(|k| k.pos == pos) else {
            trace!("Release at {} without press ignored", pos);
            return;
        };
        let held = self.held.remove(idx);
        self.release_action(held.pos, held.action);
    }

    fn release_tap_hold(&mut self, idx: usize) {
        let resolution = self.tap_holds[idx].on_release();
        let (pos, layer) = (self.tap_holds[idx].pos, self.tap_holds[idx].layer);
        match resolution {
            Resolution::Tap(tap) => {
                debug!("Tap-hold {} resolved as tap {} (layer {})", pos, tap, layer);
                self.apply(tap, true);
                self.reporter.commit();
                // Deferred effects land while the tap is still down.
                self.flush_deferred();
                self.reporter.commit();
                self.apply(tap, false);
                self.reporter.commit();
                self.tap_holds[idx].finish_tap();
                self.tap_holds.remove(idx);
            }
            Resolution::HoldRelease(hold) => {
                debug!("Tap-hold {} hold {} released (layer {})", pos, hold, layer);
                self.tap_holds.remove(idx);
                self.release_action(pos, hold);
            }
            Resolution::Hold(_) | Resolution::Ignored => {}
        }
    }

    /// Resolves every waiting key whose term has elapsed, oldest first.
    fn expire(&mut self, now: Instant) {
        for idx in 0..self.tap_holds.len() {
            if let Resolution::Hold(hold) = self.tap_holds[idx].on_tick(now, self.term) {
                let key = &self.tap_holds[idx];
                debug!("Tap-hold {} resolved as hold {} (layer {})", key.pos, hold, key.layer);
                self.flush_deferred();
                self.apply(hold, true);
            }
        }
    }

    fn release_action(&mut self, pos: KeyPos, action: Action) {
        let defer = action.is_stateful() && (self.any_waiting() || self.deferred.contains(pos));
        if defer {
            self.defer(pos, action, false);
        } else {
            self.apply(action, false);
        }
    }

    fn defer(&mut self, pos: KeyPos, action: Action, down: bool) {
        let Some(kind) = EffectKind::from_action(action, down) else {
            self.apply(action, down);
            return;
        };
        let seq = self.bump_seq();
        let barrier = self.newest_waiting_seq().unwrap_or(seq);
        let effect = DeferredEffect {
            seq,
            barrier,
            pos,
            kind,
        };
        debug!("Deferring {:?} from {} (seq {}, barrier {})", kind, pos, seq, barrier);
        if let Err(effect) = self.deferred.enqueue(effect) {
            warn!("Deferred queue full, applying {:?} immediately", effect.kind);
            self.apply(action, down);
        }
    }

    /// Replays every deferred effect that no longer waits on an unresolved key.
    fn flush_deferred(&mut self) {
        let oldest = self.oldest_waiting_seq();
        while let Some(effect) = self.deferred.pop_ready(oldest) {
            debug!("Replaying deferred {:?} from {}", effect.kind, effect.pos);
            let (action, down) = effect.kind.action();
            self.apply(action, down);
        }
    }

    fn apply(&mut self, action: Action, down: bool) {
        match action {
            Action::Key(code) => self.reporter.apply(code, down),
            Action::Modifier(m) => self.reporter.apply(m.keycode(), down),
            Action::Layer(layer) if down => self.layers.on(layer),
            Action::Layer(layer) => self.layers.off(layer),
        }
    }

    fn is_down(&self, pos: KeyPos) -> bool {
        self.tap_holds.iter().any(|k| k.pos == pos) || self.held.iter().any(|k| k.pos == pos)
    }

    fn any_waiting(&self) -> bool {
        self.tap_holds.iter().any(TapHoldKey::is_waiting)
    }

    fn oldest_waiting_seq(&self) -> Option<u64> {
        self.tap_holds
            .iter()
            .filter(|k| k.is_waiting())
            .map(|k| k.seq)
            .min()
    }

    fn newest_waiting_seq(&self) -> Option<u64> {
        self.tap_holds
            .iter()
            .filter(|k| k.is_waiting())
            .map(|k| k.seq)
            .max()
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}
