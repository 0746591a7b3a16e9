//! Effects held back while a tap-hold key is undecided.
//!
//! Releasing a modifier or a layer while a tap-hold key is still `Waiting`
//! would change what the eventual resolution ought to report, so those
//! releases are queued here and replayed in their original order once the
//! keys they were waiting on have resolved.

use crate::keycode::Modifier;
use crate::types::{Action, KeyPos, LayerId};
use std::collections::VecDeque;

/// Default number of effects that can be queued at once.
pub const DEFERRED_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    ModifierPress(Modifier),
    ModifierRelease(Modifier),
    LayerPress(LayerId),
    LayerRelease(LayerId),
}

impl EffectKind {
    /// Converts a press/release of a stateful action. Plain key codes are
    /// never deferred and yield `None`.
    pub fn from_action(action: Action, down: bool) -> Option<Self> {
        match (action, down) {
            (Action::Modifier(m), true) => Some(Self::ModifierPress(m)),
            (Action::Modifier(m), false) => Some(Self::ModifierRelease(m)),
            (Action::Layer(l), true) => Some(Self::LayerPress(l)),
            (Action::Layer(l), false) => Some(Self::LayerRelease(l)),
            (Action::Key(_), _) => None,
        }
    }

    /// The action and edge to apply when the effect is replayed.
    pub fn action(self) -> (Action, bool) {
        match self {
            Self::ModifierPress(m) => (Action::Modifier(m), true),
            Self::ModifierRelease(m) => (Action::Modifier(m), false),
            Self::LayerPress(l) => (Action::Layer(l), true),
            Self::LayerRelease(l) => (Action::Layer(l), false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredEffect {
    pub seq: u64,
    /// Sequence number of the newest waiting key when the effect was queued.
    /// The effect is ready once no waiting key with `seq <= barrier` remains.
    pub barrier: u64,
    pub pos: KeyPos,
    pub kind: EffectKind,
}

impl DeferredEffect {
    pub fn is_ready(&self, oldest_waiting: Option<u64>) -> bool {
        match oldest_waiting {
            Some(oldest) => oldest > self.barrier,
            None => true,
        }
    }
}

#[derive(Debug)]
pub struct DeferredQueue {
    effects: VecDeque<DeferredEffect>,
    capacity: usize,
}

impl Default for DeferredQueue {
    fn default() -> Self {
        Self::with_capacity(DEFERRED_CAPACITY)
    }
}

impl DeferredQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            effects: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an effect. Hands it back when the queue is full.
    pub fn enqueue(&mut self, effect: DeferredEffect) -> Result<(), DeferredEffect> {
        if self.effects.len() >= self.capacity {
            return Err(effect);
        }
        self.effects.push_back(effect);
        Ok(())
    }

    /// Removes the front effect if it is ready. Never skips over an effect
    /// that is still blocked, so replay order is strictly FIFO.
    pub fn pop_ready(&mut self, oldest_waiting: Option<u64>) -> Option<DeferredEffect> {
        if self.effects.front()?.is_ready(oldest_waiting) {
            self.effects.pop_front()
        } else {
            None
        }
    }

    pub fn contains(&self, pos: KeyPos) -> bool {
        self.effects.iter().any(|e| e.pos == pos)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
