use crate::types::{Binding, KeyPos, LayerId};
use std::collections::HashMap;

/// Number of layers addressable by [`LayerState`].
pub const MAX_LAYERS: usize = 32;

/// Maps a position on one specific layer to its binding.
pub trait ActionResolver {
    fn resolve(&self, pos: KeyPos, layer: LayerId) -> Binding;
}

impl<R: ActionResolver + ?Sized> ActionResolver for &R {
    fn resolve(&self, pos: KeyPos, layer: LayerId) -> Binding {
        (**self).resolve(pos, layer)
    }
}

/// Bindings of one layer. Unlisted positions are transparent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub map: HashMap<KeyPos, Binding>,
}

#[derive(Debug, Clone, Default)]
pub struct Keymap {
    pub name: Option<String>,
    pub layers: Vec<Layer>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a binding, growing the layer list as needed.
    pub fn set(&mut self, layer: LayerId, pos: KeyPos, binding: Binding) {
        let idx = layer as usize;
        if self.layers.len() <= idx {
            self.layers.resize_with(idx + 1, Layer::default);
        }
        self.layers[idx].map.insert(pos, binding);
    }

    pub fn with(mut self, layer: LayerId, pos: KeyPos, binding: Binding) -> Self {
        self.set(layer, pos, binding);
        self
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl ActionResolver for Keymap {
    fn resolve(&self, pos: KeyPos, layer: LayerId) -> Binding {
        self.layers
            .get(layer as usize)
            .and_then(|l| l.map.get(&pos))
            .copied()
            .unwrap_or(Binding::Transparent)
    }
}

/// Bitmask of active layers. Layer 0 is the default layer and always active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerState(u32);

impl Default for LayerState {
    fn default() -> Self {
        Self(1)
    }
}

impl LayerState {
    pub fn on(&mut self, layer: LayerId) {
        if (layer as usize) < MAX_LAYERS {
            self.0 |= 1u32 << layer;
        }
    }

    pub fn off(&mut self, layer: LayerId) {
        if layer != 0 && (layer as usize) < MAX_LAYERS {
            self.0 &= !(1u32 << layer);
        }
    }

    pub fn is_on(&self, layer: LayerId) -> bool {
        (layer as usize) < MAX_LAYERS && self.0 & (1u32 << layer) != 0
    }

    pub fn highest(&self) -> LayerId {
        (31 - self.0.leading_zeros()) as LayerId
    }

    /// Active layers, highest first.
    pub fn active_desc(&self) -> impl Iterator<Item = LayerId> {
        let mask = self.0;
        (0..MAX_LAYERS as u8)
            .rev()
            .filter(move |&l| mask & (1u32 << l) != 0)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Walks the active layers from the top and returns the first binding
    /// that is not transparent, along with the layer it came from.
    pub fn lookup<R: ActionResolver + ?Sized>(
        &self,
        resolver: &R,
        pos: KeyPos,
    ) -> (LayerId, Binding) {
        for layer in self.active_desc() {
            match resolver.resolve(pos, layer) {
                Binding::Transparent => continue,
                binding => return (layer, binding),
            }
        }
        (0, Binding::None)
    }
}
