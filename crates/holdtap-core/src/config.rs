use crate::error::ConfigError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Engine options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hold threshold: a tap-hold key still down this long after its press
    /// resolves as hold.
    #[serde(default = "default_tapping_term_ms")]
    pub tapping_term_ms: u64,
}

fn default_tapping_term_ms() -> u64 {
    200
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tapping_term_ms: default_tapping_term_ms(),
        }
    }
}

impl Config {
    pub fn with_tapping_term_ms(tapping_term_ms: u64) -> Self {
        Self { tapping_term_ms }
    }

    pub fn tapping_term(&self) -> Duration {
        Duration::from_millis(self.tapping_term_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tapping_term_ms == 0 {
            return Err(ConfigError::ZeroTappingTerm);
        }
        Ok(())
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
