pub mod config;
pub mod deferred;
pub mod engine;
pub mod error;
pub mod keycode;
pub mod keymap;
pub mod parser;
pub mod report;
pub mod tap_hold;
pub mod types;

pub use config::Config;
pub use engine::Engine;
pub use error::{ConfigError, KeymapError};
pub use keycode::{KeyCode, Modifier};
pub use keymap::{ActionResolver, Keymap, LayerState};
pub use report::{ChannelSink, RecordingSink, Report, ReportSink};
pub use types::{Action, Binding, KeyEdge, KeyEvent, KeyPos, LayerId};
