//! Configuration loading, saving, and settings types.

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, ExtractSettings, FetchSettings, LoggingSettings, OverlaySettings, PathSettings,
    Settings,
};
