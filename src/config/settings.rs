//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::models::ExtractMode;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Remote fetch and retry configuration.
    #[serde(default)]
    pub fetch: FetchSettings,

    /// Segment extraction configuration.
    #[serde(default)]
    pub extract: ExtractSettings,

    /// Overlay rendering configuration.
    #[serde(default)]
    pub overlay: OverlaySettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Path configuration for output, temp, and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output folder for final teaser files.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root folder for per-run scratch directories.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_output_folder() -> String {
    "outputs".to_string()
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Remote fetch retry bounds and backoff shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Transient-lock retry bound for the primary download client.
    #[serde(default = "default_primary_attempts")]
    pub primary_attempts: u32,

    /// Attempt bound for the fallback download client.
    #[serde(default = "default_fallback_attempts")]
    pub fallback_attempts: u32,

    /// Attempt bound across the combined download+merge sequence.
    #[serde(default = "default_merge_attempts")]
    pub merge_attempts: u32,

    /// First backoff delay in seconds; doubles each attempt.
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,
}

fn default_primary_attempts() -> u32 {
    10
}

fn default_fallback_attempts() -> u32 {
    5
}

fn default_merge_attempts() -> u32 {
    3
}

fn default_backoff_base_secs() -> u64 {
    5
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            primary_attempts: default_primary_attempts(),
            fallback_attempts: default_fallback_attempts(),
            merge_attempts: default_merge_attempts(),
            backoff_base_secs: default_backoff_base_secs(),
        }
    }
}

/// Segment extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractSettings {
    /// Default extraction mode when the caller does not choose.
    #[serde(default)]
    pub mode: ExtractMode,

    /// x264 preset for re-encoding paths.
    #[serde(default = "default_preset")]
    pub preset: String,
}

fn default_preset() -> String {
    "veryfast".to_string()
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            mode: ExtractMode::default(),
            preset: default_preset(),
        }
    }
}

/// Overlay rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Path to a TTF/OTF font for caption and tagline text.
    #[serde(default = "default_font_path")]
    pub font_path: String,

    /// Caption font size in pixels.
    #[serde(default = "default_caption_font_size")]
    pub caption_font_size: u32,

    /// Tagline font size in pixels.
    #[serde(default = "default_tagline_font_size")]
    pub tagline_font_size: u32,

    /// Logo footprint (square, pixels).
    #[serde(default = "default_logo_size")]
    pub logo_size: u32,

    /// Logo margin from the top-left corner, pixels.
    #[serde(default = "default_logo_margin")]
    pub logo_margin: u32,

    /// Padding around the tagline background box, pixels.
    #[serde(default = "default_tagline_padding")]
    pub tagline_padding: u32,

    /// x264 preset for the re-encode that burns overlays in.
    #[serde(default = "default_preset")]
    pub preset: String,
}

fn default_font_path() -> String {
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf".to_string()
}

fn default_caption_font_size() -> u32 {
    40
}

fn default_tagline_font_size() -> u32 {
    30
}

fn default_logo_size() -> u32 {
    100
}

fn default_logo_margin() -> u32 {
    10
}

fn default_tagline_padding() -> u32 {
    8
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            font_path: default_font_path(),
            caption_font_size: default_caption_font_size(),
            tagline_font_size: default_tagline_font_size(),
            logo_size: default_logo_size(),
            logo_margin: default_logo_margin(),
            tagline_padding: default_tagline_padding(),
            preset: default_preset(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of recent lines to show when a stage fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Fetch,
    Extract,
    Overlay,
    Logging,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Fetch => "fetch",
            ConfigSection::Extract => "extract",
            ConfigSection::Overlay => "overlay",
            ConfigSection::Logging => "logging",
        }
    }
}
