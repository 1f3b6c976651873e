//! Logging types and configuration.

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Debug information.
    Debug,
    /// General information.
    #[default]
    Info,
    /// Warnings.
    Warn,
    /// Errors.
    Error,
}

/// Configuration for job logger behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to output.
    pub level: LogLevel,
    /// Use compact mode (filter repeated progress lines).
    pub compact: bool,
    /// Progress update step percentage.
    pub progress_step: u32,
    /// Number of lines kept for the error tail.
    pub error_tail: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            progress_step: 20,
            error_tail: 20,
        }
    }
}

impl LogConfig {
    /// Create a debug configuration (verbose, no compact).
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
            compact: false,
            progress_step: 10,
            error_tail: 50,
        }
    }
}

impl From<&crate::config::LoggingSettings> for LogConfig {
    fn from(settings: &crate::config::LoggingSettings) -> Self {
        Self {
            level: LogLevel::Info,
            compact: settings.compact,
            progress_step: settings.progress_step,
            error_tail: settings.error_tail as usize,
        }
    }
}

/// Callback receiving each log message, e.g. for a UI feed.
pub type LogCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Message prefix types for consistent formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// Shell command: `$ command`
    Command,
    /// Phase marker: `=== Phase ===`
    Phase,
    /// Success: `[SUCCESS]`
    Success,
    /// Warning: `[WARNING]`
    Warning,
    /// Error: `[ERROR]`
    Error,
    /// No prefix
    None,
}

impl MessagePrefix {
    /// Format a message with this prefix.
    pub fn format(&self, message: &str) -> String {
        match self {
            MessagePrefix::Command => format!("$ {}", message),
            MessagePrefix::Phase => format!("=== {} ===", message),
            MessagePrefix::Success => format!("[SUCCESS] {}", message),
            MessagePrefix::Warning => format!("[WARNING] {}", message),
            MessagePrefix::Error => format!("[ERROR] {}", message),
            MessagePrefix::None => message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_order() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn prefix_formats() {
        assert_eq!(MessagePrefix::Command.format("ffmpeg -i a.mp4"), "$ ffmpeg -i a.mp4");
        assert_eq!(MessagePrefix::Phase.format("Extract"), "=== Extract ===");
        assert_eq!(MessagePrefix::Warning.format("clamped"), "[WARNING] clamped");
    }
}
