//! Per-run logger with file and callback output.
//!
//! Each pipeline run gets its own logger that writes to a dedicated log
//! file, forwards messages to an optional callback, and maintains a tail
//! buffer for error diagnosis.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-run logger with dual output (file + callback).
pub struct JobLogger {
    /// Job name for identification.
    job_name: String,
    /// Path to log file.
    log_path: PathBuf,
    /// File writer (buffered).
    file_writer: Mutex<Option<BufWriter<File>>>,
    /// Optional callback for forwarding messages.
    callback: Mutex<Option<LogCallback>>,
    /// Logging configuration.
    config: LogConfig,
    /// Tail buffer of recent lines (used for error diagnosis).
    tail_buffer: Mutex<VecDeque<String>>,
    /// Last progress value logged (for compact mode filtering).
    last_progress: Mutex<Option<u32>>,
}

impl JobLogger {
    /// Create a new job logger writing to `log_dir/<job_name>.log`.
    pub fn new(
        job_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let job_name = job_name.into();
        let log_dir = log_dir.as_ref();

        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&job_name)));
        let file = File::create(&log_path)?;

        Ok(Self {
            job_name,
            log_path,
            file_writer: Mutex::new(Some(BufWriter::new(file))),
            callback: Mutex::new(callback),
            config,
            tail_buffer: Mutex::new(VecDeque::with_capacity(100)),
            last_progress: Mutex::new(None),
        })
    }

    /// Get the job name.
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// Get the log file path.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        let stamp = Local::now().format("%H:%M:%S%.3f");
        let line = format!("[{}] {}", stamp, message);
        self.output(&line);
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    /// Log a command being executed.
    pub fn command(&self, command: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Command.format(command));
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Phase.format(phase_name));
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Success.format(message));
    }

    /// Log progress (filtered to `progress_step` increments in compact mode).
    ///
    /// Returns true if the progress line was logged, false if filtered.
    pub fn progress(&self, percent: u32, message: &str) -> bool {
        if self.config.compact {
            let mut last = self.last_progress.lock();
            let step = self.config.progress_step.max(1);
            if let Some(last) = *last {
                if percent < 100 && percent / step == last / step {
                    return false;
                }
            }
            *last = Some(percent);
        }
        self.log(LogLevel::Info, &format!("[{:>3}%] {}", percent, message));
        true
    }

    /// Recent log lines for error diagnosis.
    pub fn tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Flush and close the log file.
    pub fn close(&self) {
        let mut writer = self.file_writer.lock();
        if let Some(ref mut w) = *writer {
            let _ = w.flush();
        }
        *writer = None;
    }

    fn output(&self, line: &str) {
        {
            let mut writer = self.file_writer.lock();
            if let Some(ref mut w) = *writer {
                let _ = writeln!(w, "{}", line);
            }
        }

        {
            let mut tail = self.tail_buffer.lock();
            if tail.len() >= self.config.error_tail.max(1) {
                tail.pop_front();
            }
            tail.push_back(line.to_string());
        }

        if let Some(ref cb) = *self.callback.lock() {
            cb(line);
        }
    }
}

impl Drop for JobLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Replace filesystem-hostile characters in a job name.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn writes_to_file_and_callback() {
        let dir = tempdir().unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let logger = JobLogger::new(
            "test_job",
            dir.path(),
            LogConfig::default(),
            Some(Box::new(move |_| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            })),
        )
        .unwrap();

        logger.info("hello");
        logger.phase("Extract");
        logger.close();

        assert_eq!(count.load(Ordering::SeqCst), 2);
        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("hello"));
        assert!(content.contains("=== Extract ==="));
    }

    #[test]
    fn debug_filtered_at_info_level() {
        let dir = tempdir().unwrap();
        let logger = JobLogger::new("lvl", dir.path(), LogConfig::default(), None).unwrap();
        logger.debug("invisible");
        logger.info("visible");
        logger.close();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(!content.contains("invisible"));
        assert!(content.contains("visible"));
    }

    #[test]
    fn compact_mode_filters_progress() {
        let dir = tempdir().unwrap();
        let logger = JobLogger::new("prog", dir.path(), LogConfig::default(), None).unwrap();
        assert!(logger.progress(0, "start"));
        assert!(!logger.progress(5, "still going"));
        assert!(logger.progress(25, "quarter"));
        assert!(logger.progress(100, "done"));
    }

    #[test]
    fn tail_keeps_recent_lines() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            error_tail: 3,
            ..LogConfig::default()
        };
        let logger = JobLogger::new("tail", dir.path(), config, None).unwrap();
        for i in 0..10 {
            logger.info(&format!("line {}", i));
        }
        let tail = logger.tail();
        assert_eq!(tail.len(), 3);
        assert!(tail[2].contains("line 9"));
    }

    #[test]
    fn sanitizes_job_name() {
        assert_eq!(sanitize_filename("a/b:c"), "a_b_c");
    }
}
