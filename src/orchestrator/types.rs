//! Core types for the orchestrator pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::logging::JobLogger;
use crate::models::{Highlight, TeaserRequest};

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Contains the job request and shared resources that steps can read
/// but not modify. Mutable state goes in `JobState`.
pub struct Context {
    /// The teaser request (source, duration, tone, overlays).
    pub request: TeaserRequest,
    /// Application settings.
    pub settings: Settings,
    /// Job name/identifier.
    pub job_name: String,
    /// Job-specific scratch directory, torn down after the run.
    pub work_dir: PathBuf,
    /// Output directory for the final teaser file.
    pub output_dir: PathBuf,
    /// Per-job logger.
    pub logger: Arc<JobLogger>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a job.
    pub fn new(
        request: TeaserRequest,
        settings: Settings,
        job_name: impl Into<String>,
        work_dir: PathBuf,
        output_dir: PathBuf,
        logger: Arc<JobLogger>,
    ) -> Self {
        Self {
            request,
            settings,
            job_name: job_name.into(),
            work_dir,
            output_dir,
            logger,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to the callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// This is the "write-once manifest" - steps add their own section and
/// should not overwrite existing values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobState {
    /// Unique job identifier.
    pub job_id: String,
    /// When the job started.
    pub started_at: Option<String>,
    /// Acquisition results (from Fetch step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch: Option<FetchOutput>,
    /// Highlight selection results (from Analyze step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisOutput>,
    /// Segment extraction results (from Extract step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractOutput>,
    /// Overlay compositing results (from Composite step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeOutput>,
}

impl JobState {
    /// Create a new job state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Check if acquisition has completed.
    pub fn has_fetch(&self) -> bool {
        self.fetch.is_some()
    }

    /// Check if analysis has completed.
    pub fn has_analysis(&self) -> bool {
        self.analysis.is_some()
    }

    /// Check if extraction has completed.
    pub fn has_extraction(&self) -> bool {
        self.extract.is_some()
    }

    /// The current working video: composited if present, else the
    /// extracted segment.
    pub fn current_video(&self) -> Option<&PathBuf> {
        self.composite
            .as_ref()
            .map(|c| &c.output_path)
            .or_else(|| self.extract.as_ref().map(|e| &e.segment_path))
    }
}

/// Output from the Fetch step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOutput {
    /// Local playable file, downloaded or supplied directly.
    pub local_path: PathBuf,
    /// Probed container duration in seconds.
    pub duration: f64,
    /// Whether the file was downloaded (as opposed to local input).
    pub downloaded: bool,
}

/// Output from the Analyze step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// Scored highlight windows, best first.
    pub highlights: Vec<Highlight>,
    /// Social caption for the chosen tone.
    pub caption: String,
}

/// Output from the Extract step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOutput {
    /// The extracted segment; highlights joined back to back when the
    /// analysis picked more than one.
    pub segment_path: PathBuf,
    /// Source-relative highlight windows that went in, in output order.
    pub windows: Vec<Highlight>,
}

/// Output from the Composite step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeOutput {
    /// Path to the composited (or passed-through) video.
    pub output_path: PathBuf,
    /// Whether any overlay was actually burned in.
    pub overlays_applied: bool,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (preconditions not met, but not an error).
    Skipped(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_state_tracks_completion() {
        let mut state = JobState::new("teaser-123");
        assert!(!state.has_fetch());
        assert!(state.current_video().is_none());

        state.extract = Some(ExtractOutput {
            segment_path: PathBuf::from("/tmp/cut.mp4"),
            windows: vec![Highlight::new(10.0, 40.0, 0.9, "intro")],
        });
        assert!(state.has_extraction());
        assert_eq!(
            state.current_video(),
            Some(&PathBuf::from("/tmp/cut.mp4"))
        );

        state.composite = Some(CompositeOutput {
            output_path: PathBuf::from("/tmp/overlaid.mp4"),
            overlays_applied: true,
        });
        assert_eq!(
            state.current_video(),
            Some(&PathBuf::from("/tmp/overlaid.mp4"))
        );
    }

    #[test]
    fn job_state_serializes() {
        let state = JobState::new("teaser-456");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"job_id\":\"teaser-456\""));
    }
}
