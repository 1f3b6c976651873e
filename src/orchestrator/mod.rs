//! Pipeline orchestrator for coordinating teaser jobs.
//!
//! This module provides the infrastructure for running the processing
//! pipeline. Each job consists of a sequence of steps that validate,
//! execute, and record their results.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Fetch
//!     ├── Step: Analyze
//!     ├── Step: Extract
//!     └── Step: Composite
//! ```

mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::logging::{JobLogger, LogConfig};
use crate::models::{ContainerFormat, OutputArtifact, TeaserRequest};
use crate::scratch::ScratchDir;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{AnalyzeStep, CompositeStep, ExtractStep, FetchStep};
pub use types::{
    AnalysisOutput, CompositeOutput, Context, ExtractOutput, FetchOutput, JobState,
    ProgressCallback, StepOutcome,
};

/// Create the standard teaser pipeline with all steps in order.
///
/// 1. Fetch - resolve the source to a local playable file
/// 2. Analyze - select highlight windows and a caption
/// 3. Extract - cut the top-scored highlights and join them
/// 4. Composite - burn in captions/logo/tagline (optional)
pub fn create_teaser_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(FetchStep::new())
        .with_step(AnalyzeStep::new())
        .with_step(ExtractStep::new())
        .with_step(CompositeStep::new())
}

/// Final result of a teaser job.
#[derive(Debug, Clone)]
pub struct TeaserResult {
    /// The produced teaser file.
    pub artifact: OutputArtifact,
    /// Social caption matching the requested tone.
    pub caption: String,
    /// Final job state manifest.
    pub state: JobState,
}

/// Run one teaser job end to end.
///
/// Creates a per-run scratch directory (torn down when the job ends,
/// success or failure), runs the pipeline, and moves the finished video
/// into the output directory as `teaser_{tone}_{duration}s.mp4`.
pub fn run_teaser_job(
    request: TeaserRequest,
    settings: &Settings,
    progress: Option<ProgressCallback>,
) -> PipelineResult<TeaserResult> {
    let job_name = format!(
        "teaser_{}_{}s",
        request.tone,
        request.target_duration as u64
    );

    let output_dir = PathBuf::from(&settings.paths.output_folder);
    std::fs::create_dir_all(&output_dir)
        .map_err(|e| PipelineError::setup_failed(&job_name, e.to_string()))?;

    let scratch = ScratchDir::create(&settings.paths.temp_root)
        .map_err(|e| PipelineError::setup_failed(&job_name, e.to_string()))?;

    let logger = JobLogger::new(
        job_name.as_str(),
        &settings.paths.logs_folder,
        LogConfig::from(&settings.logging),
        None,
    )
    .map_err(|e| PipelineError::setup_failed(&job_name, e.to_string()))?;
    let logger = Arc::new(logger);

    let mut ctx = Context::new(
        request,
        settings.clone(),
        job_name.as_str(),
        scratch.path().to_path_buf(),
        output_dir.clone(),
        Arc::clone(&logger),
    );
    if let Some(progress) = progress {
        ctx = ctx.with_progress_callback(progress);
    }

    let mut state = JobState::new(job_name.as_str());
    let pipeline = create_teaser_pipeline();
    pipeline.run(&ctx, &mut state)?;

    let source = state
        .current_video()
        .cloned()
        .ok_or_else(|| PipelineError::validation_failed(&job_name, "pipeline produced no video"))?;
    let final_path = output_dir.join(format!("{}.mp4", job_name));

    // Scratch lives on a potentially different filesystem; copy, don't
    // rename.
    std::fs::copy(&source, &final_path)
        .map_err(|e| PipelineError::setup_failed(&job_name, e.to_string()))?;
    logger.success(&format!("Teaser written to {}", final_path.display()));
    logger.close();

    let caption = state
        .analysis
        .as_ref()
        .map(|a| a.caption.clone())
        .unwrap_or_default();

    Ok(TeaserResult {
        artifact: OutputArtifact::new(final_path, ContainerFormat::Mp4),
        caption,
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pipeline_step_order() {
        let pipeline = create_teaser_pipeline();
        assert_eq!(
            pipeline.step_names(),
            vec!["Fetch", "Analyze", "Extract", "Composite"]
        );
    }
}
