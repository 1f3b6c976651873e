//! Fetch step - resolves the request's source to a local playable file.
//!
//! Remote URLs go through the download strategies; local files are
//! checked for a supported container extension and used in place.

use crate::fetch::{is_supported_video_url, Fetcher};
use crate::models::{is_video_file, MediaSource};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, FetchOutput, JobState, StepOutcome};
use crate::probe;

/// Acquisition step: URL download or local file validation.
pub struct FetchStep;

impl FetchStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FetchStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for FetchStep {
    fn name(&self) -> &str {
        "Fetch"
    }

    fn validate_input(&self, ctx: &Context, _state: &JobState) -> StepResult<()> {
        match &ctx.request.source {
            MediaSource::Remote(url) => {
                if !is_supported_video_url(url) {
                    return Err(StepError::invalid_input(format!(
                        "not a recognized video URL: {}",
                        url
                    )));
                }
            }
            MediaSource::Local(path) => {
                if !path.is_file() {
                    return Err(StepError::invalid_input(format!(
                        "source file not found: {}",
                        path.display()
                    )));
                }
                if !is_video_file(path) {
                    return Err(StepError::invalid_input(format!(
                        "unsupported video extension: {}",
                        path.display()
                    )));
                }
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let (local_path, downloaded) = match &ctx.request.source {
            MediaSource::Local(path) => (path.clone(), false),
            MediaSource::Remote(url) => {
                ctx.logger.info(&format!("Downloading {}", url));
                let fetcher = Fetcher::new(ctx.settings.fetch.clone());
                let path = fetcher.fetch(url, &ctx.work_dir)?;
                (path, true)
            }
        };

        let duration = probe::probe_duration(&local_path)?;
        ctx.logger.info(&format!(
            "Source ready: {} ({:.1}s)",
            local_path.display(),
            duration
        ));

        state.fetch = Some(FetchOutput {
            local_path,
            duration,
            downloaded,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let fetch = state
            .fetch
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Fetch result not recorded"))?;
        if !fetch.local_path.is_file() {
            return Err(StepError::invalid_output(format!(
                "fetched file missing: {}",
                fetch.local_path.display()
            )));
        }
        if fetch.duration <= 0.0 {
            return Err(StepError::invalid_output("source has no duration"));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Resolve the source to a local playable file"
    }
}
