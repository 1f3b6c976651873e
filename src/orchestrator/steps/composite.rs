//! Composite step - burns captions, logo, and tagline into the segment.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{CompositeOutput, Context, JobState, StepOutcome};
use crate::overlay::{Compositor, TempLogo};

/// Overlay compositing step.
///
/// Optional: skipped entirely when the request has nothing to draw.
/// Compositing itself never fails the job; a failed render falls back
/// to the unmodified segment.
pub struct CompositeStep;

impl CompositeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CompositeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for CompositeStep {
    fn name(&self) -> &str {
        "Composite"
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if !state.has_extraction() {
            return Err(StepError::precondition_failed("Extract has not run"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        if !ctx.request.wants_overlays() {
            return Ok(StepOutcome::Skipped("no overlays requested".to_string()));
        }

        let extract = state
            .extract
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Extract output missing"))?;

        // The logo file lives only as long as this run.
        let temp_logo = match &ctx.request.logo {
            Some(bytes) => Some(TempLogo::write(bytes, &ctx.work_dir)?),
            None => None,
        };

        let compositor = Compositor::new(ctx.settings.overlay.clone());
        let output_path = compositor.composite(
            &extract.segment_path,
            &ctx.request.overlays,
            temp_logo.as_ref().map(|l| l.path()),
            ctx.request.tagline.as_deref(),
            &ctx.work_dir,
        )?;

        let overlays_applied = output_path != extract.segment_path;
        if overlays_applied {
            ctx.logger
                .info(&format!("Overlays applied: {}", output_path.display()));
        } else {
            ctx.logger
                .warn("Compositing fell back to the unmodified segment");
        }

        state.composite = Some(CompositeOutput {
            output_path,
            overlays_applied,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let composite = state
            .composite
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Composite result not recorded"))?;
        if !composite.output_path.is_file() {
            return Err(StepError::invalid_output(format!(
                "composited file missing: {}",
                composite.output_path.display()
            )));
        }
        Ok(())
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn description(&self) -> &str {
        "Burn captions, logo, and tagline into the segment"
    }
}
