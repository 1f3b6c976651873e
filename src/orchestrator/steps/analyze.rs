//! Analyze step - picks highlight windows and a caption.
//!
//! The highlight selection is simulated (scored random windows); it
//! exists so extraction and compositing run against realistic ranges.

use crate::analysis;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{AnalysisOutput, Context, JobState, StepOutcome};

/// Highlight selection step.
pub struct AnalyzeStep;

impl AnalyzeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnalyzeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AnalyzeStep {
    fn name(&self) -> &str {
        "Analyze"
    }

    fn validate_input(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        if !state.has_fetch() {
            return Err(StepError::precondition_failed("Fetch has not run"));
        }
        if ctx.request.target_duration <= 0.0 {
            return Err(StepError::invalid_input(format!(
                "target duration must be positive, got {}",
                ctx.request.target_duration
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let fetch = state
            .fetch
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Fetch output missing"))?;

        let highlights = analysis::analyze_content(
            fetch.duration,
            ctx.request.target_duration,
            ctx.request.tone,
        );
        let caption = analysis::generate_caption(ctx.request.tone).to_string();

        ctx.logger.info(&format!(
            "Selected {} highlight(s), best score {:.2}",
            highlights.len(),
            highlights.first().map(|h| h.score).unwrap_or(0.0)
        ));
        for h in &highlights {
            ctx.logger.debug(&format!(
                "  {:.1}s - {:.1}s (score {:.2}): {}",
                h.start, h.end, h.score, h.description
            ));
        }

        state.analysis = Some(AnalysisOutput {
            highlights,
            caption,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let analysis = state
            .analysis
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Analysis result not recorded"))?;
        if analysis.highlights.is_empty() {
            return Err(StepError::invalid_output("no highlights selected"));
        }
        let duration = state.fetch.as_ref().map(|f| f.duration).unwrap_or(0.0);
        for h in &analysis.highlights {
            if !h.is_valid_for(duration) {
                return Err(StepError::invalid_output(format!(
                    "highlight out of range: {:.1}s - {:.1}s",
                    h.start, h.end
                )));
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Select highlight windows and generate a caption"
    }
}
