//! Extract step - cuts the best highlights out of the source.

use crate::extract;
use crate::models::{ExtractMode, Highlight};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, ExtractOutput, JobState, StepOutcome};

/// How many highlight windows make up one teaser.
const MAX_SEGMENTS: usize = 3;

/// Segment extraction step.
///
/// Cuts the top-scored highlights (at most three) and joins them back
/// to back, so the teaser length approaches the requested target
/// instead of a single window's share of it. Stream copy is used
/// unless the request carries overlays, whose frame timing needs exact
/// segment boundaries, in which case the cuts re-encode.
pub struct ExtractStep;

impl ExtractStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExtractStep {
    fn default() -> Self {
        Self::new()
    }
}

/// The windows that go into the teaser: up to [`MAX_SEGMENTS`] of the
/// best-scored highlights, kept in score order.
fn planned_windows(highlights: &[Highlight]) -> Vec<Highlight> {
    highlights.iter().take(MAX_SEGMENTS).cloned().collect()
}

impl PipelineStep for ExtractStep {
    fn name(&self) -> &str {
        "Extract"
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if !state.has_fetch() {
            return Err(StepError::precondition_failed("Fetch has not run"));
        }
        if !state.has_analysis() {
            return Err(StepError::precondition_failed("Analyze has not run"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let fetch = state
            .fetch
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Fetch output missing"))?;
        let analysis = state
            .analysis
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Analysis output missing"))?;

        // Highlights come sorted by score, best first.
        let windows = planned_windows(&analysis.highlights);
        if windows.is_empty() {
            return Err(StepError::precondition_failed("no highlight to extract"));
        }

        let mut settings = ctx.settings.extract.clone();
        if ctx.request.wants_overlays() && settings.mode == ExtractMode::StreamCopy {
            ctx.logger
                .info("Overlays requested; using frame-accurate extraction");
            settings.mode = ExtractMode::FrameAccurate;
        }

        ctx.logger.info(&format!(
            "Extracting {} highlight window(s) ({:?})",
            windows.len(),
            settings.mode
        ));

        // Cuts land in per-index subdirectories; output names derive
        // from rounded timestamps and could otherwise collide.
        let mut segments = Vec::with_capacity(windows.len());
        for (i, window) in windows.iter().enumerate() {
            let segment_dir = ctx.work_dir.join(format!("segment_{}", i));
            std::fs::create_dir_all(&segment_dir)
                .map_err(|e| StepError::other(format!("create segment dir: {}", e)))?;

            ctx.logger.info(&format!(
                "Cutting {:.1}s - {:.1}s: {}",
                window.start, window.end, window.description
            ));
            let path = extract::extract_segment(
                &fetch.local_path,
                window.start,
                window.end,
                &settings,
                &segment_dir,
            )?;
            segments.push(path);
        }

        let segment_path = extract::concat_segments(&segments, &ctx.work_dir)?;

        state.extract = Some(ExtractOutput {
            segment_path,
            windows,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let extract = state
            .extract
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Extract result not recorded"))?;
        if !extract.segment_path.is_file() {
            return Err(StepError::invalid_output(format!(
                "extracted segment missing: {}",
                extract.segment_path.display()
            )));
        }
        if extract.windows.is_empty() {
            return Err(StepError::invalid_output("no windows recorded"));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Cut the top-scored highlights and join them into one segment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlight(start: f64, end: f64, score: f64) -> Highlight {
        Highlight::new(start, end, score, "window")
    }

    #[test]
    fn plans_at_most_three_windows_in_score_order() {
        let highlights = vec![
            highlight(10.0, 16.0, 0.99),
            highlight(50.0, 56.0, 0.95),
            highlight(90.0, 96.0, 0.90),
            highlight(130.0, 136.0, 0.85),
            highlight(170.0, 176.0, 0.80),
        ];

        let planned = planned_windows(&highlights);
        assert_eq!(planned.len(), 3);
        assert_eq!(planned[0].start, 10.0);
        assert_eq!(planned[2].start, 90.0);
    }

    #[test]
    fn fewer_highlights_all_get_planned() {
        let highlights = vec![highlight(0.0, 10.0, 0.9), highlight(20.0, 30.0, 0.8)];
        assert_eq!(planned_windows(&highlights).len(), 2);
        assert!(planned_windows(&[]).is_empty());
    }

    #[test]
    fn joined_windows_cover_most_of_the_target() {
        // Each analysis window is target / count sized; one window alone
        // covers at most a third of the request, the three joined
        // windows cover at least three fifths.
        for seed in 0..10 {
            let highlights =
                crate::analysis::analyze_content_seeded(300.0, 30.0, crate::models::Tone::Exciting, seed);
            let best = highlights[0].duration();
            assert!(best <= 10.0 + 1e-9, "seed {}: single window {}s", seed, best);

            let joined: f64 = planned_windows(&highlights)
                .iter()
                .map(|w| w.duration())
                .sum();
            assert!(joined >= 18.0 - 1e-9, "seed {}: joined only {}s", seed, joined);
            assert!(joined > best, "seed {}: joining did not extend the teaser", seed);
        }
    }
}
