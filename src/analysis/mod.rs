//! Simulated content analysis.
//!
//! Stands in for a real highlight-detection backend: picks 3 to 5
//! random windows with confidence scores, shaped so downstream stages
//! (extraction, compositing) exercise their real code paths. Captions
//! come from a fixed per-tone table.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{Highlight, Tone};

/// Produce scored highlight windows for a source of `duration` seconds.
///
/// Windows never extend past the source duration and come back sorted
/// by score, best first.
pub fn analyze_content(duration: f64, target_duration: f64, tone: Tone) -> Vec<Highlight> {
    analyze_content_with_rng(duration, target_duration, tone, &mut rand::thread_rng())
}

/// Seedable variant of [`analyze_content`].
pub fn analyze_content_with_rng<R: Rng>(
    duration: f64,
    target_duration: f64,
    tone: Tone,
    rng: &mut R,
) -> Vec<Highlight> {
    if duration <= 0.0 {
        return Vec::new();
    }
    let target = target_duration.clamp(0.0, duration);

    let count = rng.gen_range(3..=5);
    let window = target / count as f64;
    let latest_start = (duration - target).max(0.0);

    let mut highlights: Vec<Highlight> = (0..count)
        .map(|i| {
            let start = if latest_start > 0.0 {
                rng.gen_range(0.0..latest_start)
            } else {
                0.0
            };
            Highlight {
                start,
                end: (start + window).min(duration),
                score: rng.gen_range(0.7..=1.0),
                description: format!("Highlight {} based on {} tone", i + 1, tone),
            }
        })
        .collect();

    highlights.sort_by(|a, b| b.score.total_cmp(&a.score));
    highlights
}

/// Deterministic analysis for repeatable runs.
pub fn analyze_content_seeded(
    duration: f64,
    target_duration: f64,
    tone: Tone,
    seed: u64,
) -> Vec<Highlight> {
    analyze_content_with_rng(duration, target_duration, tone, &mut StdRng::seed_from_u64(seed))
}

/// Social caption text for the requested tone.
pub fn generate_caption(tone: Tone) -> &'static str {
    match tone {
        Tone::Professional => {
            "Introducing our latest solution designed to enhance productivity and efficiency. #Innovation #Tech"
        }
        Tone::Exciting => {
            "Get ready for something amazing! Our new release will transform how you work. #GameChanger #Excited"
        }
        Tone::Educational => {
            "Learn how our new approach can help solve common challenges in your industry. #Education #Knowledge"
        }
        Tone::Inspirational => {
            "Unlock your potential with tools designed to help you achieve more. #Inspiration #Growth"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_count_within_bounds() {
        for seed in 0..20 {
            let highlights = analyze_content_seeded(300.0, 30.0, Tone::Professional, seed);
            assert!(
                (3..=5).contains(&highlights.len()),
                "seed {} produced {} highlights",
                seed,
                highlights.len()
            );
        }
    }

    #[test]
    fn highlights_fit_inside_source() {
        let highlights = analyze_content_seeded(300.0, 30.0, Tone::Exciting, 7);
        for h in &highlights {
            assert!(h.is_valid_for(300.0), "out of bounds: {:?}", h);
            assert!((0.7..=1.0).contains(&h.score));
        }
    }

    #[test]
    fn highlights_sorted_by_score_descending() {
        let highlights = analyze_content_seeded(600.0, 45.0, Tone::Educational, 42);
        for pair in highlights.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn short_source_still_yields_valid_windows() {
        // Target longer than the whole source: windows clamp, never overrun.
        let highlights = analyze_content_seeded(10.0, 60.0, Tone::Professional, 3);
        for h in &highlights {
            assert!(h.is_valid_for(10.0), "out of bounds: {:?}", h);
        }
    }

    #[test]
    fn empty_source_yields_nothing() {
        assert!(analyze_content_seeded(0.0, 30.0, Tone::Professional, 1).is_empty());
    }

    #[test]
    fn seeded_runs_are_deterministic() {
        let a = analyze_content_seeded(300.0, 30.0, Tone::Inspirational, 99);
        let b = analyze_content_seeded(300.0, 30.0, Tone::Inspirational, 99);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.start, y.start);
            assert_eq!(x.score, y.score);
        }
    }

    #[test]
    fn captions_keyed_by_tone() {
        assert!(generate_caption(Tone::Professional).contains("#Innovation"));
        assert!(generate_caption(Tone::Exciting).contains("#GameChanger"));
        assert!(generate_caption(Tone::Educational).contains("#Education"));
        assert!(generate_caption(Tone::Inspirational).contains("#Growth"));
    }
}
