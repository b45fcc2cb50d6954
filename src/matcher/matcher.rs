//! Template matching engine
//!
//! Exhaustive correlation search: every offset where the pattern fits is
//! scored, thresholded, then collapsed by non-maximum suppression.

use super::config::{MatchConfig, Metric};
use super::nms;
use super::types::{Candidate, Match};
use super::zncc::{self, SummedAreaTable, TemplateStats};
use crate::capture::Frame;
use crate::geometry::Region;
use crate::image_store::Pattern;
use image::GrayImage;
use imageproc::template_matching::{MatchTemplateMethod, match_template};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Finds patterns in captured frames
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: MatchConfig,
}

impl MatchEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Find all occurrences of `pattern` in `frame`, best first.
    ///
    /// Consumes the frame. Returns an empty vector when the pattern is larger
    /// than the frame or nothing clears the threshold.
    pub fn find(&self, frame: Frame, pattern: &Pattern) -> Vec<Match> {
        find_with(&frame, pattern, &self.config)
    }

    /// Strongest occurrence only
    pub fn find_best(&self, frame: Frame, pattern: &Pattern) -> Option<Match> {
        let config = MatchConfig {
            max_matches: Some(1),
            ..self.config.clone()
        };
        find_with(&frame, pattern, &config).into_iter().next()
    }
}

/// Search `frame` for `pattern` using an explicit configuration
pub fn find_with(frame: &Frame, pattern: &Pattern, config: &MatchConfig) -> Vec<Match> {
    let start_time = std::time::Instant::now();
    let (pw, ph) = (pattern.width(), pattern.height());
    let (fw, fh) = (frame.width(), frame.height());

    if pw == 0 || ph == 0 {
        log::debug!("⚠️ Pattern '{}' is empty, nothing to search", pattern.name());
        return Vec::new();
    }
    if pw > fw || ph > fh {
        log::debug!(
            "⚠️ Pattern '{}' {}x{} larger than frame {}x{}",
            pattern.name(),
            pw,
            ph,
            fw,
            fh
        );
        return Vec::new();
    }

    let threshold = config.threshold.unwrap_or_else(|| pattern.threshold());
    let luma = frame.to_luma();
    let template = pattern.image().stats();

    let candidates = match config.metric {
        Metric::Zncc => zncc_candidates(&luma, template, threshold),
        Metric::CrossCorrelationNormalized => ccorr_candidates(&luma, template, threshold),
    };
    let candidate_count = candidates.len();

    let kept = nms::suppress(
        candidates,
        pw,
        ph,
        config.overlap_fraction,
        config.max_matches,
    );

    let origin = frame.region();
    let matches: Vec<Match> = kept
        .into_iter()
        .filter_map(|c| to_match(c, origin, pattern))
        .collect();

    log::debug!(
        "🔍 '{}' in {}x{} frame at {}: {} candidates >= {:.2}, {} matches ({}ms)",
        pattern.name(),
        fw,
        fh,
        origin,
        candidate_count,
        threshold,
        matches.len(),
        start_time.elapsed().as_millis()
    );

    matches
}

/// Translate a frame-space candidate into a screen-space match
fn to_match(candidate: Candidate, origin: Region, pattern: &Pattern) -> Option<Match> {
    let region = Region::new(
        origin.x() + candidate.x as i32,
        origin.y() + candidate.y as i32,
        pattern.width() as i32,
        pattern.height() as i32,
    )
    .ok()?;
    Some(Match {
        target: pattern.target_for(&region),
        region,
        score: candidate.score,
    })
}

fn zncc_candidates(luma: &GrayImage, template: &TemplateStats, threshold: f32) -> Vec<Candidate> {
    if template.is_flat() {
        log::debug!("⚠️ Pattern has no contrast; correlation is undefined, no matches");
        return Vec::new();
    }

    let table = SummedAreaTable::new(luma);
    let max_x = luma.width() - template.width();
    let max_y = luma.height() - template.height();

    let scan_row = |y: u32| -> Vec<Candidate> {
        (0..=max_x)
            .filter_map(|x| {
                let score = zncc::score_at(luma, &table, template, x, y);
                (score >= threshold).then_some(Candidate { x, y, score })
            })
            .collect()
    };

    #[cfg(feature = "parallel")]
    let candidates = (0..=max_y).into_par_iter().flat_map_iter(scan_row).collect();
    #[cfg(not(feature = "parallel"))]
    let candidates = (0..=max_y).flat_map(scan_row).collect();

    candidates
}

fn ccorr_candidates(luma: &GrayImage, template: &TemplateStats, threshold: f32) -> Vec<Candidate> {
    if template.is_flat() {
        log::debug!("⚠️ Pattern has no contrast; correlation is undefined, no matches");
        return Vec::new();
    }

    let scores = match_template(
        luma,
        template.pixels(),
        MatchTemplateMethod::CrossCorrelationNormalized,
    );
    let table = SummedAreaTable::new(luma);
    let (tw, th) = (template.width(), template.height());

    scores
        .enumerate_pixels()
        .filter_map(|(x, y, pixel)| {
            // Flat windows score 0 under every metric
            if table.is_flat_window(x, y, tw, th) {
                return None;
            }
            let score = pixel[0];
            let score = if score.is_finite() {
                score.clamp(0.0, 1.0)
            } else {
                0.0
            };
            (score >= threshold).then_some(Candidate { x, y, score })
        })
        .collect()
}
