//! Non-maximum suppression over scored candidates

use super::types::Candidate;
use std::cmp::Ordering;

/// Best-first, then reading order (top to bottom, left to right)
pub(crate) fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
}

/// Fraction of the smaller of two `w x h` boxes covered by their intersection
fn overlap(a: &Candidate, b: &Candidate, w: u32, h: u32) -> f32 {
    let ix = (a.x.max(b.x), (a.x + w).min(b.x + w));
    let iy = (a.y.max(b.y), (a.y + h).min(b.y + h));
    if ix.1 <= ix.0 || iy.1 <= iy.0 {
        return 0.0;
    }
    let inter = (ix.1 - ix.0) as f64 * (iy.1 - iy.0) as f64;
    let area = w as f64 * h as f64;
    (inter / area) as f32
}

/// Keep the strongest candidates, dropping any whose box overlaps an
/// already kept box by more than `overlap_fraction`.
///
/// All candidates share the pattern's `w x h` footprint. The result is in
/// rank order and holds at most `max_matches` entries.
pub(crate) fn suppress(
    mut candidates: Vec<Candidate>,
    w: u32,
    h: u32,
    overlap_fraction: f32,
    max_matches: Option<usize>,
) -> Vec<Candidate> {
    candidates.sort_unstable_by(rank);
    let limit = max_matches.unwrap_or(usize::MAX);
    let mut kept: Vec<Candidate> = Vec::new();

    for candidate in candidates {
        if kept.len() >= limit {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| overlap(k, &candidate, w, h) > overlap_fraction);
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: u32, y: u32, score: f32) -> Candidate {
        Candidate { x, y, score }
    }

    #[test]
    fn test_neighbouring_offsets_collapse_to_peak() {
        let candidates = vec![c(10, 10, 0.91), c(11, 10, 0.99), c(12, 11, 0.93), c(10, 11, 0.95)];
        let kept = suppress(candidates, 20, 20, 0.5, None);
        assert_eq!(kept, vec![c(11, 10, 0.99)]);
    }

    #[test]
    fn test_distant_matches_survive_in_rank_order() {
        let candidates = vec![c(100, 0, 0.90), c(0, 0, 0.97), c(50, 50, 0.90)];
        let kept = suppress(candidates, 20, 20, 0.5, None);
        assert_eq!(kept, vec![c(0, 0, 0.97), c(100, 0, 0.90), c(50, 50, 0.90)]);
    }

    #[test]
    fn test_ties_break_by_reading_order() {
        let candidates = vec![c(60, 5, 0.9), c(5, 60, 0.9), c(30, 5, 0.9)];
        let kept = suppress(candidates, 10, 10, 0.5, None);
        assert_eq!(kept, vec![c(30, 5, 0.9), c(60, 5, 0.9), c(5, 60, 0.9)]);
    }

    #[test]
    fn test_overlap_at_exact_fraction_is_kept() {
        // Boxes sharing exactly half their area are not "more than" 0.5
        let kept = suppress(vec![c(0, 0, 0.9), c(5, 0, 0.8)], 10, 10, 0.5, None);
        assert_eq!(kept.len(), 2);
        let kept = suppress(vec![c(0, 0, 0.9), c(4, 0, 0.8)], 10, 10, 0.5, None);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_max_matches_limit() {
        let candidates = (0..10).map(|i| c(i * 100, 0, 0.9)).collect();
        assert_eq!(suppress(candidates, 10, 10, 0.5, Some(3)).len(), 3);
    }
}
