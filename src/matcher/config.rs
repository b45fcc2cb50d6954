//! Configuration for template matching operations

/// Similarity metric used to score each offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Zero-mean normalized cross-correlation on luma, clamped to [0, 1].
    /// Invariant to brightness and contrast shifts; flat windows score 0.
    #[default]
    Zncc,
    /// Plain normalized cross-correlation as computed by `imageproc`.
    /// Not mean-subtracted, so flat or dark areas score higher than under ZNCC.
    CrossCorrelationNormalized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// Overrides the pattern's own threshold when set (0.0 to 1.0)
    pub threshold: Option<f32>,
    /// Weaker matches overlapping a stronger one by more than this fraction
    /// of the smaller area are suppressed
    pub overlap_fraction: f32,
    /// Maximum number of matches to return, `None` for all
    pub max_matches: Option<usize>,
    pub metric: Metric,
}

impl MatchConfig {
    pub const DEFAULT_OVERLAP_FRACTION: f32 = 0.5;

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold.clamp(0.0, 1.0));
        self
    }

    pub fn with_overlap_fraction(mut self, overlap_fraction: f32) -> Self {
        self.overlap_fraction = overlap_fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_matches(mut self, max_matches: usize) -> Self {
        self.max_matches = Some(max_matches);
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: None,
            overlap_fraction: Self::DEFAULT_OVERLAP_FRACTION,
            max_matches: None,
            metric: Metric::Zncc,
        }
    }
}

/// Configuration preset for pixel-exact UI elements (buttons, icons)
pub fn create_strict_config() -> MatchConfig {
    MatchConfig {
        threshold: Some(0.95),
        overlap_fraction: 0.3,
        max_matches: Some(1),
        metric: Metric::Zncc,
    }
}

/// Configuration preset for content that may be rescaled or anti-aliased
pub fn create_lenient_config() -> MatchConfig {
    MatchConfig {
        threshold: Some(0.7),
        overlap_fraction: 0.5,
        max_matches: Some(10),
        metric: Metric::Zncc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_config_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.threshold, None);
        assert_eq!(config.overlap_fraction, 0.5);
        assert_eq!(config.max_matches, None);
        assert_eq!(config.metric, Metric::Zncc);
    }

    #[test]
    fn test_builders_clamp() {
        let config = MatchConfig::default()
            .with_threshold(1.7)
            .with_overlap_fraction(-0.2)
            .with_max_matches(3);
        assert_eq!(config.threshold, Some(1.0));
        assert_eq!(config.overlap_fraction, 0.0);
        assert_eq!(config.max_matches, Some(3));
    }

    #[test]
    fn test_presets() {
        assert!(create_strict_config().threshold > create_lenient_config().threshold);
        assert_eq!(create_strict_config().max_matches, Some(1));
    }
}
