//! High-level finder: one shared image store, one capture source and the
//! default knobs for matching and waiting.

use crate::capture::{CaptureSource, Frame};
use crate::error::VisionResult;
use crate::geometry::Region;
use crate::image_store::{ImageStore, Pattern};
use crate::matcher::{Match, MatchConfig, MatchEngine};
use crate::wait::{self, CancelToken, WaitConfig, WaitOutcome};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Defaults applied by [`Finder`] when a call does not override them
#[derive(Debug, Clone, PartialEq)]
pub struct FinderConfig {
    /// Threshold given to patterns loaded without an explicit one
    pub default_threshold: f32,
    pub match_config: MatchConfig,
    pub wait_config: WaitConfig,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            default_threshold: Pattern::DEFAULT_THRESHOLD,
            match_config: MatchConfig::default(),
            wait_config: WaitConfig::default(),
        }
    }
}

impl FinderConfig {
    pub const ENV_THRESHOLD: &'static str = "SCREEN_FINDER_THRESHOLD";
    pub const ENV_POLL_MS: &'static str = "SCREEN_FINDER_POLL_MS";
    pub const ENV_OVERLAP: &'static str = "SCREEN_FINDER_OVERLAP";

    /// Defaults overridden by `SCREEN_FINDER_*` environment variables.
    /// Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(threshold) = parse_var::<f32>(&lookup, Self::ENV_THRESHOLD) {
            if threshold.is_finite() {
                config.default_threshold = threshold.clamp(0.0, 1.0);
            }
        }
        if let Some(ms) = parse_var::<u64>(&lookup, Self::ENV_POLL_MS) {
            config.wait_config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(overlap) = parse_var::<f32>(&lookup, Self::ENV_OVERLAP) {
            config.match_config = config.match_config.with_overlap_fraction(overlap);
        }
        config
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("⚠️ Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

/// Public call surface for loading, capturing, finding and waiting
#[derive(Clone)]
pub struct Finder {
    store: Arc<ImageStore>,
    source: Arc<dyn CaptureSource>,
    config: FinderConfig,
}

impl Finder {
    pub fn new(source: Arc<dyn CaptureSource>) -> Self {
        Self::with_config(source, FinderConfig::default())
    }

    pub fn with_config(source: Arc<dyn CaptureSource>, config: FinderConfig) -> Self {
        Self {
            store: Arc::new(ImageStore::new()),
            source,
            config,
        }
    }

    /// Share an existing image store between finders
    pub fn with_store(mut self, store: Arc<ImageStore>) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &Arc<ImageStore> {
        &self.store
    }

    pub fn source(&self) -> &Arc<dyn CaptureSource> {
        &self.source
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    pub fn load_pattern(&self, path: impl AsRef<Path>, threshold: f32) -> VisionResult<Pattern> {
        self.store.load_pattern(path, threshold)
    }

    pub fn load_pattern_default(&self, path: impl AsRef<Path>) -> VisionResult<Pattern> {
        self.load_pattern(path, self.config.default_threshold)
    }

    pub fn capture(&self, region: Region) -> VisionResult<Frame> {
        self.source.capture(region)
    }

    pub fn bounds(&self) -> VisionResult<Region> {
        self.source.bounds()
    }

    pub fn find(&self, frame: Frame, pattern: &Pattern) -> Vec<Match> {
        self.find_with(frame, pattern, &self.config.match_config)
    }

    pub fn find_with(&self, frame: Frame, pattern: &Pattern, config: &MatchConfig) -> Vec<Match> {
        MatchEngine::new(config.clone()).find(frame, pattern)
    }

    /// Region to search for `pattern`: its file name hint clipped to the
    /// screen, or the whole screen.
    pub fn search_region_for(&self, pattern: &Pattern) -> VisionResult<Region> {
        let bounds = self.bounds()?;
        Ok(match pattern.search_region() {
            Some(hint) => hint.clip_to(&bounds),
            None => bounds,
        })
    }

    pub fn wait_for(
        &self,
        region: Region,
        pattern: &Pattern,
        timeout: Duration,
        poll_interval: Duration,
        cancel: &CancelToken,
    ) -> VisionResult<WaitOutcome> {
        let wait_config = WaitConfig {
            timeout,
            poll_interval,
            ..self.config.wait_config.clone()
        };
        self.wait_for_with(region, pattern, &self.config.match_config, &wait_config, cancel)
    }

    pub fn wait_for_with(
        &self,
        region: Region,
        pattern: &Pattern,
        match_config: &MatchConfig,
        wait_config: &WaitConfig,
        cancel: &CancelToken,
    ) -> VisionResult<WaitOutcome> {
        let engine = MatchEngine::new(match_config.clone());
        wait::wait_for(
            self.source.as_ref(),
            region,
            pattern,
            &engine,
            wait_config,
            cancel,
        )
    }

    pub fn wait_vanish(
        &self,
        region: Region,
        pattern: &Pattern,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> VisionResult<WaitOutcome<()>> {
        let wait_config = WaitConfig {
            timeout,
            ..self.config.wait_config.clone()
        };
        let engine = MatchEngine::new(self.config.match_config.clone());
        wait::wait_vanish(
            self.source.as_ref(),
            region,
            pattern,
            &engine,
            &wait_config,
            cancel,
        )
    }

    pub async fn wait_for_async(
        &self,
        region: Region,
        pattern: &Pattern,
        timeout: Duration,
        poll_interval: Duration,
        cancel: &CancelToken,
    ) -> VisionResult<WaitOutcome> {
        let wait_config = WaitConfig {
            timeout,
            poll_interval,
            ..self.config.wait_config.clone()
        };
        wait::wait_for_async(
            Arc::clone(&self.source),
            region,
            pattern.clone(),
            MatchEngine::new(self.config.match_config.clone()),
            wait_config,
            cancel.clone(),
        )
        .await
    }
}

impl std::fmt::Debug for Finder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Finder")
            .field("source", &self.source.name())
            .field("store", &self.store)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_from_environment() {
        let config = FinderConfig::from_lookup(lookup(&[
            (FinderConfig::ENV_THRESHOLD, "0.9"),
            (FinderConfig::ENV_POLL_MS, "25"),
            (FinderConfig::ENV_OVERLAP, " 0.3 "),
        ]));
        assert_eq!(config.default_threshold, 0.9);
        assert_eq!(config.wait_config.poll_interval, Duration::from_millis(25));
        assert_eq!(config.match_config.overlap_fraction, 0.3);
    }

    #[test]
    fn test_bad_environment_values_fall_back_to_defaults() {
        let config = FinderConfig::from_lookup(lookup(&[
            (FinderConfig::ENV_THRESHOLD, "high"),
            (FinderConfig::ENV_POLL_MS, "-5"),
        ]));
        assert_eq!(config, FinderConfig::default());
    }

    #[test]
    fn test_threshold_from_environment_is_clamped() {
        let config = FinderConfig::from_lookup(lookup(&[(FinderConfig::ENV_THRESHOLD, "7")]));
        assert_eq!(config.default_threshold, 1.0);
    }
}
