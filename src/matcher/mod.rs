//! Template matching module for locating patterns in captured frames
//!
//! This module provides:
//! - Zero-mean normalized cross-correlation scored at every offset
//! - An alternative `imageproc` normalized cross-correlation metric
//! - Non-maximum suppression of overlapping detections
//! - Deterministic best-first ordering of the results
pub mod config;
#[allow(clippy::module_inception)]
pub mod matcher;
pub(crate) mod nms;
pub mod types;
pub(crate) mod zncc;


pub use config::{MatchConfig, Metric, create_lenient_config, create_strict_config};
pub use matcher::{MatchEngine, find_with};
pub use types::Match;
