//! Template matching data types

use crate::geometry::{Location, Region};
use serde::Serialize;
use std::fmt;

/// A located occurrence of a pattern, in screen coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// Area covered by the pattern
    pub region: Region,
    /// Similarity score (0.0-1.0)
    pub score: f32,
    /// Click target: region center moved by the pattern's target offset
    pub target: Location,
}

impl Match {
    pub fn center(&self) -> Location {
        self.region.center()
    }

    pub fn top_left(&self) -> Location {
        self.region.top_left()
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let score_pct = (self.score * 100.0).round() as u32;
        write!(f, "{} target {} - {}%", self.region, self.target, score_pct)
    }
}

/// An offset in frame coordinates that cleared the threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub x: u32,
    pub y: u32,
    pub score: f32,
}
