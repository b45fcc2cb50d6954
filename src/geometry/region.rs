//! Rectangular screen areas with half-open bounds

use super::location::{Location, Offset};
use crate::error::{VisionError, VisionResult};
use serde::Serialize;
use std::fmt;

/// A rectangle `[x, x+w) x [y, y+h)` in display coordinates.
///
/// Width and height are never negative; every constructor checks this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl Region {
    /// Fails with `InvalidGeometry` on a negative size, or when the far edge
    /// `x + w` / `y + h` does not fit in an `i32`.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> VisionResult<Self> {
        if w < 0 || h < 0 {
            return Err(VisionError::invalid_geometry(format!(
                "region [{x},{y},{w},{h}] has negative size"
            )));
        }
        if x.checked_add(w).is_none() || y.checked_add(h).is_none() {
            return Err(VisionError::invalid_geometry(format!(
                "region [{x},{y},{w},{h}] extends past the coordinate range"
            )));
        }
        Ok(Self { x, y, w, h })
    }

    /// Build from wide intermediate values, rejecting anything out of `i32` range
    fn from_wide(x: i64, y: i64, w: i64, h: i64) -> VisionResult<Self> {
        let narrow = |v: i64| {
            i32::try_from(v).map_err(|_| {
                VisionError::invalid_geometry(format!(
                    "region [{x},{y},{w},{h}] is outside the coordinate range"
                ))
            })
        };
        Self::new(narrow(x)?, narrow(y)?, narrow(w)?, narrow(h)?)
    }

    /// Region anchored at the origin, e.g. the bounds of a pixel buffer
    pub fn from_size(width: u32, height: u32) -> VisionResult<Self> {
        let w = i32::try_from(width)
            .map_err(|_| VisionError::invalid_geometry(format!("width {width} out of range")))?;
        let h = i32::try_from(height)
            .map_err(|_| VisionError::invalid_geometry(format!("height {height} out of range")))?;
        Self::new(0, 0, w, h)
    }

    /// Region spanning from `top_left` (inclusive) to `bottom_right` (exclusive)
    pub fn from_locations(top_left: Location, bottom_right: Location) -> VisionResult<Self> {
        Self::from_wide(
            top_left.x as i64,
            top_left.y as i64,
            bottom_right.x as i64 - top_left.x as i64,
            bottom_right.y as i64 - top_left.y as i64,
        )
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn w(&self) -> i32 {
        self.w
    }

    pub fn h(&self) -> i32 {
        self.h
    }

    /// Size as unsigned pixel dimensions
    pub fn size(&self) -> (u32, u32) {
        (self.w as u32, self.h as u32)
    }

    pub fn top_left(&self) -> Location {
        Location::new(self.x, self.y)
    }

    /// First location past the region on both axes
    pub fn bottom_right(&self) -> Location {
        Location::new(self.x + self.w, self.y + self.h)
    }

    pub fn center(&self) -> Location {
        Location::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Half-open containment test
    pub fn contains(&self, p: Location) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    /// Check if `other` lies entirely inside this region
    pub fn contains_region(&self, other: &Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.w <= self.x + self.w
            && other.y + other.h <= self.y + self.h
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.intersection(other).is_some()
    }

    /// Overlapping area of two regions, `None` when they do not share a pixel
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let w = (self.x + self.w).min(other.x + other.w) - x;
        let h = (self.y + self.h).min(other.y + other.h) - y;

        if w > 0 && h > 0 {
            Some(Region { x, y, w, h })
        } else {
            None
        }
    }

    /// Same size moved by `offset`; fails if the result leaves the coordinate range
    pub fn offset(&self, offset: Offset) -> VisionResult<Self> {
        Self::from_wide(
            self.x as i64 + offset.dx as i64,
            self.y as i64 + offset.dy as i64,
            self.w as i64,
            self.h as i64,
        )
    }

    /// Grow (or shrink if negative) this region by a margin on every side
    pub fn grow(&self, margin: i32) -> VisionResult<Self> {
        let m = margin as i64;
        Self::from_wide(
            self.x as i64 - m,
            self.y as i64 - m,
            self.w as i64 + 2 * m,
            self.h as i64 + 2 * m,
        )
    }

    /// Clip this region to `bounds`. Disjoint regions clip to an empty region
    /// at the nearest corner of `bounds`.
    pub fn clip_to(&self, bounds: &Region) -> Region {
        match self.intersection(bounds) {
            Some(clipped) => clipped,
            None => Region {
                x: self.x.clamp(bounds.x, bounds.x + bounds.w),
                y: self.y.clamp(bounds.y, bounds.y + bounds.h),
                w: 0,
                h: 0,
            },
        }
    }

    /// Parse coordinates from a region string (e.g., "300,1682,50,50")
    pub fn parse(region_str: &str) -> VisionResult<Self> {
        let parts: Vec<&str> = region_str.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(VisionError::invalid_geometry(format!(
                "expected x,y,w,h but got '{region_str}'"
            )));
        }
        let mut values = [0i32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse::<i32>().map_err(|e| {
                VisionError::invalid_geometry(format!("bad coordinate '{part}': {e}"))
            })?;
        }
        Self::new(values[0], values[1], values[2], values[3])
    }

    /// Parse a region hint from a filename such as `button-[300,1682,50,50].png`
    pub fn parse_from_filename(filename: &str) -> Option<Self> {
        let start = filename.find('[')?;
        let end = filename[start..].find(']')? + start;
        Self::parse(&filename[start + 1..end]).ok()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{},{}]", self.x, self.y, self.w, self.h)
    }
}
