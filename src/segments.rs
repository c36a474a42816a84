// src/segments.rs

//! GPS time intervals.
//!
//! Only the handful of interval operations the planner needs live here;
//! general segment-list algebra belongs to whoever produces the science
//! segments.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Whole GPS seconds.
pub type GpsSeconds = i64;

/// Detector identifier such as `"H1"` or `"L1"`.
pub type Detector = String;

/// Analysable segments keyed by detector.
///
/// Each value is expected to be ordered and non-overlapping. Detectors are
/// processed in key order.
pub type SegmentsByDetector = BTreeMap<Detector, Vec<Segment>>;

/// Half-open interval `[start, end)` of GPS time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Segment {
    pub start: GpsSeconds,
    pub end: GpsSeconds,
}

impl Segment {
    /// Build a segment; `end` is clamped so that the segment is never negative.
    pub fn new(start: GpsSeconds, end: GpsSeconds) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn duration(&self) -> GpsSeconds {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Segment) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if the two segments share at least one second.
    pub fn intersects(&self, other: &Segment) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn intersection(&self, other: &Segment) -> Option<Segment> {
        if self.intersects(other) {
            Some(Segment::new(
                self.start.max(other.start),
                self.end.min(other.end),
            ))
        } else {
            None
        }
    }

    /// Grow the segment by `before` seconds at the start and `after` at the end.
    pub fn extend(&self, before: GpsSeconds, after: GpsSeconds) -> Segment {
        Segment::new(self.start - before, self.end + after)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// True if `segments` is sorted by start time and no two entries overlap.
pub fn is_ordered_disjoint(segments: &[Segment]) -> bool {
    segments
        .windows(2)
        .all(|pair| pair[0].end <= pair[1].start)
}
