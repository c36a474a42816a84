// src/partition.rs

//! Window partitioning shared by every stage.
//!
//! Both the template-bank stage and the matched-filter stage call
//! [`partition_segments`]; a linked stage calls it with its companion's
//! parameters, so the two always agree on job boundaries.

use tracing::{debug, warn};

use crate::files::FileList;
use crate::segments::{GpsSeconds, Segment};

/// Parameters of the window-partitioning algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionParams {
    /// Natural length of one job's output window.
    pub window_length: GpsSeconds,
    /// Shortest window worth a job without borrowing extra context.
    pub min_window: GpsSeconds,
    /// Context data needed before the window.
    pub start_margin: GpsSeconds,
    /// Context data needed after the window.
    pub end_margin: GpsSeconds,
    pub allow_overlap: bool,
}

impl PartitionParams {
    /// Data span a job analysing `window` must read.
    ///
    /// Windows shorter than `min_window` borrow the shortfall as extra
    /// leading context.
    pub fn required_span(&self, window: &Segment) -> Segment {
        let shortfall = (self.min_window - window.duration()).max(0);
        window.extend(self.start_margin + shortfall, self.end_margin)
    }
}

/// Why a span of analysable time got no window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Shorter than the minimum window by more than the start margin.
    TooShort,
    /// Could have borrowed context, but no data covers the extended span.
    NoExtensionData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedSpan {
    pub span: Segment,
    pub reason: DropReason,
}

/// Result of partitioning one detector's segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Output windows in non-decreasing start order.
    pub windows: Vec<Segment>,
    pub dropped: Vec<DroppedSpan>,
}

/// Partition `segments` of `detector` into job windows.
///
/// `data` is consulted only to decide whether a short window may borrow extra
/// context; full coverage of every window is checked later by the stage
/// builder.
pub fn partition_segments(
    detector: &str,
    params: &PartitionParams,
    segments: &[Segment],
    data: &FileList,
) -> Partition {
    let mut partition = Partition::default();

    for seg in merge_short_neighbours(segments, params.min_window) {
        carve_segment(detector, params, &seg, data, &mut partition);
    }

    debug!(
        detector = %detector,
        windows = partition.windows.len(),
        dropped = partition.dropped.len(),
        "partitioned segments"
    );
    partition
}

/// Sort segments and merge runs of abutting segments that are each shorter
/// than `min_window`.
fn merge_short_neighbours(segments: &[Segment], min_window: GpsSeconds) -> Vec<Segment> {
    let mut sorted: Vec<Segment> = segments.iter().copied().filter(|s| !s.is_empty()).collect();
    sorted.sort();

    let mut merged: Vec<Segment> = Vec::with_capacity(sorted.len());
    for seg in sorted {
        if let Some(last) = merged.last_mut() {
            if last.end == seg.start
                && last.duration() < min_window
                && seg.duration() < min_window
            {
                last.end = seg.end;
                continue;
            }
        }
        merged.push(seg);
    }
    merged
}

fn carve_segment(
    detector: &str,
    params: &PartitionParams,
    seg: &Segment,
    data: &FileList,
    out: &mut Partition,
) {
    let length = params.window_length;
    let mut cursor = seg.start;

    while seg.end - cursor >= length {
        out.windows.push(Segment::new(cursor, cursor + length));
        cursor += length;
    }

    let remainder = seg.end - cursor;
    if remainder == 0 {
        return;
    }

    let tail = Segment::new(cursor, seg.end);
    if remainder >= params.min_window {
        out.windows.push(tail);
        return;
    }

    if params.allow_overlap && seg.duration() >= length {
        out.windows.push(Segment::new(seg.end - length, seg.end));
        return;
    }

    let shortfall = params.min_window - remainder;
    if shortfall > params.start_margin {
        warn!(
            detector = %detector,
            span = %tail,
            shortfall,
            "span shorter than the minimum job window; dropping"
        );
        out.dropped.push(DroppedSpan {
            span: tail,
            reason: DropReason::TooShort,
        });
        return;
    }

    let required = params.required_span(&tail);
    if data.covers(detector, &required) {
        debug!(
            detector = %detector,
            span = %tail,
            extension = shortfall,
            "short window borrows extra leading context"
        );
        out.windows.push(tail);
    } else {
        warn!(
            detector = %detector,
            span = %tail,
            required = %required,
            "no data for the extended context of a short span; dropping"
        );
        out.dropped.push(DroppedSpan {
            span: tail,
            reason: DropReason::NoExtensionData,
        });
    }
}

/// First pair of consecutive windows that overlap, if any.
pub fn first_overlap(windows: &[Segment]) -> Option<Segment> {
    windows
        .windows(2)
        .find(|pair| pair[0].intersects(&pair[1]))
        .and_then(|pair| pair[0].intersection(&pair[1]))
}
