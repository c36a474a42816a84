// tests/partition_properties.rs

use proptest::prelude::*;
use gwflow::files::FileList;
use gwflow::partition::{PartitionParams, first_overlap, partition_segments};
use gwflow::segments::Segment;
use gwflow_test_utils::builders::data_records;

// Sorted, disjoint segments; a zero gap makes two segments abut.
fn segments_strategy() -> impl Strategy<Value = Vec<Segment>> {
    proptest::collection::vec((0..500i64, 1..5000i64), 1..8).prop_map(|pieces| {
        let mut cursor = 0;
        let mut out = Vec::with_capacity(pieces.len());
        for (gap, len) in pieces {
            let start = cursor + gap;
            out.push(Segment::new(start, start + len));
            cursor = start + len;
        }
        out
    })
}

fn params_strategy() -> impl Strategy<Value = PartitionParams> {
    (500..3000i64, 0..512i64, 0..512i64).prop_flat_map(|(window, start_margin, end_margin)| {
        (1..=window).prop_map(move |min_window| PartitionParams {
            window_length: window,
            min_window,
            start_margin,
            end_margin,
            allow_overlap: false,
        })
    })
}

fn covered_by(window: &Segment, segments: &[Segment]) -> i64 {
    segments
        .iter()
        .filter_map(|s| s.intersection(window))
        .map(|s| s.duration())
        .sum()
}

proptest! {
    #[test]
    fn windows_are_ordered_disjoint_and_inside_segments(
        segs in segments_strategy(),
        params in params_strategy(),
        with_data in any::<bool>(),
    ) {
        let end = segs.last().map(|s| s.end).unwrap_or(0);
        let data = if with_data {
            data_records(&[("H1", -10_000, end + 10_000)])
        } else {
            FileList::new()
        };

        let partition = partition_segments("H1", &params, &segs, &data);

        prop_assert_eq!(first_overlap(&partition.windows), None);
        prop_assert!(partition.windows.windows(2).all(|w| w[0].start <= w[1].start));

        for window in &partition.windows {
            prop_assert!(!window.is_empty());
            prop_assert!(window.duration() <= params.window_length);
            prop_assert_eq!(covered_by(window, &segs), window.duration());
            if window.duration() < params.min_window {
                prop_assert!(params.min_window - window.duration() <= params.start_margin);
                prop_assert!(with_data);
            }
        }
    }

    #[test]
    fn every_second_is_either_windowed_or_dropped(
        segs in segments_strategy(),
        params in params_strategy(),
    ) {
        let partition = partition_segments("H1", &params, &segs, &FileList::new());

        let live: i64 = segs.iter().map(|s| s.duration()).sum();
        let windowed: i64 = partition.windows.iter().map(|w| w.duration()).sum();
        let dropped: i64 = partition.dropped.iter().map(|d| d.span.duration()).sum();

        prop_assert_eq!(windowed + dropped, live);
    }

    #[test]
    fn partitioning_is_deterministic(
        segs in segments_strategy(),
        params in params_strategy(),
    ) {
        let mut shuffled = segs.clone();
        shuffled.reverse();

        let a = partition_segments("H1", &params, &segs, &FileList::new());
        let b = partition_segments("H1", &params, &shuffled, &FileList::new());

        prop_assert_eq!(a, b);
    }
}
