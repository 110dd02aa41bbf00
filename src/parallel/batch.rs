//! Batch boundaries for progress reporting.
//!
//! The Monte Carlo runner spreads each batch of repetitions across the pool
//! and reports progress between batches.

use std::ops::Range;

/// Split `0..total` into at most `batches` contiguous ranges whose sizes
/// differ by at most one, larger ranges first.
///
/// ```
/// # use macrosim::parallel::batch_ranges;
/// assert_eq!(batch_ranges(10, 3), vec![0..4, 4..7, 7..10]);
/// ```
pub fn batch_ranges(total: usize, batches: usize) -> Vec<Range<usize>> {
    if total == 0 || batches == 0 {
        return Vec::new();
    }
    let batches = batches.min(total);
    let (size, extra) = (total / batches, total % batches);
    let mut start = 0;
    (0..batches)
        .map(|i| {
            let end = start + size + usize::from(i < extra);
            let range = start..end;
            start = end;
            range
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_cover_every_run_once() {
        for (total, batches) in [(1000, 20), (7, 3), (3, 10), (64, 64)] {
            let ranges = batch_ranges(total, batches);
            assert_eq!(ranges.first().map(|r| r.start), Some(0));
            assert_eq!(ranges.last().map(|r| r.end), Some(total));
            assert!(ranges.windows(2).all(|w| w[0].end == w[1].start));
            assert!(ranges.len() <= batches);
        }
    }

    #[test]
    fn sizes_differ_by_at_most_one() {
        let sizes: Vec<usize> = batch_ranges(23, 5).iter().map(|r| r.len()).collect();
        assert_eq!(sizes, vec![5, 5, 5, 4, 4]);
    }

    #[test]
    fn nothing_to_split() {
        assert!(batch_ranges(0, 4).is_empty());
        assert!(batch_ranges(12, 0).is_empty());
    }
}
