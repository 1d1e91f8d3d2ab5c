//! Merging of nearby telomere intervals
//!
//! Classified intervals closer than a gap tolerance are coalesced and the
//! merged spans are re-labelled terminal when they reach a contig end.

use crate::types::{Coord, TelomereInterval, TelomereKind};

/// Maximum gap, in nucleotides, between two intervals that are merged
pub const MERGE_DISTANCE: Coord = 20;

/// Distance from a contig end under which a merged interval is terminal
pub const TERMINAL_MARGIN: Coord = 20;

/// A named interval as handled by the interval algebra
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BedInterval {
    pub chrom: String,
    pub start: Coord,
    pub end: Coord,
}

impl BedInterval {
    pub fn new(chrom: impl Into<String>, start: Coord, end: Coord) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }
}

/// A set of intervals supporting sort and distance-tolerant merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSet {
    intervals: Vec<BedInterval>,
}

impl IntervalSet {
    pub fn new(intervals: Vec<BedInterval>) -> Self {
        Self { intervals }
    }

    pub fn intervals(&self) -> &[BedInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Merge intervals of the same chromosome lying at most `distance` apart.
    ///
    /// The gap is measured as `next.start - current.end`, so overlapping and
    /// book-ended intervals always merge. Merging a merged set again with the
    /// same distance changes nothing.
    pub fn merge(&self, distance: Coord) -> IntervalSet {
        let mut sorted = self.intervals.clone();
        sorted.sort();

        let mut merged: Vec<BedInterval> = Vec::with_capacity(sorted.len());
        for interval in sorted {
            match merged.last_mut() {
                Some(current)
                    if current.chrom == interval.chrom && interval.start - current.end <= distance =>
                {
                    current.end = current.end.max(interval.end);
                }
                _ => merged.push(interval),
            }
        }

        IntervalSet { intervals: merged }
    }
}

impl FromIterator<BedInterval> for IntervalSet {
    fn from_iter<T: IntoIterator<Item = BedInterval>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Merge the classified intervals of one sequence.
///
/// When the sequence has no telomere at all the classified rows are returned
/// as they are. Otherwise placeholders are dropped, the remaining intervals
/// are merged within [`MERGE_DISTANCE`], side and type are taken from the
/// first classified row sharing the merged start, and any merged span within
/// [`TERMINAL_MARGIN`] of either contig end becomes terminal.
pub fn merge_telomeres(classified: &[TelomereInterval], chrom_len: usize) -> Vec<TelomereInterval> {
    if classified.iter().all(TelomereInterval::is_placeholder) {
        return classified.to_vec();
    }

    let located: Vec<&TelomereInterval> = classified.iter().filter(|r| !r.is_placeholder()).collect();
    let set: IntervalSet = located
        .iter()
        .filter_map(|r| Some(BedInterval::new(r.chrom.clone(), r.start?, r.end?)))
        .collect();

    let chrom_len = chrom_len as Coord;
    set.merge(MERGE_DISTANCE)
        .intervals()
        .iter()
        .filter_map(|span| {
            // one row per merged span: the first classified row with that start wins
            let Some(origin) = located
                .iter()
                .find(|r| r.chrom == span.chrom && r.start == Some(span.start))
            else {
                log::warn!("No classified interval starts at {}:{}", span.chrom, span.start);
                return None;
            };

            let kind = if span.end > chrom_len - TERMINAL_MARGIN || span.start < TERMINAL_MARGIN {
                TelomereKind::Terminal
            } else {
                origin.kind
            };

            Some(TelomereInterval {
                strain: origin.strain.clone(),
                chrom: span.chrom.clone(),
                side: origin.side,
                kind,
                start: Some(span.start),
                end: Some(span.end),
                chrom_size: origin.chrom_size,
            })
        })
        .collect()
}
