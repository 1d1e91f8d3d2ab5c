//! Telomere classification
//!
//! Windows are called telomeric by thresholding their metrics, positive calls
//! are grouped into runs of consecutive positions on each strand, and each run
//! is classified as terminal or internal for its contig side.

use crate::scan::ScannedWindow;
use crate::types::{Coord, MetricsRecord, Side, Strand, TelomereInterval, TelomereKind, WindowMetrics};
use serde::{Deserialize, Serialize};

/// Thresholds used to call a window telomeric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum polynucleotide proportion (exclusive)
    #[serde(default = "default_threshold")]
    pub polynuc: f64,
    /// Maximum entropy (exclusive)
    #[serde(default = "default_threshold")]
    pub entropy: f64,
}

fn default_threshold() -> f64 { 0.8 }

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            polynuc: default_threshold(),
            entropy: default_threshold(),
        }
    }
}

impl Thresholds {
    /// A window is telomeric when its entropy is low and its polynucleotide
    /// proportion is high. NaN metrics never pass.
    pub fn is_telomeric(&self, metrics: &WindowMetrics) -> bool {
        metrics.entropy < self.entropy && metrics.polynuc > self.polynuc
    }
}

/// Attach the telomere call to every scanned window
pub fn label_windows(windows: &[ScannedWindow], thresholds: &Thresholds) -> Vec<MetricsRecord> {
    windows
        .iter()
        .map(|w| MetricsRecord {
            position: w.position,
            strand: w.strand,
            entropy: w.metrics.entropy,
            polynuc: w.metrics.polynuc,
            predict_telom: thresholds.is_telomeric(&w.metrics),
        })
        .collect()
}

/// A run of consecutive positive positions, inclusive, in forward coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RawInterval {
    pub start: Coord,
    pub end: Coord,
}

impl RawInterval {
    pub fn new(start: Coord, end: Coord) -> Self {
        Self { start, end }
    }
}

/// Partition positions into maximal runs of consecutive integers.
///
/// Input order and duplicates don't matter; runs come out in ascending order.
pub fn consecutive_groups<I>(positions: I) -> Vec<RawInterval>
where
    I: IntoIterator<Item = Coord>,
{
    let mut nums: Vec<Coord> = positions.into_iter().collect();
    nums.sort_unstable();
    nums.dedup();

    let mut groups = Vec::new();
    let mut iter = nums.into_iter();
    let Some(first) = iter.next() else {
        return groups;
    };

    let mut current = RawInterval::new(first, first);
    for pos in iter {
        if pos == current.end + 1 {
            current.end = pos;
        } else {
            groups.push(current);
            current = RawInterval::new(pos, pos);
        }
    }
    groups.push(current);
    groups
}

/// Telomeric runs found on each strand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrandGroups {
    pub watson: Vec<RawInterval>,
    pub crick: Vec<RawInterval>,
}

impl StrandGroups {
    pub fn get(&self, strand: Strand) -> &[RawInterval] {
        match strand {
            Strand::Watson => &self.watson,
            Strand::Crick => &self.crick,
        }
    }
}

/// Group the positive calls of each strand into runs
pub fn group_by_strand(records: &[MetricsRecord]) -> StrandGroups {
    let positives = |strand: Strand| {
        records
            .iter()
            .filter(move |r| r.strand == strand && r.predict_telom)
            .map(|r| r.position)
    };

    StrandGroups {
        watson: consecutive_groups(positives(Strand::Watson)),
        crick: consecutive_groups(positives(Strand::Crick)),
    }
}

/// Tag each run of one side as terminal or internal.
///
/// `intervals` must be sorted ascending. On the left side the run starting at
/// position 0 is terminal; on the right side the run ending at the last
/// position is. Every other run, including any later run that also touches
/// the boundary, is internal.
pub fn terminal_kinds(intervals: &[RawInterval], side: Side, chrom_len: usize) -> Vec<TelomereKind> {
    let terminal_idx = match side {
        Side::Left => intervals
            .first()
            .filter(|iv| iv.start == 0)
            .map(|_| 0),
        Side::Right => intervals
            .last()
            .filter(|iv| iv.end == chrom_len as Coord - 1)
            .map(|_| intervals.len() - 1),
    };

    (0..intervals.len())
        .map(|idx| {
            if Some(idx) == terminal_idx {
                TelomereKind::Terminal
            } else {
                TelomereKind::Internal
            }
        })
        .collect()
}

/// Convert a run of window positions to 1-based inclusive coordinates
/// covering the full extent of the windows.
///
/// Watson positions are window starts, so the end grows by `window_size - 1`;
/// Crick positions are window ends, so the start shrinks by the same amount.
pub fn window_extent(interval: &RawInterval, side: Side, window_size: usize) -> (Coord, Coord) {
    let extension = window_size as Coord - 1;
    match side {
        Side::Left => (interval.start + 1, interval.end + 1 + extension),
        Side::Right => (interval.start + 1 - extension, interval.end + 1),
    }
}

/// Classify the runs of both strands of a sequence.
///
/// Left rows come before right rows; within a side the terminal row comes
/// first, then the internal rows in ascending order. A side without runs
/// yields a terminal and an internal placeholder.
pub fn classify_telomeres(
    groups: &StrandGroups,
    strain: &str,
    chrom: &str,
    chrom_len: usize,
    window_size: usize,
) -> Vec<TelomereInterval> {
    let mut rows = Vec::new();

    for strand in [Strand::Watson, Strand::Crick] {
        let side = strand.side();
        let intervals = groups.get(strand);

        if intervals.is_empty() {
            for kind in [TelomereKind::Terminal, TelomereKind::Internal] {
                rows.push(TelomereInterval::placeholder(strain, chrom, side, kind, chrom_len as u64));
            }
            continue;
        }

        let kinds = terminal_kinds(intervals, side, chrom_len);
        let mut side_rows: Vec<TelomereInterval> = intervals
            .iter()
            .zip(kinds)
            .map(|(interval, kind)| {
                let (start, end) = window_extent(interval, side, window_size);
                TelomereInterval {
                    strain: strain.to_string(),
                    chrom: chrom.to_string(),
                    side,
                    kind,
                    start: Some(start),
                    end: Some(end),
                    chrom_size: chrom_len as u64,
                }
            })
            .collect();

        // stable: internal rows keep their ascending order
        side_rows.sort_by_key(|row| row.kind != TelomereKind::Terminal);
        rows.extend(side_rows);
    }

    rows
}
