//! Sliding-window scanning of both strands of a sequence

use crate::error::{Result, TelofindError};
use crate::metrics::MetricsEngine;
use crate::types::{Coord, Strand, WindowMetrics};

/// Sentinel scan limit meaning "scan the whole sequence"
pub const SCAN_WHOLE_SEQUENCE: i64 = -1;

/// Fixed-size window sliding by one over `seq[start..end]`.
///
/// Yields `(offset, window)` for offsets in `[start, end - size + 1)`. The
/// iterator borrows the sequence and can be cloned to restart a scan.
#[derive(Debug, Clone)]
pub struct SlidingWindow<'a> {
    seq: &'a [u8],
    next: usize,
    stop: usize,
    size: usize,
}

impl<'a> SlidingWindow<'a> {
    pub fn new(seq: &'a [u8], start: usize, end: usize, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(TelofindError::InvalidParams("window size must be positive".to_string()));
        }
        if size > seq.len() {
            return Err(TelofindError::WindowTooLarge { size, len: seq.len() });
        }

        let end = end.min(seq.len());
        Ok(Self {
            seq,
            next: start,
            stop: (end + 1).saturating_sub(size),
            size,
        })
    }
}

impl<'a> Iterator for SlidingWindow<'a> {
    type Item = (usize, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.stop {
            return None;
        }
        let offset = self.next;
        self.next += 1;
        Some((offset, &self.seq[offset..offset + self.size]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.stop.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SlidingWindow<'_> {}

/// Number of leading nucleotides scanned on each strand
pub fn scan_limit(seq_len: usize, nb_scanned_nt: i64) -> usize {
    if nb_scanned_nt == SCAN_WHOLE_SEQUENCE {
        seq_len
    } else {
        (nb_scanned_nt.max(0) as usize).min(seq_len)
    }
}

/// Metrics of one window, positioned in forward coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannedWindow {
    pub position: Coord,
    pub strand: Strand,
    pub metrics: WindowMetrics,
}

/// Scan the first `limit` nucleotides of one strand.
///
/// For [`Strand::Crick`] `seq` must be the reverse complement of the forward
/// sequence; offsets are then mirrored back to forward coordinates.
pub fn scan_strand(
    seq: &[u8],
    strand: Strand,
    limit: usize,
    engine: &MetricsEngine,
) -> Result<Vec<ScannedWindow>> {
    let len = seq.len() as Coord;
    let windows = SlidingWindow::new(seq, 0, limit, engine.window_size())?;

    let scanned: Vec<ScannedWindow> = windows
        .map(|(offset, window)| {
            let offset = offset as Coord;
            let position = match strand {
                Strand::Watson => offset,
                Strand::Crick => len - offset - 1,
            };
            ScannedWindow {
                position,
                strand,
                metrics: engine.compute(window),
            }
        })
        .collect();

    log::debug!("Scanned {} windows on strand {}", scanned.len(), strand);
    Ok(scanned)
}

/// Scan the forward strand and its reverse complement.
///
/// Watson windows come first, then Crick windows, each in offset order.
pub fn scan_both_strands(
    forward: &[u8],
    reverse_complement: &[u8],
    nb_scanned_nt: i64,
    engine: &MetricsEngine,
) -> Result<Vec<ScannedWindow>> {
    let limit = scan_limit(forward.len(), nb_scanned_nt);
    let mut windows = scan_strand(forward, Strand::Watson, limit, engine)?;
    windows.extend(scan_strand(reverse_complement, Strand::Crick, limit, engine)?);
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::fasta::reverse_complement;

    #[test]
    fn test_sliding_window_offsets() {
        let seq = b"ACGTACGTAC";
        let windows: Vec<_> = SlidingWindow::new(seq, 0, seq.len(), 4).unwrap().collect();
        assert_eq!(windows.len(), 7);
        assert_eq!(windows[0], (0, &b"ACGT"[..]));
        assert_eq!(windows[6], (6, &b"GTAC"[..]));
    }

    #[test]
    fn test_sliding_window_partial_range() {
        let seq = b"ACGTACGTAC";
        let offsets: Vec<usize> = SlidingWindow::new(seq, 2, 8, 3)
            .unwrap()
            .map(|(offset, _)| offset)
            .collect();
        assert_eq!(offsets, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_sliding_window_restartable() {
        let seq = b"ACGTACGT";
        let windows = SlidingWindow::new(seq, 0, seq.len(), 2).unwrap();
        let first: Vec<_> = windows.clone().collect();
        let second: Vec<_> = windows.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_window_larger_than_sequence_fails() {
        let result = SlidingWindow::new(b"ACGT", 0, 4, 20);
        assert!(matches!(
            result,
            Err(TelofindError::WindowTooLarge { size: 20, len: 4 })
        ));
    }

    #[test]
    fn test_window_equal_to_sequence() {
        let windows: Vec<_> = SlidingWindow::new(b"ACGT", 0, 4, 4).unwrap().collect();
        assert_eq!(windows.len(), 1);
    }

    #[test]
    fn test_scan_limit() {
        assert_eq!(scan_limit(100, SCAN_WHOLE_SEQUENCE), 100);
        assert_eq!(scan_limit(100, 40), 40);
        assert_eq!(scan_limit(100, 500), 100);
    }

    #[test]
    fn test_one_record_per_position_and_strand() {
        let forward = b"ACGTTGCAACGTTGCAACGTTGCAACGTAAAC".to_vec();
        let rc = reverse_complement(&forward);
        let engine = MetricsEngine::default();

        let windows = scan_both_strands(&forward, &rc, SCAN_WHOLE_SEQUENCE, &engine).unwrap();
        let expected_per_strand = forward.len() - 20 + 1;
        assert_eq!(windows.len(), 2 * expected_per_strand);

        let mut keys: Vec<(Coord, Strand)> = windows.iter().map(|w| (w.position, w.strand)).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), windows.len());
    }

    #[test]
    fn test_crick_positions_are_mirrored() {
        let forward = vec![b'A'; 30];
        let rc = reverse_complement(&forward);
        let engine = MetricsEngine::default();

        let crick = scan_strand(&rc, Strand::Crick, 30, &engine).unwrap();
        assert_eq!(crick.first().map(|w| w.position), Some(29));
        assert_eq!(crick.last().map(|w| w.position), Some(19));
    }

    #[test]
    fn test_scan_limit_restricts_windows() {
        let forward = vec![b'C'; 100];
        let rc = reverse_complement(&forward);
        let engine = MetricsEngine::default();

        let windows = scan_both_strands(&forward, &rc, 30, &engine).unwrap();
        // offsets 0..=10 on each strand
        assert_eq!(windows.len(), 22);
    }
}
