//! Window metrics for telomere detection
//!
//! Computes the composition entropy and the polynucleotide proportion of a
//! fixed-size sequence window.

use crate::error::{Result, TelofindError};
use crate::types::WindowMetrics;
use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW_SIZE: usize = 20;
pub const DEFAULT_POLYNUCLEOTIDES: [&str; 3] = ["AC", "CA", "CC"];

/// Parameters of the metrics engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsParams {
    /// Sliding window size in nucleotides
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Polynucleotides counted in the window, all of the same length
    #[serde(default = "default_polynucleotides")]
    pub polynucleotides: Vec<String>,
}

fn default_window_size() -> usize { DEFAULT_WINDOW_SIZE }
fn default_polynucleotides() -> Vec<String> {
    DEFAULT_POLYNUCLEOTIDES.iter().map(|p| p.to_string()).collect()
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            polynucleotides: default_polynucleotides(),
        }
    }
}

impl MetricsParams {
    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 {
            return Err(TelofindError::InvalidParams(format!(
                "window size must be at least 2, got {}",
                self.window_size
            )));
        }

        let motif_len = match self.polynucleotides.first() {
            Some(first) => first.len(),
            None => {
                return Err(TelofindError::InvalidParams(
                    "polynucleotide list is empty".to_string(),
                ))
            }
        };

        if motif_len == 0 || motif_len > self.window_size {
            return Err(TelofindError::InvalidParams(format!(
                "polynucleotide length must be between 1 and the window size ({}), got {}",
                self.window_size, motif_len
            )));
        }

        if let Some(bad) = self.polynucleotides.iter().find(|p| p.len() != motif_len) {
            return Err(TelofindError::InvalidParams(format!(
                "all polynucleotides must have the same length, '{}' differs",
                bad
            )));
        }

        Ok(())
    }
}

/// Entropy of a window over A, T, G and C.
///
/// Each present base contributes `-(f * ln f)` with `f = count / window_len`.
/// The frequencies are taken over the full window length, so windows holding
/// other symbols (N, gaps) do not form a proper distribution; thresholds are
/// tuned against this exact definition.
pub fn entropy(window: &[u8]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }

    let mut counts = [0usize; 4];
    for &base in window {
        match base.to_ascii_uppercase() {
            b'A' => counts[0] += 1,
            b'T' => counts[1] += 1,
            b'G' => counts[2] += 1,
            b'C' => counts[3] += 1,
            _ => {}
        }
    }

    let len = window.len() as f64;
    counts
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let freq = count as f64 / len;
            -(freq * freq.ln())
        })
        .sum()
}

/// Proportion of sub-windows found in `polynucleotides`.
///
/// Sub-windows have the motif length and slide by one; the count is divided
/// by `window_len - 1`. Motifs must be upper case.
pub fn polynuc_frequency(window: &[u8], polynucleotides: &[Vec<u8>]) -> f64 {
    let motif_len = match polynucleotides.first() {
        Some(motif) => motif.len(),
        None => return 0.0,
    };
    if window.len() < 2 || motif_len == 0 || motif_len > window.len() {
        return 0.0;
    }

    let upper = window.to_ascii_uppercase();
    let hits = upper
        .windows(motif_len)
        .filter(|sub| polynucleotides.iter().any(|motif| motif.as_slice() == *sub))
        .count();

    hits as f64 / (window.len() - 1) as f64
}

/// Computes [`WindowMetrics`] for windows of a configured size
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    window_size: usize,
    polynucleotides: Vec<Vec<u8>>,
}

impl MetricsEngine {
    pub fn new(params: &MetricsParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            window_size: params.window_size,
            polynucleotides: params
                .polynucleotides
                .iter()
                .map(|p| p.as_bytes().to_ascii_uppercase())
                .collect(),
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn compute(&self, window: &[u8]) -> WindowMetrics {
        debug_assert_eq!(window.len(), self.window_size);
        WindowMetrics {
            entropy: entropy(window),
            polynuc: polynuc_frequency(window, &self.polynucleotides),
        }
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            polynucleotides: DEFAULT_POLYNUCLEOTIDES
                .iter()
                .map(|p| p.as_bytes().to_vec())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_motifs() -> Vec<Vec<u8>> {
        DEFAULT_POLYNUCLEOTIDES.iter().map(|p| p.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_entropy_single_base_is_zero() {
        assert_eq!(entropy(b"AAAAAAAAAAAAAAAAAAAA"), 0.0);
        assert_eq!(entropy(b"cccccccccccccccccccc"), 0.0);
    }

    #[test]
    fn test_entropy_without_nucleotides_is_zero() {
        assert_eq!(entropy(b"NNNNNNNNNNNNNNNNNNNN"), 0.0);
        assert_eq!(entropy(b"--------------------"), 0.0);
    }

    #[test]
    fn test_entropy_uniform_window() {
        // five of each base: 4 * -(0.25 * ln 0.25) = ln 4
        let value = entropy(b"ACGTACGTACGTACGTACGT");
        assert!((value - 4.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_is_not_renormalised() {
        // 10 A + 10 N: only A contributes, with f = 0.5
        let value = entropy(b"AAAAAAAAAANNNNNNNNNN");
        assert!((value - (-(0.5f64 * 0.5f64.ln()))).abs() < 1e-12);
    }

    #[test]
    fn test_polynuc_full_match() {
        // CA CC CA... every adjacent pair is AC, CA or CC
        let value = polynuc_frequency(b"CACCACACCCACACCACACC", &default_motifs());
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_polynuc_no_match() {
        let value = polynuc_frequency(b"GTGTGTGTGTGTGTGTGTGT", &default_motifs());
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_polynuc_is_case_insensitive() {
        let upper = polynuc_frequency(b"CACCACACCCACACCACACC", &default_motifs());
        let lower = polynuc_frequency(b"caccacacccacaccacacc", &default_motifs());
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_polynuc_partial() {
        // pairs: AC CG GT TA AC -> 2 hits over 5
        let value = polynuc_frequency(b"ACGTAC", &default_motifs());
        assert!((value - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_engine_compute() {
        let engine = MetricsEngine::new(&MetricsParams::default()).unwrap();
        let metrics = engine.compute(b"CCCCCCCCCCCCCCCCCCCC");
        assert_eq!(metrics.entropy, 0.0);
        assert_eq!(metrics.polynuc, 1.0);
    }

    #[test]
    fn test_params_validation() {
        assert!(MetricsParams::default().validate().is_ok());

        let mixed = MetricsParams {
            polynucleotides: vec!["AC".to_string(), "CCA".to_string()],
            ..Default::default()
        };
        assert!(mixed.validate().is_err());

        let empty = MetricsParams {
            polynucleotides: Vec::new(),
            ..Default::default()
        };
        assert!(empty.validate().is_err());

        let tiny = MetricsParams {
            window_size: 1,
            ..Default::default()
        };
        assert!(tiny.validate().is_err());
    }
}
