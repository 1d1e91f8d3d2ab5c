use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed coordinate; right-side intervals near a short contig start can go below 1.
pub type Coord = i64;

/// A sequence record loaded from a FASTA file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, seq: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            seq: seq.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn reverse_complement(&self) -> Vec<u8> {
        crate::io::fasta::reverse_complement(&self.seq)
    }
}

/// Watson (forward) or Crick (reverse complement) strand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "W")]
    Watson,
    #[serde(rename = "C")]
    Crick,
}

impl Strand {
    pub fn side(self) -> Side {
        match self {
            Strand::Watson => Side::Left,
            Strand::Crick => Side::Right,
        }
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Watson => 'W',
            Strand::Crick => 'C',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// Contig end a telomere belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "Left"),
            Side::Right => write!(f, "Right"),
        }
    }
}

/// Terminal telomeres touch a contig end, internal ones don't
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TelomereKind {
    #[serde(rename = "term")]
    Terminal,
    #[serde(rename = "intern")]
    Internal,
}

impl fmt::Display for TelomereKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelomereKind::Terminal => write!(f, "term"),
            TelomereKind::Internal => write!(f, "intern"),
        }
    }
}

/// Entropy and polynucleotide proportion of one window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub entropy: f64,
    pub polynuc: f64,
}

/// One row of the raw metrics table.
///
/// `position` is in forward coordinates on both strands: a Crick window at
/// offset `i` is reported at `len - i - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub position: Coord,
    pub strand: Strand,
    pub entropy: f64,
    pub polynuc: f64,
    pub predict_telom: bool,
}

/// Raw metrics of every scanned window of one sequence
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SequenceMetrics {
    pub strain: String,
    pub chrom: String,
    pub windows: Vec<MetricsRecord>,
}

/// A classified (or merged) telomere interval, 1-based and inclusive.
///
/// Placeholder rows for a side without any telomere carry `None` coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelomereInterval {
    pub strain: String,
    pub chrom: String,
    pub side: Side,
    pub kind: TelomereKind,
    pub start: Option<Coord>,
    pub end: Option<Coord>,
    pub chrom_size: u64,
}

impl TelomereInterval {
    pub fn placeholder(strain: &str, chrom: &str, side: Side, kind: TelomereKind, chrom_size: u64) -> Self {
        Self {
            strain: strain.to_string(),
            chrom: chrom.to_string(),
            side,
            kind,
            start: None,
            end: None,
            chrom_size,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.start.is_none() || self.end.is_none()
    }

    /// Length of the interval, `end - start + 1`
    pub fn len(&self) -> Option<Coord> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(end - start + 1),
            _ => None,
        }
    }
}
