//! Contig-end telomere length estimation
//!
//! A lighter alternative to the window classifier: from each contig end,
//! skip the non-telomeric offset and count consecutive C/A-rich windows.
//! Counting is case-sensitive, so soft-masked (lower case) bases never match.

use std::path::Path;

use crate::error::{Result, TelofindError};
use crate::io::fasta::{strain_name, FastaParser};
use crate::pipeline::fasta_files_in;
use crate::types::{SequenceRecord, Side};
use serde::Serialize;

const WINDOW: usize = 20;
const MAX_OFFSET_SCAN: usize = 1500;

/// Telomere length and offset at one contig end
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelomereLength {
    #[serde(rename = "Strain")]
    pub strain: String,
    #[serde(rename = "Chromosome")]
    pub chrom: String,
    #[serde(rename = "Contig_side", serialize_with = "serialize_side")]
    pub side: Side,
    #[serde(rename = "Telom_length")]
    pub length: usize,
    #[serde(rename = "Offset")]
    pub offset: usize,
}

fn serialize_side<S: serde::Serializer>(side: &Side, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(match side {
        Side::Left => "L",
        Side::Right => "R",
    })
}

fn count(window: &[u8], base: u8) -> usize {
    window.iter().filter(|&&b| b == base).count()
}

/// Window starting at `start`, clipped at the end of the sequence
fn window_at(seq: &[u8], start: usize) -> &[u8] {
    let start = start.min(seq.len());
    &seq[start..(start + WINDOW).min(seq.len())]
}

fn is_telomeric_window(window: &[u8]) -> bool {
    let c = count(window, b'C');
    let a = count(window, b'A');
    c >= 8 && a >= 3 && c + a >= 17 && !window.windows(4).any(|w| w == b"AAAA")
}

/// Estimate `(length, offset)` at the start of `seq`
pub fn estimate_end(seq: &[u8]) -> (usize, usize) {
    let limit = if seq.len() < MAX_OFFSET_SCAN {
        seq.len().saturating_sub(9)
    } else {
        MAX_OFFSET_SCAN
    };

    let offset = (0..limit)
        .take_while(|&i| {
            let window = window_at(seq, i);
            count(window, b'C') + count(window, b'A') < 19
        })
        .count();

    let telomeric = (offset..seq.len().saturating_sub(19))
        .take_while(|&j| is_telomeric_window(window_at(seq, j)))
        .count();

    if telomeric == 0 {
        (0, 0)
    } else {
        let offset = if offset == 0 { 0 } else { offset + 1 };
        (WINDOW + telomeric - 3, offset)
    }
}

/// Left and right telomere lengths of a record
pub fn estimate_contig_ends(record: &SequenceRecord, strain: &str) -> [TelomereLength; 2] {
    let (left_len, left_offset) = estimate_end(&record.seq);
    let (right_len, right_offset) = estimate_end(&record.reverse_complement());

    log::info!(
        "{}: left telom length = {}, left offset = {}, right telom length = {}, right offset = {}",
        record.id,
        left_len,
        left_offset,
        right_len,
        right_offset
    );

    [
        TelomereLength {
            strain: strain.to_string(),
            chrom: record.id.clone(),
            side: Side::Left,
            length: left_len,
            offset: left_offset,
        },
        TelomereLength {
            strain: strain.to_string(),
            chrom: record.id.clone(),
            side: Side::Right,
            length: right_len,
            offset: right_offset,
        },
    ]
}

/// Contig-end lengths of every record in a FASTA file, strain named after the file
pub fn estimate_fasta<P: AsRef<Path>>(fasta_path: P) -> Result<Vec<TelomereLength>> {
    let fasta_path = fasta_path.as_ref();
    let strain = strain_name(fasta_path);
    let records = FastaParser::parse_file(fasta_path)?;
    Ok(records
        .iter()
        .flat_map(|record| estimate_contig_ends(record, &strain))
        .collect())
}

/// Single-file or directory mode, like [`crate::run_on_path`]
pub fn estimate_on_path<P: AsRef<Path>>(path: P) -> Result<Vec<TelomereLength>> {
    let path = path.as_ref();
    if !path.is_dir() {
        log::info!("'{}' is a file. Running in single mode.", path.display());
        return estimate_fasta(path);
    }

    log::info!("'{}' is a directory. Running in iterative mode.", path.display());
    let files = fasta_files_in(path)?;
    if files.is_empty() {
        return Err(TelofindError::EmptyInput(path.to_path_buf()));
    }
    let mut rows = Vec::new();
    for fasta in &files {
        rows.extend(estimate_fasta(fasta)?);
    }
    Ok(rows)
}

pub fn write_lengths_csv<W: std::io::Write>(writer: W, rows: &[TelomereLength]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::fasta::reverse_complement;

    const REPEAT: &[u8] = b"CCCACACACCACACCCACAC";
    const FILLER: &[u8] = b"GATTGCATGTACGTAGCTAG";

    #[test]
    fn test_no_telomere() {
        let seq = FILLER.repeat(10);
        assert_eq!(estimate_end(&seq), (0, 0));
    }

    #[test]
    fn test_telomere_at_contig_start() {
        let mut seq = REPEAT.repeat(3);
        seq.extend(FILLER.repeat(10));
        let (length, offset) = estimate_end(&seq);
        assert_eq!(offset, 0);
        assert!(length >= 40, "length {}", length);
    }

    #[test]
    fn test_offset_before_telomere() {
        let mut seq = FILLER.to_vec();
        seq.extend(REPEAT.repeat(3));
        seq.extend(FILLER.repeat(10));
        let (length, offset) = estimate_end(&seq);
        assert!(length > 0);
        assert!(offset > 0 && offset <= FILLER.len() + 1);
    }

    #[test]
    fn test_right_end_uses_reverse_complement() {
        let mut seq = FILLER.repeat(10);
        seq.extend(reverse_complement(&REPEAT.repeat(3)));
        let record = SequenceRecord::new("chrI", seq);

        let [left, right] = estimate_contig_ends(&record, "S288C");
        assert_eq!(left.side, Side::Left);
        assert_eq!(left.length, 0);
        assert_eq!(right.side, Side::Right);
        assert!(right.length > 0);
    }

    #[test]
    fn test_lowercase_is_ignored() {
        let mut seq = REPEAT.to_ascii_lowercase().repeat(3);
        seq.extend(FILLER.repeat(10));
        assert_eq!(estimate_end(&seq), (0, 0));
    }

    #[test]
    fn test_short_sequence() {
        assert_eq!(estimate_end(b"CCCA"), (0, 0));
        assert_eq!(estimate_end(b""), (0, 0));
    }

    #[test]
    fn test_lengths_csv() {
        let record = SequenceRecord::new("chrI", FILLER.repeat(5));
        let rows = estimate_contig_ends(&record, "S288C");
        let mut out = Vec::new();
        write_lengths_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Strain\tChromosome\tContig_side\tTelom_length\tOffset");
        assert_eq!(lines[1], "S288C\tchrI\tL\t0\t0");
        assert_eq!(lines[2], "S288C\tchrI\tR\t0\t0");
    }

    #[test]
    fn test_estimate_on_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut seq = REPEAT.repeat(3);
        seq.extend(FILLER.repeat(10));
        let body = format!(">chr1\n{}\n>chr2\n{}\n", String::from_utf8(seq).unwrap(), String::from_utf8(FILLER.repeat(4)).unwrap());
        std::fs::write(dir.path().join("y1.fa"), &body).unwrap();
        std::fs::write(dir.path().join("y2.fasta"), &body).unwrap();

        let rows = estimate_on_path(dir.path()).unwrap();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].strain, "y1");
        assert_eq!(rows[4].strain, "y2");
        assert!(rows[0].length > 0);
        assert_eq!(rows[2].length, 0);
    }
}
