//! FASTA sequence reader
//!
//! Parsing is delegated to needletail; gzipped files are decompressed with
//! flate2. Records keep their case, the metrics are case-insensitive.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;
use needletail::parse_fastx_reader;

use crate::error::{Result, TelofindError};
use crate::types::SequenceRecord;

/// File extensions recognised as FASTA when scanning a directory
pub const FASTA_EXTENSIONS: [&str; 4] = ["fasta", "fas", "fa", "fsa"];

pub struct FastaParser;

impl FastaParser {
    /// Parse every record of a FASTA file, plain or gzipped
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(TelofindError::EmptyInput(path.to_path_buf()));
        }

        let records = if path.extension().is_some_and(|ext| ext == "gz") {
            Self::parse_reader(BufReader::new(GzDecoder::new(file)))?
        } else {
            Self::parse_reader(BufReader::new(file))?
        };

        if records.is_empty() {
            return Err(TelofindError::EmptyInput(path.to_path_buf()));
        }
        Ok(records)
    }

    /// Parse FASTA data from any readable source
    pub fn parse_reader<R: std::io::Read + Send>(reader: R) -> Result<Vec<SequenceRecord>> {
        let mut fastx_reader = parse_fastx_reader(reader)
            .map_err(|e| TelofindError::Parse(e.to_string()))?;

        let mut records = Vec::new();
        while let Some(record) = fastx_reader.next() {
            let record = record.map_err(|e| TelofindError::Parse(e.to_string()))?;
            records.push(SequenceRecord::new(
                record_name(record.id()),
                record.seq().into_owned(),
            ));
        }
        Ok(records)
    }
}

/// First word of a FASTA header
fn record_name(header: &[u8]) -> String {
    let header = String::from_utf8_lossy(header);
    header
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Reverse complement, keeping case and IUPAC ambiguity codes
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().rev().map(|&base| complement(base)).collect()
}

fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'a' => b't',
        b't' | b'u' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        b'r' => b'y',
        b'y' => b'r',
        b'k' => b'm',
        b'm' => b'k',
        b'b' => b'v',
        b'v' => b'b',
        b'd' => b'h',
        b'h' => b'd',
        other => other, // N, S, W, gaps
    }
}

/// Sample label of a FASTA file: its file name without extension
pub fn strain_name<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether a path has one of [`FASTA_EXTENSIONS`]
pub fn is_fasta_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FASTA_EXTENSIONS.contains(&ext))
}
