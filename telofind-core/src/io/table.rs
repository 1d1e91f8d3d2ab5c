//! CSV and BED output of the telomere tables
//!
//! The core builds its tables in memory; this module is the only place they
//! touch the filesystem.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TelofindError};
use crate::pipeline::TelomereTables;
use crate::types::{Coord, SequenceMetrics, Side, Strand, TelomereInterval, TelomereKind};

pub const CLASSIFIED_CSV: &str = "telom_df.csv";
pub const MERGED_CSV: &str = "merged_telom_df.csv";
pub const CLASSIFIED_BED: &str = "telom.bed";
pub const MERGED_BED: &str = "telom_merged.bed";
pub const RAW_CSV: &str = "raw_df.csv";

#[derive(Debug, Serialize)]
struct RawRow<'a> {
    strain: &'a str,
    chrom: &'a str,
    position: Coord,
    strand: Strand,
    entropy: f64,
    polynuc: f64,
    predict_telom: u8,
}

#[derive(Debug, Serialize)]
struct ClassifiedRow<'a> {
    strain: &'a str,
    chrom: &'a str,
    side: Side,
    #[serde(rename = "type")]
    kind: TelomereKind,
    start: Option<Coord>,
    end: Option<Coord>,
    len: Option<Coord>,
}

/// Row of the merged table, also used to read it back
#[derive(Debug, Serialize, Deserialize)]
struct MergedRow {
    strain: String,
    chrom: String,
    side: Side,
    #[serde(rename = "type")]
    kind: TelomereKind,
    start: Option<Coord>,
    end: Option<Coord>,
    len: Option<Coord>,
    chrom_size: u64,
}

impl From<&TelomereInterval> for MergedRow {
    fn from(row: &TelomereInterval) -> Self {
        Self {
            strain: row.strain.clone(),
            chrom: row.chrom.clone(),
            side: row.side,
            kind: row.kind,
            start: row.start,
            end: row.end,
            len: row.len(),
            chrom_size: row.chrom_size,
        }
    }
}

impl From<MergedRow> for TelomereInterval {
    fn from(row: MergedRow) -> Self {
        Self {
            strain: row.strain,
            chrom: row.chrom,
            side: row.side,
            kind: row.kind,
            start: row.start,
            end: row.end,
            chrom_size: row.chrom_size,
        }
    }
}

pub fn write_raw_csv<W: Write>(writer: W, raw: &[SequenceMetrics]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for sequence in raw {
        for window in &sequence.windows {
            csv.serialize(RawRow {
                strain: &sequence.strain,
                chrom: &sequence.chrom,
                position: window.position,
                strand: window.strand,
                entropy: window.entropy,
                polynuc: window.polynuc,
                predict_telom: u8::from(window.predict_telom),
            })?;
        }
    }
    csv.flush()?;
    Ok(())
}

/// Classified table: strain, chrom, side, type, start, end, len
pub fn write_classified_csv<W: Write>(writer: W, rows: &[TelomereInterval]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(ClassifiedRow {
            strain: &row.strain,
            chrom: &row.chrom,
            side: row.side,
            kind: row.kind,
            start: row.start,
            end: row.end,
            len: row.len(),
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// Merged table: strain, chrom, side, type, start, end, len, chrom_size
pub fn write_merged_csv<W: Write>(writer: W, rows: &[TelomereInterval]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(MergedRow::from(row))?;
    }
    csv.flush()?;
    Ok(())
}

/// Headerless tab-separated chrom, start, end, type; placeholder rows are dropped
pub fn write_bed<W: Write>(writer: W, rows: &[TelomereInterval]) -> Result<()> {
    let mut bed = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);

    for row in rows {
        if let (Some(start), Some(end)) = (row.start, row.end) {
            bed.write_record([
                row.chrom.clone(),
                start.to_string(),
                end.to_string(),
                row.kind.to_string(),
            ])?;
        }
    }
    bed.flush()?;
    Ok(())
}

/// Read a merged table written by [`write_merged_csv`]
pub fn read_merged_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TelomereInterval>> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<MergedRow>()
        .map(|row| row.map(TelomereInterval::from).map_err(TelofindError::from))
        .collect()
}

/// Write every table of a run into `outdir`, creating it if needed
pub fn export_results<P: AsRef<Path>>(tables: &TelomereTables, outdir: P, raw: bool) -> Result<()> {
    let outdir = outdir.as_ref();
    fs::create_dir_all(outdir)?;

    write_classified_csv(fs::File::create(outdir.join(CLASSIFIED_CSV))?, &tables.classified)?;
    write_merged_csv(fs::File::create(outdir.join(MERGED_CSV))?, &tables.merged)?;
    write_bed(fs::File::create(outdir.join(CLASSIFIED_BED))?, &tables.classified)?;
    write_bed(fs::File::create(outdir.join(MERGED_BED))?, &tables.merged)?;

    if raw {
        write_raw_csv(fs::File::create(outdir.join(RAW_CSV))?, &tables.raw)?;
    }

    log::info!("Results written to {}", outdir.display());
    Ok(())
}
