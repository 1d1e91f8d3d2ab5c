//! Telomere detection pipeline
//!
//! Runs scanning, classification and merging for each sequence record,
//! in parallel across the records of a file, and aggregates the resulting
//! tables per file or per directory.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classify::{classify_telomeres, group_by_strand, label_windows, Thresholds};
use crate::error::{Result, TelofindError};
use crate::io::fasta::{is_fasta_path, strain_name, FastaParser};
use crate::merge::merge_telomeres;
use crate::metrics::{MetricsEngine, MetricsParams};
use crate::scan::scan_both_strands;
use crate::types::{SequenceMetrics, SequenceRecord, TelomereInterval};

pub const DEFAULT_NB_SCANNED_NT: i64 = 20_000;
pub const DEFAULT_THREADS: usize = 1;

/// Parameters for telomere detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelomereParams {
    #[serde(default)]
    pub metrics: MetricsParams,
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Nucleotides scanned from each end; -1 scans the whole sequence
    #[serde(default = "default_nb_scanned_nt")]
    pub nb_scanned_nt: i64,
}

fn default_nb_scanned_nt() -> i64 { DEFAULT_NB_SCANNED_NT }

impl Default for TelomereParams {
    fn default() -> Self {
        Self {
            metrics: MetricsParams::default(),
            thresholds: Thresholds::default(),
            nb_scanned_nt: default_nb_scanned_nt(),
        }
    }
}

impl TelomereParams {
    pub fn validate(&self) -> Result<()> {
        self.metrics.validate()?;
        if self.nb_scanned_nt < -1 {
            return Err(TelofindError::InvalidParams(format!(
                "number of scanned nucleotides must be -1 or positive, got {}",
                self.nb_scanned_nt
            )));
        }
        Ok(())
    }
}

/// Raw metrics, classified intervals and merged intervals of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelomereTables {
    pub raw: Vec<SequenceMetrics>,
    pub classified: Vec<TelomereInterval>,
    pub merged: Vec<TelomereInterval>,
}

impl TelomereTables {
    pub fn append(&mut self, other: TelomereTables) {
        self.raw.extend(other.raw);
        self.classified.extend(other.classified);
        self.merged.extend(other.merged);
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty() && self.classified.is_empty() && self.merged.is_empty()
    }
}

impl FromIterator<TelomereTables> for TelomereTables {
    fn from_iter<T: IntoIterator<Item = TelomereTables>>(iter: T) -> Self {
        let mut total = TelomereTables::default();
        for tables in iter {
            total.append(tables);
        }
        total
    }
}

/// Full pipeline on a single sequence record
pub fn run_on_sequence(record: &SequenceRecord, strain: &str, params: &TelomereParams) -> Result<TelomereTables> {
    let engine = MetricsEngine::new(&params.metrics)?;
    run_with_engine(record, strain, params, &engine)
}

fn run_with_engine(
    record: &SequenceRecord,
    strain: &str,
    params: &TelomereParams,
    engine: &MetricsEngine,
) -> Result<TelomereTables> {
    let rc = record.reverse_complement();
    let scanned = scan_both_strands(&record.seq, &rc, params.nb_scanned_nt, engine)?;
    let windows = label_windows(&scanned, &params.thresholds);

    let groups = group_by_strand(&windows);
    let classified = classify_telomeres(&groups, strain, &record.id, record.len(), engine.window_size());
    let merged = merge_telomeres(&classified, record.len());

    log::info!("chromosome {} done", record.id);

    Ok(TelomereTables {
        raw: vec![SequenceMetrics {
            strain: strain.to_string(),
            chrom: record.id.clone(),
            windows,
        }],
        classified,
        merged,
    })
}

/// Run the pipeline over many records on a pool of `threads` workers.
///
/// Results are gathered by record index, so the output follows the input
/// order whatever the scheduling. The first failing record aborts the batch.
pub fn run_records(
    records: &[SequenceRecord],
    strain: &str,
    params: &TelomereParams,
    threads: usize,
) -> Result<TelomereTables> {
    params.validate()?;
    let engine = MetricsEngine::new(&params.metrics)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|e| TelofindError::ThreadPool(e.to_string()))?;

    let per_record: Vec<TelomereTables> = pool.install(|| {
        records
            .par_iter()
            .map(|record| run_with_engine(record, strain, params, &engine))
            .collect::<Result<Vec<_>>>()
    })?;

    Ok(per_record.into_iter().collect())
}

/// Run the pipeline on every record of a FASTA file.
///
/// The strain label is the file name without extension.
pub fn run_on_fasta<P: AsRef<Path>>(fasta_path: P, params: &TelomereParams, threads: usize) -> Result<TelomereTables> {
    let fasta_path = fasta_path.as_ref();
    let strain = strain_name(fasta_path);
    log::info!("file {} executed", strain);

    let records = FastaParser::parse_file(fasta_path)?;
    run_records(&records, &strain, params, threads)
}

/// FASTA files directly inside `dir`, sorted by path
pub fn fasta_files_in<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_fasta_path(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Run the pipeline on every FASTA file of a directory and concatenate
pub fn run_on_fasta_dir<P: AsRef<Path>>(fasta_dir: P, params: &TelomereParams, threads: usize) -> Result<TelomereTables> {
    let fasta_dir = fasta_dir.as_ref();
    let files = fasta_files_in(fasta_dir)?;
    if files.is_empty() {
        return Err(TelofindError::EmptyInput(fasta_dir.to_path_buf()));
    }

    let mut total = TelomereTables::default();
    for fasta in &files {
        total.append(run_on_fasta(fasta, params, threads)?);
    }
    Ok(total)
}

/// Single-file or directory mode depending on what `path` is
pub fn run_on_path<P: AsRef<Path>>(path: P, params: &TelomereParams, threads: usize) -> Result<TelomereTables> {
    let path = path.as_ref();
    if path.is_dir() {
        log::info!("'{}' is a directory. Running in iterative mode.", path.display());
        run_on_fasta_dir(path, params, threads)
    } else {
        log::info!("'{}' is a file. Running in single mode.", path.display());
        run_on_fasta(path, params, threads)
    }
}
