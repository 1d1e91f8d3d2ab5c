//! Reads command implementation - extract and re-check telomeric reads from a BAM file

use anyhow::{Context, Result};
use std::fs::File;
use std::path::PathBuf;

use telofind_core::io::bam::write_read_stats;
use telofind_core::io::{export_results, get_telomeric_reads, read_merged_csv};

use crate::error::CliError;

pub const READ_STATS_FILE: &str = "read_stats.csv";
pub const VALIDATION_DIR: &str = "validation";

pub fn execute(bam: PathBuf, merged: PathBuf, out_dir: PathBuf) -> Result<()> {
    for input in [&bam, &merged] {
        if !input.exists() {
            return Err(CliError::file_not_found(input.clone()).into());
        }
    }

    let intervals = read_merged_csv(&merged)
        .with_context(|| format!("Failed to read merged table {}", merged.display()))?;
    log::info!("{} merged intervals loaded from {}", intervals.len(), merged.display());

    let extraction = get_telomeric_reads(&bam, &intervals, &out_dir).map_err(CliError::from)?;

    let stats_path = out_dir.join(READ_STATS_FILE);
    let file = File::create(&stats_path)
        .with_context(|| format!("Failed to create {}", stats_path.display()))?;
    write_read_stats(file, &extraction.stats)?;

    if !extraction.validation.is_empty() {
        export_results(&extraction.validation, out_dir.join(VALIDATION_DIR), false)?;
    }

    log::info!(
        "{} telomeric reads written to {}",
        extraction.stats.len(),
        out_dir.display()
    );
    Ok(())
}
