//! Detect command implementation - telomere calls on a FASTA file or directory

use anyhow::{Context, Result};
use std::path::PathBuf;

use telofind_core::io::export_results;
use telofind_core::run_on_path;

use crate::config::Config;
use crate::error::CliError;

/// Command line overrides of the `[detect]` and `[output]` sections
#[derive(Debug, Default, Clone)]
pub struct DetectArgs {
    pub polynuc_thres: Option<f64>,
    pub entropy_thres: Option<f64>,
    pub nb_scanned_nt: Option<i64>,
    pub out_dir: Option<PathBuf>,
    pub raw: bool,
    pub force: bool,
}

pub fn execute(config: &Config, threads: usize, fasta_path: PathBuf, args: DetectArgs) -> Result<()> {
    if !fasta_path.exists() {
        return Err(CliError::file_not_found(fasta_path).into());
    }

    let mut detect = config.detect.clone();
    if let Some(polynuc) = args.polynuc_thres {
        detect.polynuc_thres = polynuc;
    }
    if let Some(entropy) = args.entropy_thres {
        detect.entropy_thres = entropy;
    }
    if let Some(nb) = args.nb_scanned_nt {
        detect.nb_scanned_nt = nb;
    }
    let params = detect.to_params();
    params.validate().map_err(CliError::from)?;

    let outdir = args.out_dir.unwrap_or_else(|| config.output.outdir.clone());
    if outdir.exists() {
        if !args.force {
            return Err(CliError::output_exists(outdir).into());
        }
        log::warn!("Overwriting results in {}", outdir.display());
    }
    let raw = args.raw || config.output.raw;

    log::info!(
        "Detecting telomeres in {} (polynuc > {}, entropy < {}, {} threads)",
        fasta_path.display(),
        params.thresholds.polynuc,
        params.thresholds.entropy,
        threads
    );

    let tables = run_on_path(&fasta_path, &params, threads).map_err(CliError::from)?;

    let found = tables.merged.iter().filter(|row| !row.is_placeholder()).count();
    log::info!(
        "{} sequences scanned, {} merged telomeres found",
        tables.raw.len(),
        found
    );

    export_results(&tables, &outdir, raw)
        .with_context(|| format!("Failed to write results to {}", outdir.display()))?;

    Ok(())
}
