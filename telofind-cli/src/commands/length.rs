//! Length command implementation - telomere length at every contig end

use anyhow::{Context, Result};
use std::fs::File;
use std::path::PathBuf;

use telofind_core::length::{estimate_on_path, write_lengths_csv};

use crate::error::CliError;

pub const DEFAULT_LENGTH_FILE: &str = "telom_length.csv";

pub fn execute(fasta_path: PathBuf, out: PathBuf, force: bool) -> Result<()> {
    if !fasta_path.exists() {
        return Err(CliError::file_not_found(fasta_path).into());
    }
    if out.exists() {
        if !force {
            return Err(CliError::output_exists(out).into());
        }
        log::warn!("Replacing the existing file {}", out.display());
    }

    let rows = estimate_on_path(&fasta_path).map_err(CliError::from)?;
    log::info!("{} contig ends measured", rows.len());

    let file = File::create(&out).with_context(|| format!("Failed to create {}", out.display()))?;
    write_lengths_csv(file, &rows).with_context(|| format!("Failed to write {}", out.display()))?;

    log::info!("Telomere lengths written to {}", out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_length_output_and_force() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("y1.fa");
        let seq = format!("{}{}", "CCCACACACCACACCCACAC".repeat(3), "GATTGCATGTACGTAGCTAG".repeat(10));
        fs::write(&fasta, format!(">chr1\n{}\n", seq)).unwrap();
        let out = dir.path().join(DEFAULT_LENGTH_FILE);

        execute(fasta.clone(), out.clone(), false).unwrap();
        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Strain\tChromosome\tContig_side\tTelom_length\tOffset");
        assert!(lines[1].starts_with("y1\tchr1\tL\t"));
        assert_eq!(lines[2], "y1\tchr1\tR\t0\t0");

        let err = execute(fasta.clone(), out.clone(), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::OutputExists { .. })
        ));
        execute(fasta, out, true).unwrap();
    }
}
