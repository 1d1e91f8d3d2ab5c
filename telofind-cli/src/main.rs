use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use commands::detect::DetectArgs;
use config::Config;
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "telofind")]
#[command(about = "telofind - telomere detection in genome assemblies")]
#[command(version)]
#[command(long_about = "
telofind locates telomeric repeats at the ends of assembled sequences from the
composition of sliding windows, and classifies them as terminal or internal.

Examples:
  telofind detect genome.fasta --out-dir telofinder_results
  telofind detect assemblies/ --threads 8 --raw
  telofind length assemblies/ --force
  telofind config --example > telofind.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect, classify and merge telomeres in a FASTA file or a directory of FASTA files
    Detect {
        /// FASTA file, or directory of FASTA files
        fasta_path: PathBuf,

        /// Polynucleotide proportion above which a window is telomeric
        #[arg(short, long)]
        polynuc_thres: Option<f64>,

        /// Entropy below which a window is telomeric
        #[arg(short, long)]
        entropy_thres: Option<f64>,

        /// Nucleotides scanned from each sequence end (-1 for the whole sequence)
        #[arg(short, long, allow_negative_numbers = true)]
        nb_scanned_nt: Option<i64>,

        /// Output directory
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Also write the per-window metrics table
        #[arg(short, long)]
        raw: bool,

        /// Overwrite an existing output directory
        #[arg(short, long)]
        force: bool,
    },

    /// Estimate the telomere length at both ends of every sequence
    Length {
        /// FASTA file, or directory of FASTA files
        fasta_path: PathBuf,

        /// Output table
        #[arg(short, long, default_value = commands::length::DEFAULT_LENGTH_FILE)]
        out: PathBuf,

        /// Replace the output table if present
        #[arg(short, long)]
        force: bool,
    },

    /// Extract reads spanning merged telomeres from an indexed BAM file
    #[cfg(feature = "io-bam")]
    Reads {
        /// Indexed BAM file
        #[arg(long, required = true)]
        bam: PathBuf,

        /// Merged telomere table (merged_telom_df.csv)
        #[arg(long, required = true)]
        merged: PathBuf,

        /// Output directory, must not exist
        #[arg(short, long, default_value = "telofinder_telomeric_reads")]
        out_dir: PathBuf,
    },

    /// Configuration helpers
    Config {
        /// Print an example telofind.toml
        #[arg(long)]
        example: bool,

        /// Write the effective configuration to this file
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::new()
        .parse_filters(level)
        .format_timestamp_secs()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let threads = cli.threads.unwrap_or(config.general.threads);
    if threads == 0 {
        return Err(CliError::config("thread count must be at least 1").into());
    }

    match cli.command {
        Commands::Detect {
            fasta_path,
            polynuc_thres,
            entropy_thres,
            nb_scanned_nt,
            out_dir,
            raw,
            force,
        } => {
            let args = DetectArgs {
                polynuc_thres,
                entropy_thres,
                nb_scanned_nt,
                out_dir,
                raw,
                force,
            };
            commands::detect::execute(&config, threads, fasta_path, args)?;
        }

        Commands::Length { fasta_path, out, force } => {
            commands::length::execute(fasta_path, out, force)?;
        }

        #[cfg(feature = "io-bam")]
        Commands::Reads { bam, merged, out_dir } => {
            commands::reads::execute(bam, merged, out_dir)?;
        }

        Commands::Config { example, write } => {
            if let Some(path) = write {
                config.save_to_file(&path)?;
                log::info!("Configuration written to {}", path.display());
            } else if example {
                print!("{}", Config::example_toml()?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            print_error_and_exit(cli_err);
        }
        return Err(err);
    }

    Ok(())
}
