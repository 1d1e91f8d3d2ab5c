//! Error handling for the telofind CLI

use std::path::PathBuf;
use thiserror::Error;

use telofind_core::TelofindError;

/// Main error type for telofind CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Output already exists: {path}")]
    OutputExists { path: PathBuf },

    #[error("No sequences found in {path}")]
    NoInput { path: PathBuf },

    #[error("Sequence too short: {message}")]
    SequenceTooShort { message: String },

    #[error("Detection error: {message}")]
    Detection { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }
}

impl From<TelofindError> for CliError {
    fn from(err: TelofindError) -> Self {
        match err {
            TelofindError::EmptyInput(path) => Self::NoInput { path },
            TelofindError::OutputExists(path) => Self::OutputExists { path },
            TelofindError::InvalidParams(message) => Self::Config { message },
            err @ TelofindError::WindowTooLarge { .. } => Self::SequenceTooShort {
                message: err.to_string(),
            },
            other => Self::Detection {
                message: other.to_string(),
            },
        }
    }
}

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the path is correct: {}\n\
                 • Pass either a FASTA file or a directory of FASTA files",
                path.display()
            ));
        }

        CliError::OutputExists { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Use --force to overwrite the existing results\n\
                 • Choose another output location with --out-dir",
            );
        }

        CliError::NoInput { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check that the FASTA input is not empty\n\
                 • FASTA files are recognised by their .fasta, .fas, .fa or .fsa extension\n\
                 • Gzipped files need an additional .gz extension",
            );
        }

        CliError::SequenceTooShort { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Remove sequences shorter than the window from the input\n\
                 • Lower window_size in the [detect] section of telofind.toml",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your telofind.toml configuration file\n\
                 • Use 'telofind config --example' to generate a sample configuration\n\
                 • Verify that all configuration values are valid",
            );
        }

        CliError::Detection { .. } => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}
