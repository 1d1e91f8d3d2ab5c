//! telofind core library
//!
//! Sliding-window telomere detection: window metrics, strand scanning,
//! telomere classification, interval merging and the per-file pipeline.

pub mod types;
pub mod error;
pub mod metrics;
pub mod scan;
pub mod classify;
pub mod merge;
pub mod pipeline;
pub mod length;
pub mod io;

// Re-export commonly used types and functions
pub use types::{Coord, MetricsRecord, SequenceMetrics, SequenceRecord, Side, Strand, TelomereInterval, TelomereKind, WindowMetrics};
pub use error::{Result, TelofindError};
pub use metrics::{MetricsEngine, MetricsParams};
pub use classify::Thresholds;
pub use merge::{BedInterval, IntervalSet};
pub use pipeline::{run_on_fasta, run_on_fasta_dir, run_on_path, run_on_sequence, TelomereParams, TelomereTables};

/// Version information for the telofind core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
