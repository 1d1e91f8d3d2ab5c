//! File format I/O for telofind
//!
//! FASTA input, CSV/BED table output and, with the `io-bam` feature,
//! telomeric read extraction from indexed BAM files.

pub mod fasta;
pub mod table;
#[cfg(feature = "io-bam")] pub mod bam;

pub use fasta::{reverse_complement, strain_name, FastaParser, FASTA_EXTENSIONS};
pub use table::{export_results, read_merged_csv};
#[cfg(feature = "io-bam")] pub use bam::{get_telomeric_reads, ReadExtraction, ReadStat};
