//! Command implementations for the telofind CLI

pub mod detect;
pub mod length;
#[cfg(feature = "io-bam")] pub mod reads;
