//! Telomeric read extraction from an indexed BAM file
//!
//! For every merged telomere interval, reads overlapping the interval with a
//! mapping quality above zero are written to a SAM and a FASTA file, and the
//! telomere pipeline is run again on the extracted reads.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use noodles::bam;
use noodles::core::{Position, Region};
use noodles::sam;
use noodles::sam::alignment::io::Write as _;

use crate::error::{Result, TelofindError};
use crate::io::fasta::strain_name;
use crate::pipeline::{run_on_fasta, TelomereParams, TelomereTables};
use crate::types::{Coord, TelomereInterval};

/// Detection parameters of the validation pass on extracted reads
pub fn validation_params() -> TelomereParams {
    TelomereParams {
        nb_scanned_nt: 8000,
        ..Default::default()
    }
}

pub const VALIDATION_THREADS: usize = 4;

/// One extracted read
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReadStat {
    pub bam: String,
    pub chro: String,
    pub start: Coord,
    pub end: Coord,
    pub read_len: usize,
}

/// Extracted read statistics and the pipeline results on those reads
#[derive(Debug, Default)]
pub struct ReadExtraction {
    pub stats: Vec<ReadStat>,
    pub validation: TelomereTables,
}

fn bam_error<E: std::fmt::Display>(err: E) -> TelofindError {
    TelofindError::Bam(err.to_string())
}

fn position(coord: Coord) -> Result<Position> {
    Position::try_from(coord.max(1) as usize).map_err(bam_error)
}

/// Output files of one interval: `(sam, fasta)`
pub fn interval_paths(outdir: &Path, chrom: &str, start: Coord, end: Coord) -> (PathBuf, PathBuf) {
    let stem = format!("telomeric_reads_{}_{}_{}", chrom, start, end);
    (outdir.join(format!("{}.sam", stem)), outdir.join(format!("{}.fas", stem)))
}

/// Extract reads spanning each merged interval into `outdir`.
///
/// `outdir` must not exist yet. Placeholder rows are skipped, as are
/// intervals without any read for the validation pass.
pub fn get_telomeric_reads<P: AsRef<Path>, Q: AsRef<Path>>(
    bam_path: P,
    merged: &[TelomereInterval],
    outdir: Q,
) -> Result<ReadExtraction> {
    let bam_path = bam_path.as_ref();
    let outdir = outdir.as_ref();
    if outdir.exists() {
        return Err(TelofindError::OutputExists(outdir.to_path_buf()));
    }
    fs::create_dir(outdir)?;

    let bam_name = strain_name(bam_path);
    let mut reader = bam::io::indexed_reader::Builder::default()
        .build_from_path(bam_path)
        .map_err(bam_error)?;
    let header = reader.read_header()?;

    let params = validation_params();
    let mut extraction = ReadExtraction::default();

    for interval in merged {
        let (Some(start), Some(end)) = (interval.start, interval.end) else {
            continue;
        };

        let (sam_path, fas_path) = interval_paths(outdir, &interval.chrom, start, end);
        let mut sam_writer = sam::io::Writer::new(BufWriter::new(File::create(&sam_path)?));
        sam_writer.write_header(&header)?;
        let mut fasta = BufWriter::new(File::create(&fas_path)?);

        let region = Region::new(interval.chrom.clone(), position(start)?..=position(end)?);
        let mut n_reads = 0usize;

        for result in reader.query(&header, &region)? {
            let record = result?;
            // missing mapping quality (255) counts as mapped
            if record.mapping_quality().is_some_and(|mq| mq.get() == 0) {
                continue;
            }

            sam_writer.write_alignment_record(&header, &record)?;

            let name = record
                .name()
                .map(|n| String::from_utf8_lossy(n.as_ref()).into_owned())
                .unwrap_or_else(|| "*".to_string());
            let sequence: Vec<u8> = record.sequence().iter().collect();
            writeln!(fasta, ">{}\n{}", name, String::from_utf8_lossy(&sequence))?;

            extraction.stats.push(ReadStat {
                bam: bam_name.clone(),
                chro: interval.chrom.clone(),
                start,
                end,
                read_len: sequence.len(),
            });
            n_reads += 1;
        }

        fasta.flush()?;
        drop(fasta);
        drop(sam_writer);

        log::info!(
            "{} telomeric reads extracted for {}:{}-{}",
            n_reads,
            interval.chrom,
            start,
            end
        );

        if n_reads == 0 {
            log::warn!("No reads for {}:{}-{}, skipping validation", interval.chrom, start, end);
            continue;
        }

        extraction
            .validation
            .append(run_on_fasta(&fas_path, &params, VALIDATION_THREADS)?);
    }

    Ok(extraction)
}

/// Write read statistics as CSV
pub fn write_read_stats<W: Write>(writer: W, stats: &[ReadStat]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for stat in stats {
        csv.serialize(stat)?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Side, TelomereKind};
    use noodles::csi::binning_index::{index::reference_sequence::bin::Chunk, Indexer};
    use noodles::sam::alignment::io::Write as _;
    use noodles::sam::alignment::record::cigar::{op::Kind, Op};
    use noodles::sam::alignment::record::{Flags, MappingQuality};
    use noodles::sam::alignment::record_buf::{Cigar, Name, QualityScores, Sequence};
    use noodles::sam::alignment::{Record as _, RecordBuf};
    use noodles::sam::header::record::value::{map::ReferenceSequence, Map};
    use std::num::NonZeroUsize;

    const REPEAT: &[u8] = b"CCCACACACCACACCCACAC";
    const FILLER: &[u8] = b"GATTGCATGTACGTAGCTAG";

    fn telomeric_read(name: &str, start: usize, mapq: u8) -> RecordBuf {
        let mut seq = REPEAT.repeat(2);
        seq.extend_from_slice(&FILLER.repeat(2));
        let len = seq.len();

        RecordBuf::builder()
            .set_name(Name::from(name.as_bytes()))
            .set_flags(Flags::empty())
            .set_reference_sequence_id(0)
            .set_alignment_start(Position::try_from(start).unwrap())
            .set_mapping_quality(MappingQuality::new(mapq).unwrap())
            .set_cigar([Op::new(Kind::Match, len)].into_iter().collect::<Cigar>())
            .set_sequence(Sequence::from(seq))
            .set_quality_scores(QualityScores::from(vec![30; len]))
            .build()
    }

    /// Write a coordinate-sorted BAM and its `.bai` next to it
    fn write_indexed_bam(path: &Path, reads: &[RecordBuf]) {
        let header = sam::Header::builder()
            .add_reference_sequence(
                "chrI",
                Map::<ReferenceSequence>::new(NonZeroUsize::new(1000).unwrap()),
            )
            .build();

        let mut writer = bam::io::Writer::new(File::create(path).unwrap());
        writer.write_header(&header).unwrap();
        for read in reads {
            writer.write_alignment_record(&header, read).unwrap();
        }
        writer.try_finish().unwrap();
        drop(writer);

        let mut reader = bam::io::reader::Builder.build_from_path(path).unwrap();
        let header = reader.read_header().unwrap();
        let mut record = bam::Record::default();
        let mut indexer = Indexer::default();
        let mut start = reader.get_ref().virtual_position();

        while reader.read_record(&mut record).unwrap() != 0 {
            let end = reader.get_ref().virtual_position();
            let context = (
                record.reference_sequence_id().transpose().unwrap(),
                record.alignment_start().transpose().unwrap(),
                record.alignment_end().transpose().unwrap(),
            );
            let context = match context {
                (Some(id), Some(first), Some(last)) => Some((id, first, last, !record.flags().is_unmapped())),
                _ => None,
            };
            indexer.add_record(context, Chunk::new(start, end)).unwrap();
            start = end;
        }

        let index = indexer.build(header.reference_sequences().len());
        bam::bai::write(format!("{}.bai", path.display()), &index).unwrap();
    }

    #[test]
    fn test_interval_paths() {
        let (sam, fas) = interval_paths(Path::new("out"), "chrI", 1, 250);
        assert_eq!(sam, Path::new("out/telomeric_reads_chrI_1_250.sam"));
        assert_eq!(fas, Path::new("out/telomeric_reads_chrI_1_250.fas"));
    }

    #[test]
    fn test_existing_outdir_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let merged = vec![TelomereInterval::placeholder("s", "chrI", Side::Left, TelomereKind::Terminal, 100)];
        let result = get_telomeric_reads(dir.path().join("missing.bam"), &merged, dir.path());
        assert!(matches!(result, Err(TelofindError::OutputExists(_))));
    }

    #[test]
    fn test_validation_params() {
        let params = validation_params();
        assert_eq!(params.nb_scanned_nt, 8000);
        assert_eq!(params.thresholds.entropy, 0.8);
        assert_eq!(params.thresholds.polynuc, 0.8);
    }

    #[test]
    fn test_read_stats_csv() {
        let stats = vec![ReadStat {
            bam: "sample".to_string(),
            chro: "chrI".to_string(),
            start: 1,
            end: 250,
            read_len: 9000,
        }];
        let mut out = Vec::new();
        write_read_stats(&mut out, &stats).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "bam,chro,start,end,read_len\nsample,chrI,1,250,9000\n"
        );
    }

    #[test]
    fn test_extracts_mapped_reads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let bam_path = dir.path().join("sample.bam");
        write_indexed_bam(
            &bam_path,
            &[
                telomeric_read("read1", 1, 60),
                telomeric_read("read2", 10, 0),
                telomeric_read("read3", 30, 60),
            ],
        );

        let merged = vec![
            TelomereInterval {
                strain: "genome".to_string(),
                chrom: "chrI".to_string(),
                side: Side::Left,
                kind: TelomereKind::Terminal,
                start: Some(1),
                end: Some(40),
                chrom_size: 1000,
            },
            TelomereInterval::placeholder("genome", "chrI", Side::Right, TelomereKind::Terminal, 1000),
        ];
        let outdir = dir.path().join("reads");
        let extraction = get_telomeric_reads(&bam_path, &merged, &outdir).unwrap();

        // the MAPQ 0 read is left out
        assert_eq!(extraction.stats.len(), 2);
        assert!(extraction.stats.iter().all(|s| s.bam == "sample" && s.chro == "chrI"));
        assert!(extraction.stats.iter().all(|s| (s.start, s.end) == (1, 40) && s.read_len == 80));

        let (sam_path, fas_path) = interval_paths(&outdir, "chrI", 1, 40);
        let sam_text = fs::read_to_string(sam_path).unwrap();
        assert!(sam_text.contains("@SQ\tSN:chrI\tLN:1000"));
        assert!(sam_text.contains("read1") && sam_text.contains("read3"));
        assert!(!sam_text.contains("read2"));

        let fasta = fs::read_to_string(fas_path).unwrap();
        assert!(fasta.starts_with(">read1\nCCCACACACC"));
        assert_eq!(fasta.matches('>').count(), 2);

        // one output pair per located interval
        assert_eq!(fs::read_dir(&outdir).unwrap().count(), 2);

        assert!(!extraction.validation.raw.is_empty());
        let mut reads: Vec<&str> = extraction
            .validation
            .classified
            .iter()
            .map(|r| r.chrom.as_str())
            .collect();
        reads.dedup();
        assert_eq!(reads, vec!["read1", "read3"]);
        assert!(extraction
            .validation
            .merged
            .iter()
            .any(|r| r.side == Side::Left && r.kind == TelomereKind::Terminal && r.start == Some(1)));
    }
}
