//! Sequence input from FASTA or FASTQ files, optionally gzip compressed

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::{fasta, fastq};

use crate::errors::Result;

/// A named sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub name: String,
    pub sequence: Vec<u8>,
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.file_name()
        .map(|v| {
            let name = v.to_string_lossy();
            let name = name.strip_suffix(".gz").unwrap_or(&name);

            extensions.iter().any(|ext| name.ends_with(ext))
        })
        .unwrap_or(false)
}

pub fn is_gzipped(path: &Path) -> bool {
    path.file_name()
        .map(|v| v.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false)
}

/// Whether the file name has one of the usual FASTA extensions
pub fn is_fasta(path: &Path) -> bool {
    has_extension(path, &[".fa", ".fna", ".fasta"])
}

pub fn is_fastq(path: &Path) -> bool {
    has_extension(path, &[".fq", ".fastq"])
}

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let reader_inner: Box<dyn BufRead> = if is_gzipped(path) {
        Box::new(File::open(path).map(MultiGzDecoder::new).map(BufReader::new)?)
    } else {
        Box::new(File::open(path).map(BufReader::new)?)
    };

    Ok(reader_inner)
}

/// Read all records of a FASTQ file if the file name says so, or of a FASTA
/// file otherwise
pub fn read_sequences(path: impl AsRef<Path>) -> Result<Vec<SequenceRecord>> {
    let path = path.as_ref();
    let reader_inner = open_reader(path)?;

    if is_fastq(path) {
        read_fastq_records(&mut fastq::io::Reader::new(reader_inner))
    } else {
        read_fasta_records(&mut fasta::io::Reader::new(reader_inner))
    }
}

pub fn read_fasta(path: impl AsRef<Path>) -> Result<Vec<SequenceRecord>> {
    let reader_inner = open_reader(path.as_ref())?;

    read_fasta_records(&mut fasta::io::Reader::new(reader_inner))
}

pub fn read_fasta_records<R: BufRead>(reader: &mut fasta::io::Reader<R>) -> Result<Vec<SequenceRecord>> {
    let mut records = Vec::new();

    for record in reader.records() {
        let record = record?;

        records.push(SequenceRecord {
            name: String::from_utf8_lossy(record.name()).into_owned(),
            sequence: record.sequence().as_ref().to_vec(),
        });
    }

    Ok(records)
}

pub fn read_fastq_records<R: BufRead>(reader: &mut fastq::io::Reader<R>) -> Result<Vec<SequenceRecord>> {
    let mut records = Vec::new();

    for record in reader.records() {
        let record = record?;

        records.push(SequenceRecord {
            name: String::from_utf8_lossy(record.name()).into_owned(),
            sequence: record.sequence().to_vec(),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Write};
    use std::path::Path;

    use flate2::read::MultiGzDecoder;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use noodles::{fasta, fastq};

    use super::{is_fasta, is_fastq, is_gzipped, read_fasta_records, read_fastq_records};

    const INPUT: &[u8] = b">seq1 first\nACGT\nTG\n>seq2\nGGA\n";

    #[test]
    fn test_read_fasta() {
        let mut reader = fasta::io::Reader::new(INPUT);
        let records = read_fasta_records(&mut reader).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "seq1");
        assert_eq!(records[0].sequence, b"ACGTTG".to_vec());
        assert_eq!(records[1].name, "seq2");
        assert_eq!(records[1].sequence, b"GGA".to_vec());
    }

    #[test]
    fn test_read_gzipped() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(INPUT).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut reader = fasta::io::Reader::new(BufReader::new(MultiGzDecoder::new(compressed.as_slice())));
        let records = read_fasta_records(&mut reader).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].sequence, b"GGA".to_vec());
    }

    #[test]
    fn test_read_fastq() {
        let input = b"@read1\nACGT\n+\nIIII\n@read2\nTT\n+\nII\n";
        let mut reader = fastq::io::Reader::new(&input[..]);
        let records = read_fastq_records(&mut reader).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "read1");
        assert_eq!(records[1].sequence, b"TT".to_vec());
    }

    #[test]
    fn test_extensions() {
        assert!(is_fasta(Path::new("data/ref.fa.gz")));
        assert!(is_fasta(Path::new("reads.fasta")));
        assert!(!is_fasta(Path::new("graph.txt")));
        assert!(is_fastq(Path::new("reads.fq.gz")));
        assert!(!is_fastq(Path::new("reads.fna")));
        assert!(is_gzipped(Path::new("reads.fna.gz")));
        assert!(!is_gzipped(Path::new("reads.fna")));
    }
}
