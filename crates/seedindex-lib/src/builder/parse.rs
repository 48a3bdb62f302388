//! FASTA/FASTQ parsing with automatic decompression
//!
//! Reads reference sequences from FASTA or FASTQ files, with transparent
//! gzip decompression. Letters outside A, C, G, T (IUPAC ambiguity codes,
//! N runs) are kept as masked positions; anything that is not a letter is
//! rejected.

use anyhow::{Context, Result};
use needletail::parse_fastx_file;
use std::path::Path;

use crate::builder::config::MaskingAlgo;
use crate::reference::ReferenceSet;

/// Parse a FASTA/FASTQ file and call a function for each sequence
///
/// # Arguments
/// * `path` - Path to input file (may be gzipped)
/// * `callback` - Function called for each sequence, receives (name, sequence)
///
/// # Errors
/// Returns error if:
/// - File cannot be opened
/// - File format is invalid
/// - Sequence contains non-letter characters
pub fn parse_sequences<P, F>(path: P, mut callback: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnMut(&[u8], &[u8]) -> Result<()>,
{
    let path = path.as_ref();

    let mut reader = parse_fastx_file(path)
        .with_context(|| format!("Failed to open sequence file: {}", path.display()))?;

    while let Some(record) = reader.next() {
        let record = record
            .with_context(|| format!("Failed to parse sequence record in {}", path.display()))?;

        let seq = record.seq();
        validate_sequence(&seq).with_context(|| {
            format!(
                "Invalid sequence '{}' in {}",
                String::from_utf8_lossy(record.id()),
                path.display()
            )
        })?;

        callback(record.id(), &seq)?;
    }

    Ok(())
}

/// Validate that a sequence consists of letters only
///
/// # Errors
/// Returns error on the first non-letter byte
pub fn validate_sequence(seq: &[u8]) -> Result<()> {
    if let Some(i) = seq.iter().position(|b| !b.is_ascii_alphabetic()) {
        return Err(anyhow::anyhow!(
            "Invalid nucleotide '{}' at position {}",
            seq[i].escape_ascii(),
            i
        ));
    }
    Ok(())
}

/// Load a reference file into a [`ReferenceSet`]
///
/// The sequence name is the record id up to the first whitespace.
pub fn read_reference<P: AsRef<Path>>(path: P, masking: MaskingAlgo) -> Result<ReferenceSet> {
    let mut reference = ReferenceSet::new();
    parse_sequences(path, |id, seq| {
        let id = String::from_utf8_lossy(id);
        let name = id.split_whitespace().next().unwrap_or_default();
        reference.push(name, seq, masking.soft_mask());
        Ok(())
    })?;
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{decode_sequence, MASK_LETTER};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_validate_sequence() {
        assert!(validate_sequence(b"ACGTacgt").is_ok());
        assert!(validate_sequence(b"ACGTNNRY").is_ok());
        assert!(validate_sequence(b"ACGT ").is_err());
        assert!(validate_sequence(b"ACG-T").is_err());
    }

    #[test]
    fn test_parse_fasta_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, ">seq1")?;
        writeln!(temp_file, "ACGT")?;
        writeln!(temp_file, ">seq2")?;
        writeln!(temp_file, "TGCA")?;
        temp_file.flush()?;

        let mut sequences = Vec::new();
        parse_sequences(temp_file.path(), |name, seq| {
            sequences.push((name.to_vec(), seq.to_vec()));
            Ok(())
        })?;

        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0].0, b"seq1");
        assert_eq!(sequences[0].1, b"ACGT");
        assert_eq!(sequences[1].0, b"seq2");
        assert_eq!(sequences[1].1, b"TGCA");

        Ok(())
    }

    #[test]
    fn test_read_reference() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, ">chr1 first chromosome")?;
        writeln!(temp_file, "ACGTNacg")?;
        writeln!(temp_file, ">chr2")?;
        writeln!(temp_file, "GGTT")?;
        temp_file.flush()?;

        let reference = read_reference(temp_file.path(), MaskingAlgo::SoftMask)?;
        assert_eq!(reference.num_sequences(), 2);
        assert_eq!(reference.name(0), "chr1");
        assert_eq!(reference.name(1), "chr2");
        assert_eq!(reference.sequence_len(0), 8);
        assert_eq!(reference.sequence(0)[4], MASK_LETTER);
        assert_eq!(reference.sequence(0)[5], MASK_LETTER);
        assert_eq!(decode_sequence(reference.sequence(1)), "GGTT");

        let plain = read_reference(temp_file.path(), MaskingAlgo::None)?;
        assert_eq!(decode_sequence(plain.sequence(0)), "ACGTNACG");

        Ok(())
    }

    #[test]
    fn test_missing_file() {
        assert!(read_reference("/nonexistent/reference.fa", MaskingAlgo::None).is_err());
    }
}
