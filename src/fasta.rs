//! FASTA file parser.
//!
//! This module handles reading and parsing aligned FASTA files.
//! It supports both single-line and multi-line sequences.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ACGT-ACGTNACGT...
//! >another_sequence
//! TGCA-TGCATTGCA...
//! ```
//!
//! Sequence lines are uppercased and any character outside
//! `A`, `C`, `G`, `T`, `-`, `N` is replaced by `N`. A parsed file must hold at
//! least two sequences, all of the same length.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

use crate::model::{Alignment, Sequence};

/// Characters allowed in a normalized sequence.
pub const VALID_BASES: &[u8] = b"ACGT-N";

/// File extensions recognised as FASTA.
pub const FASTA_EXTENSIONS: &[&str] = &["fasta", "fas", "fa", "fna", "ffn", "faa", "mpfa", "frn"];

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("Not a valid FASTA file: line {line} must start with '>'")]
    MalformedFasta { line: usize },

    #[error("Need at least 2 sequences for pairwise scoring, found {found}")]
    InsufficientSequences { found: usize },

    #[error("Sequence '{id}' has length {found}, expected {expected}: sequences must be aligned")]
    UnequalSequenceLength {
        id: String,
        expected: usize,
        found: usize,
    },
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// A record whose header has been read but which is not sealed yet.
#[derive(Debug)]
struct OpenRecord {
    id: String,
    data: String,
}

/// Line-by-line parser state.
#[derive(Debug, Default)]
struct ParserState {
    alignment: Alignment,
    open: Option<OpenRecord>,
}

impl ParserState {
    /// Handles one raw input line (1-based `line_number`).
    ///
    /// A bare `>` header opens a record with an empty identifier.
    fn feed(&mut self, line_number: usize, line: &str) -> FastaResult<()> {
        let line = line.trim();

        // Skip empty lines
        if line.is_empty() {
            return Ok(());
        }

        if let Some(header) = line.strip_prefix('>') {
            self.seal();

            let id = header.split_whitespace().next().unwrap_or("");
            self.open = Some(OpenRecord {
                id: id.to_string(),
                data: String::new(),
            });
            return Ok(());
        }

        // No open record means no header has been seen yet
        let Some(record) = self.open.as_mut() else {
            return Err(FastaError::MalformedFasta { line: line_number });
        };

        record.data.reserve(line.len());
        // One base per input character
        for c in line.chars() {
            let upper = c.to_ascii_uppercase();
            if upper.is_ascii() && VALID_BASES.contains(&(upper as u8)) {
                record.data.push(upper);
            } else {
                record.data.push('N');
                self.alignment.invalid_characters_found = true;
            }
        }
        Ok(())
    }

    /// Moves the open record (if any) into the alignment.
    fn seal(&mut self) {
        if let Some(OpenRecord { id, mut data }) = self.open.take() {
            data.shrink_to_fit();
            if let Some(previous) = self.alignment.insert(Sequence::new(id, data)) {
                warn!("Duplicate sequence identifier '{}': keeping the last occurrence", previous.id);
            }
        }
    }

    /// Seals the last record and validates the whole alignment.
    fn finish(mut self) -> FastaResult<Alignment> {
        self.seal();
        let alignment = self.alignment;

        if alignment.invalid_characters_found {
            warn!("Invalid characters found in the input file. These have been converted to \"N\".");
        }

        if alignment.sequence_count() < 2 {
            return Err(FastaError::InsufficientSequences {
                found: alignment.sequence_count(),
            });
        }

        if let Some(seq) = alignment.first_length_mismatch() {
            return Err(FastaError::UnequalSequenceLength {
                id: seq.id.clone(),
                expected: alignment.alignment_length(),
                found: seq.len(),
            });
        }

        Ok(alignment)
    }
}

/// Parses an aligned FASTA file and returns an Alignment.
///
/// # Examples
///
/// ```no_run
/// use alnscore::fasta::parse_fasta_file;
///
/// let alignment = parse_fasta_file("sequences.fasta").unwrap();
/// println!("Loaded {} sequences", alignment.sequence_count());
/// ```
pub fn parse_fasta_file<P: AsRef<Path>>(path: P) -> FastaResult<Alignment> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => FastaError::InputNotFound(path.to_path_buf()),
        _ => FastaError::Io(e),
    })?;
    parse_fasta(BufReader::new(file))
}

/// Parses FASTA content from a reader.
///
/// This function handles both single-line and multi-line sequences and
/// validates the alignment before returning it.
pub fn parse_fasta<R: BufRead>(reader: R) -> FastaResult<Alignment> {
    let mut state = ParserState::default();

    for (index, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        state.feed(index + 1, &line)?;
    }

    state.finish()
}

/// Parses FASTA content from a string.
///
/// Useful for testing or processing in-memory data.
pub fn parse_fasta_str(content: &str) -> FastaResult<Alignment> {
    parse_fasta(content.as_bytes())
}

/// Returns true if the path carries one of the FASTA extensions.
pub fn is_fasta_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| {
            let ext = ext.to_lowercase();
            FASTA_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_fasta() {
        let content = ">seq1\nACGT\n>seq2\nTGCA\n";
        let alignment = parse_fasta_str(content).unwrap();

        assert_eq!(alignment.sequence_count(), 2);
        assert_eq!(alignment.get(0).unwrap().id, "seq1");
        assert_eq!(alignment.get(0).unwrap().as_str(), "ACGT");
        assert_eq!(alignment.get(1).unwrap().id, "seq2");
        assert_eq!(alignment.get(1).unwrap().as_str(), "TGCA");
        assert!(!alignment.invalid_characters_found);
    }

    #[test]
    fn test_parse_multiline_sequence() {
        let content = ">seq1\nACGT\nTGCA\nAAAA\n>seq2\nACGTTGCAAAAA\n";
        let alignment = parse_fasta_str(content).unwrap();

        assert_eq!(alignment.sequence_count(), 2);
        assert_eq!(alignment.get(0).unwrap().as_str(), "ACGTTGCAAAAA");
    }

    #[test]
    fn test_parse_with_description() {
        let content = ">seq1 This is a description\nACGT\n>seq2\tother\nACGT\n";
        let alignment = parse_fasta_str(content).unwrap();

        assert_eq!(alignment.get(0).unwrap().id, "seq1");
        assert_eq!(alignment.get(1).unwrap().id, "seq2");
    }

    #[test]
    fn test_parse_with_empty_lines_and_padding() {
        let content = "\n  >seq1  \n  ACGT \n\n>seq2\n\nTGCA\n\n";
        let alignment = parse_fasta_str(content).unwrap();

        assert_eq!(alignment.sequence_count(), 2);
        assert_eq!(alignment.get(0).unwrap().as_str(), "ACGT");
        assert_eq!(alignment.get(1).unwrap().as_str(), "TGCA");
    }

    #[test]
    fn test_lowercase_is_uppercased() {
        let content = ">seq1\nacgt-n\n>seq2\nAcGt-N\n";
        let alignment = parse_fasta_str(content).unwrap();

        assert_eq!(alignment.get(0).unwrap().as_str(), "ACGT-N");
        assert_eq!(alignment.get(1).unwrap().as_str(), "ACGT-N");
        assert!(!alignment.invalid_characters_found);
    }

    #[test]
    fn test_invalid_characters_replaced() {
        let content = ">seq1\nACRT\n>seq2\nA*G.\n";
        let alignment = parse_fasta_str(content).unwrap();

        assert_eq!(alignment.get(0).unwrap().as_str(), "ACNT");
        assert_eq!(alignment.get(1).unwrap().as_str(), "ANGN");
        assert!(alignment.invalid_characters_found);
    }

    #[test]
    fn test_non_ascii_character_is_one_base() {
        let content = ">seq1\nAC\u{e9}T\n>seq2\nACGT\n";
        let alignment = parse_fasta_str(content).unwrap();

        assert_eq!(alignment.get(0).unwrap().as_str(), "ACNT");
        assert!(alignment.invalid_characters_found);
    }

    #[test]
    fn test_internal_whitespace_becomes_n() {
        let content = ">seq1\nAC GT\n>seq2\nACAGT\n";
        let alignment = parse_fasta_str(content).unwrap();

        assert_eq!(alignment.get(0).unwrap().as_str(), "ACNGT");
        assert!(alignment.invalid_characters_found);
    }

    #[test]
    fn test_sequence_before_header() {
        let content = "ACGT\n>seq1\nTGCA\n>seq2\nTGCA\n";
        let result = parse_fasta_str(content);
        assert!(matches!(result, Err(FastaError::MalformedFasta { line: 1 })));
    }

    #[test]
    fn test_sequence_before_header_after_blank_lines() {
        let content = "\n\nACGT\n>seq1\nTGCA\n";
        let result = parse_fasta_str(content);
        assert!(matches!(result, Err(FastaError::MalformedFasta { line: 3 })));
    }

    #[test]
    fn test_empty_file() {
        let result = parse_fasta_str("");
        assert!(matches!(result, Err(FastaError::InsufficientSequences { found: 0 })));

        let result = parse_fasta_str("\n   \n");
        assert!(matches!(result, Err(FastaError::InsufficientSequences { found: 0 })));
    }

    #[test]
    fn test_single_sequence() {
        let content = ">seq1\nACGT\nACGT\n";
        let result = parse_fasta_str(content);
        assert!(matches!(result, Err(FastaError::InsufficientSequences { found: 1 })));
    }

    #[test]
    fn test_unequal_lengths() {
        let content = ">seq1\nACGTACGTAC\n>seq2\nACGTACGTACG\n";
        let result = parse_fasta_str(content);
        match result {
            Err(FastaError::UnequalSequenceLength { id, expected, found }) => {
                assert_eq!(id, "seq2");
                assert_eq!(expected, 10);
                assert_eq!(found, 11);
            }
            other => panic!("expected UnequalSequenceLength, got {:?}", other),
        }
    }

    #[test]
    fn test_header_without_sequence_is_empty_record() {
        let content = ">seq1\n>seq2\nACGT\n";
        let result = parse_fasta_str(content);
        assert!(matches!(
            result,
            Err(FastaError::UnequalSequenceLength { expected: 0, found: 4, .. })
        ));
    }

    #[test]
    fn test_empty_identifier() {
        let content = ">\nAC\n>b\nAC\n";
        let alignment = parse_fasta_str(content).unwrap();

        let ids: Vec<&str> = alignment.ids().collect();
        assert_eq!(ids, vec!["", "b"]);
        assert_eq!(alignment.get(0).unwrap().as_str(), "AC");

        let content = ">seq1\nACGT\n>  \nACGT\n";
        let alignment = parse_fasta_str(content).unwrap();
        assert_eq!(alignment.get(1).unwrap().id, "");
    }

    #[test]
    fn test_invalid_characters_flagged_before_length_check() {
        let mut state = ParserState::default();
        state.feed(1, ">s1").unwrap();
        state.feed(2, "ACXT").unwrap();
        state.feed(3, ">s2").unwrap();
        state.feed(4, "ACG").unwrap();

        assert!(state.alignment.invalid_characters_found);
        assert!(matches!(
            state.finish(),
            Err(FastaError::UnequalSequenceLength { expected: 4, found: 3, .. })
        ));
    }

    #[test]
    fn test_duplicate_identifier_last_write_wins() {
        let content = ">a\nAAAA\n>b\nCCCC\n>a\nGGGG\n";
        let alignment = parse_fasta_str(content).unwrap();

        assert_eq!(alignment.sequence_count(), 2);
        let ids: Vec<&str> = alignment.ids().collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(alignment.get(0).unwrap().as_str(), "GGGG");
        assert_eq!(alignment.get(1).unwrap().as_str(), "CCCC");
    }

    #[test]
    fn test_duplicates_can_leave_too_few_sequences() {
        let content = ">a\nAAAA\n>a\nGGGG\n";
        let result = parse_fasta_str(content);
        assert!(matches!(result, Err(FastaError::InsufficientSequences { found: 1 })));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let content = ">x desc\nac-g\nNT\n>y\nAC-GRT\n>z\nTTTTTT\n";
        let first = parse_fasta_str(content).unwrap();
        let second = parse_fasta_str(content).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.ids().collect::<Vec<_>>(), second.ids().collect::<Vec<_>>());
    }

    #[test]
    fn test_parse_file_not_found() {
        let result = parse_fasta_file("does/not/exist.fasta");
        assert!(matches!(result, Err(FastaError::InputNotFound(_))));
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aln.fasta");
        std::fs::write(&path, ">s1\nAC\nGT\n>s2\nACGA\n").unwrap();

        let alignment = parse_fasta_file(&path).unwrap();
        assert_eq!(alignment.sequence_count(), 2);
        assert_eq!(alignment.alignment_length(), 4);
    }

    #[test]
    fn test_is_fasta_path() {
        assert!(is_fasta_path("test.fa"));
        assert!(is_fasta_path("test.fas"));
        assert!(is_fasta_path("test.FASTA"));
        assert!(is_fasta_path("dir/test.mpfa"));
        assert!(!is_fasta_path("test.txt"));
        assert!(!is_fasta_path("test.nex"));
        assert!(!is_fasta_path("fasta"));
    }
}
