//! # alnscore - Pairwise Alignment Scoring
//!
//! Scores every pair of sequences in an aligned nucleotide FASTA file,
//! reporting identity, gaps and a weighted substitution score.
//!
//! ## Architecture
//!
//! The crate is a straight pipeline:
//! - `model`: Data structures for sequences and the ordered alignment store
//! - `fasta`: FASTA file parsing, normalization and validation
//! - `params`: Scoring weights and parameter file overrides
//! - `scoring`: Column classification and per-pair summaries
//! - `report`: Text rendering of the summaries
//!
//! ```
//! use alnscore::fasta::parse_fasta_str;
//! use alnscore::params::ScoringParams;
//! use alnscore::scoring::score_all;
//!
//! let alignment = parse_fasta_str(">a\nAG--\n>b\nA-CG\n").unwrap();
//! let summaries = score_all(&alignment, &ScoringParams::default()).unwrap();
//! assert_eq!(summaries[0].to_string(),
//!     "a-b: Identity: 1/4 (25.0%), Gaps: 3/4 (75.0%), Score=-2");
//! ```

pub mod fasta;
pub mod model;
pub mod params;
pub mod report;
pub mod scoring;
