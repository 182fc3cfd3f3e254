//! Pairwise scoring of aligned sequences.
//!
//! Every unordered pair of sequences in an [`Alignment`] is compared column by
//! column. Each column falls in exactly one [`Column`] class, checked in this
//! order:
//!
//! 1. either base is `N`: disregarded
//! 2. identical bases other than `-`: identity
//! 3. `-` against `-`: disregarded
//! 4. A<->G or C<->T: transition
//! 5. `-` against a base: gap
//! 6. anything else: transversion
//!
//! Disregarded columns are left out of the percentage denominators.

use rayon::prelude::*;
use thiserror::Error;

use crate::model::{Alignment, Sequence};
use crate::params::ScoringParams;

/// Errors that can occur while scoring.
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Sequences '{id_a}' ({len_a}) and '{id_b}' ({len_b}) are not of the same length")]
    LengthMismatch {
        id_a: String,
        id_b: String,
        len_a: usize,
        len_b: usize,
    },

    #[error("Failed to start scoring threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for scoring operations.
pub type ScoreResult<T> = Result<T, ScoreError>;

/// Classification of one aligned column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// `N` on either side, or a gap facing a gap
    Disregarded,
    /// Identical bases
    Identity,
    /// Purine<->purine or pyrimidine<->pyrimidine substitution
    Transition,
    /// Gap facing a base
    Gap,
    /// Purine<->pyrimidine substitution
    Transversion,
}

const PURINES: &[u8] = b"AG";
const PYRIMIDINES: &[u8] = b"CT";

/// Classifies the column holding `a` and `b`.
///
/// The result does not depend on argument order.
pub fn classify(a: u8, b: u8) -> Column {
    if a == b'N' || b == b'N' {
        return Column::Disregarded;
    }
    if a == b {
        return if a == b'-' {
            Column::Disregarded
        } else {
            Column::Identity
        };
    }
    let both_in = |set: &[u8]| set.contains(&a) && set.contains(&b);
    if both_in(PURINES) || both_in(PYRIMIDINES) {
        Column::Transition
    } else if a == b'-' || b == b'-' {
        Column::Gap
    } else {
        Column::Transversion
    }
}

/// Summary statistics for one pair of sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSummary {
    pub id_a: String,
    pub id_b: String,
    pub alignment_length: usize,
    pub identity_count: usize,
    pub gap_count: usize,
    pub disregarded_count: usize,
    pub score: f64,
}

impl PairSummary {
    /// Number of columns counted towards the percentages.
    pub fn denominator(&self) -> usize {
        self.alignment_length - self.disregarded_count
    }

    /// Identity percentage rounded to one decimal, `None` if every column was disregarded.
    pub fn identity_pct(&self) -> Option<f64> {
        percentage(self.identity_count, self.denominator())
    }

    /// Gap percentage rounded to one decimal, `None` if every column was disregarded.
    pub fn gaps_pct(&self) -> Option<f64> {
        percentage(self.gap_count, self.denominator())
    }
}

fn percentage(count: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(round_one_decimal(count as f64 / denominator as f64 * 100.0))
}

/// Rounds half-to-even on the exact binary value, the way decimal formatting does.
fn round_one_decimal(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Scores one pair of sequences.
pub fn score_pair(a: &Sequence, b: &Sequence, params: &ScoringParams) -> ScoreResult<PairSummary> {
    if a.len() != b.len() {
        return Err(ScoreError::LengthMismatch {
            id_a: a.id.clone(),
            id_b: b.id.clone(),
            len_a: a.len(),
            len_b: b.len(),
        });
    }

    let mut summary = PairSummary {
        id_a: a.id.clone(),
        id_b: b.id.clone(),
        alignment_length: a.len(),
        identity_count: 0,
        gap_count: 0,
        disregarded_count: 0,
        score: 0.0,
    };

    for (&x, &y) in a.as_bytes().iter().zip(b.as_bytes()) {
        match classify(x, y) {
            Column::Disregarded => summary.disregarded_count += 1,
            Column::Identity => {
                summary.identity_count += 1;
                summary.score += params.match_score;
            }
            Column::Transition => summary.score += params.transition,
            Column::Gap => {
                summary.gap_count += 1;
                summary.score += params.gap_penalty;
            }
            Column::Transversion => summary.score += params.transversion,
        }
    }

    Ok(summary)
}

/// Index pairs (i, j) with i < j, in nested insertion order.
fn pair_indices(count: usize) -> Vec<(usize, usize)> {
    (0..count)
        .flat_map(|i| (i + 1..count).map(move |j| (i, j)))
        .collect()
}

/// Scores every unordered pair of sequences.
///
/// Summaries come out in nested order: for each sequence in insertion order,
/// its pairings with every later sequence.
pub fn score_all(alignment: &Alignment, params: &ScoringParams) -> ScoreResult<Vec<PairSummary>> {
    let sequences: Vec<&Sequence> = alignment.iter().collect();
    pair_indices(sequences.len())
        .into_iter()
        .map(|(i, j)| score_pair(sequences[i], sequences[j], params))
        .collect()
}

/// Same as [`score_all`], with pairs spread over the current rayon pool.
///
/// Output order is identical to [`score_all`].
pub fn score_all_parallel(alignment: &Alignment, params: &ScoringParams) -> ScoreResult<Vec<PairSummary>> {
    let sequences: Vec<&Sequence> = alignment.iter().collect();
    pair_indices(sequences.len())
        .into_par_iter()
        .map(|(i, j)| score_pair(sequences[i], sequences[j], params))
        .collect()
}

/// Scores every pair on a dedicated pool of `threads` workers.
///
/// A single thread runs [`score_all`] directly.
pub fn score_all_with_threads(
    alignment: &Alignment,
    params: &ScoringParams,
    threads: usize,
) -> ScoreResult<Vec<PairSummary>> {
    if threads <= 1 {
        return score_all(alignment, params);
    }
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    pool.install(|| score_all_parallel(alignment, params))
}
