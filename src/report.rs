//! Text report of pairwise scores.
//!
//! One line per pair:
//!
//! ```text
//! s1-s2: Identity: 1/4 (25.0%), Gaps: 3/4 (75.0%), Score=-2
//! ```

use std::fmt;
use std::io::{self, Write};

use crate::scoring::PairSummary;

/// Formats a percentage with one decimal, or `n/a` when undefined.
struct Pct(Option<f64>);

impl fmt::Display for Pct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:.1}%", value),
            None => write!(f, "n/a"),
        }
    }
}

impl fmt::Display for PairSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let denominator = self.denominator();
        write!(
            f,
            "{}-{}: Identity: {}/{} ({}), Gaps: {}/{} ({}), Score={}",
            self.id_a,
            self.id_b,
            self.identity_count,
            denominator,
            Pct(self.identity_pct()),
            self.gap_count,
            denominator,
            Pct(self.gaps_pct()),
            self.score
        )
    }
}

/// Writes all summaries to `writer`, one line each.
pub fn write_report<W: Write>(writer: &mut W, summaries: &[PairSummary]) -> io::Result<()> {
    for summary in summaries {
        writeln!(writer, "{}", summary)?;
    }
    writer.flush()
}
