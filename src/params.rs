//! Scoring parameters.
//!
//! Four weights drive the pairwise scorer. Defaults can be overridden by a
//! parameter file with one `name = value` pair per line:
//!
//! ```text
//! match_score = 2
//! transition = -0.5
//! transversion = -2
//! gap_penalty = -3
//! ```
//!
//! Parameter names are matched case-sensitively. Any real number is accepted
//! as a value.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use thiserror::Error;

/// Errors that can occur while building scoring parameters.
#[derive(Error, Debug)]
pub enum ParamError {
    #[error("Unknown parameter '{0}' (expected match_score, transition, transversion or gap_penalty)")]
    InvalidParameterName(String),

    #[error("Parameter '{name}' has non-numeric value '{value}'")]
    InvalidParameterValue { name: String, value: String },

    #[error("Line {line}: missing '=' (expected 'name = value')")]
    MissingEquals { line: usize },

    #[error("Line {line}: more than one '=' (expected 'name = value')")]
    MultipleEquals { line: usize },

    #[error("Parameter file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read parameter file: {0}")]
    Io(#[from] io::Error),
}

/// Result type for parameter operations.
pub type ParamResult<T> = Result<T, ParamError>;

/// Names of the tunable weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamName {
    MatchScore,
    Transition,
    Transversion,
    GapPenalty,
}

impl ParamName {
    pub const ALL: [ParamName; 4] = [
        ParamName::MatchScore,
        ParamName::Transition,
        ParamName::Transversion,
        ParamName::GapPenalty,
    ];

    /// Name as written in a parameter file.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamName::MatchScore => "match_score",
            ParamName::Transition => "transition",
            ParamName::Transversion => "transversion",
            ParamName::GapPenalty => "gap_penalty",
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamName {
    type Err = ParamError;

    fn from_str(s: &str) -> ParamResult<Self> {
        ParamName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ParamError::InvalidParameterName(s.to_string()))
    }
}

/// Weights applied to each kind of aligned column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    /// Added for identical non-gap bases
    pub match_score: f64,
    /// Added for A<->G or C<->T substitutions
    pub transition: f64,
    /// Added for purine<->pyrimidine substitutions
    pub transversion: f64,
    /// Added for a gap facing a base
    pub gap_penalty: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            match_score: 1.0,
            transition: -1.0,
            transversion: -2.0,
            gap_penalty: -1.0,
        }
    }
}

impl ScoringParams {
    /// Sets the weight for `name`.
    pub fn set(&mut self, name: ParamName, value: f64) {
        match name {
            ParamName::MatchScore => self.match_score = value,
            ParamName::Transition => self.transition = value,
            ParamName::Transversion => self.transversion = value,
            ParamName::GapPenalty => self.gap_penalty = value,
        }
    }

    /// Applies named overrides on top of `self`; later overrides win.
    ///
    /// Fails on the first unknown name or unparseable value, leaving no
    /// partially merged result.
    pub fn merge<I, K, V>(&self, overrides: I) -> ParamResult<ScoringParams>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut merged = *self;
        for (name, value) in overrides {
            let (name, value) = (name.as_ref().trim(), value.as_ref().trim());
            let param: ParamName = name.parse()?;
            let parsed: f64 = value.parse().map_err(|_| ParamError::InvalidParameterValue {
                name: name.to_string(),
                value: value.to_string(),
            })?;
            debug!("Overriding {} = {}", param, parsed);
            merged.set(param, parsed);
        }
        Ok(merged)
    }
}

/// Splits parameter file content into `(name, value)` pairs.
///
/// Empty lines are skipped; every other line must contain exactly one `=`.
pub fn parse_overrides(content: &str) -> ParamResult<Vec<(String, String)>> {
    let mut overrides = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let mut parts = line.split('=');
        let name = parts.next().unwrap_or("");
        let value = parts
            .next()
            .ok_or(ParamError::MissingEquals { line: line_number })?;
        if parts.next().is_some() {
            return Err(ParamError::MultipleEquals { line: line_number });
        }

        overrides.push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok(overrides)
}

/// Parses parameter file content into parameters merged over the defaults.
pub fn parse_params_str(content: &str) -> ParamResult<ScoringParams> {
    ScoringParams::default().merge(parse_overrides(content)?)
}

/// Loads a parameter file and merges it over the defaults.
pub fn load_params_file<P: AsRef<Path>>(path: P) -> ParamResult<ScoringParams> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ParamError::NotFound(path.to_path_buf()),
        _ => ParamError::Io(e),
    })?;
    parse_params_str(&content)
}
