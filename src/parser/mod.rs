//! Log line parsing.
//!
//! Experiment logs are whitespace-tokenized, one record per line. Three
//! shapes matter:
//!
//! - `population size set to <N>` — declares the population-size label.
//! - `using <strategy> selection mechanism ...` — declares the
//!   selection-strategy label (token carries a trailing punctuation
//!   character).
//! - `gen <G>: edd [<avg> : <max>] ...` — a generation record; the
//!   generation token ends with `:` and the fitness token starts with `[`.
//!
//! Every other line only contributes a progress token. All positions are
//! validated explicitly so a short or garbled line surfaces as a typed
//! [`ParseError`] instead of an out-of-range fault.

use crate::models::Grouping;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// First token of a generation record.
const GENERATION_MARKER: &str = "gen";

/// Token index holding the progress value (on every line).
const PROGRESS_TOKEN: usize = 1;
/// Token index holding the group label on a marker line.
const LABEL_TOKEN: usize = 4;
/// Token index holding the generation number on a `gen` line.
const GENERATION_TOKEN: usize = 1;
/// Token index holding the fitness value on a `gen` line.
const FITNESS_TOKEN: usize = 3;

/// Error produced when a line does not match its expected shape.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The line has tokens, but not enough of them for any record type.
    #[error("line has {found} token(s), need at least {expected}")]
    TooShort { expected: usize, found: usize },

    /// A marker line is missing its label token.
    #[error("`{marker}` line has {found} token(s), need at least {expected}")]
    MissingField {
        marker: &'static str,
        expected: usize,
        found: usize,
    },

    /// The label token was empty after stripping.
    #[error("`{marker}` line has an empty group label")]
    EmptyLabel { marker: &'static str },

    /// The generation token did not parse as an integer.
    #[error("invalid generation number `{token}`: {source}")]
    InvalidGeneration {
        token: String,
        source: ParseIntError,
    },

    /// The fitness token did not parse as a number.
    #[error("invalid fitness value `{token}`: {source}")]
    InvalidFitness {
        token: String,
        source: ParseFloatError,
    },
}

/// The typed content of one log line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineRecord {
    /// A group-label declaration; subsequent generation records belong to it.
    Group { label: String },
    /// A generation record.
    Generation { generation: u64, fitness: f64 },
    /// Recognized as well-formed, but carries no record.
    Other,
}

/// A fully parsed, non-blank line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// Progress token: the second token with its trailing character removed.
    pub progress: String,
    /// What the line records, if anything.
    pub record: LineRecord,
}

/// Parse one line under the given grouping.
///
/// Returns `Ok(None)` for blank lines. Parsing mutates nothing, so a line
/// that errors contributes nothing to the aggregation, including its
/// progress token.
pub fn parse_line(line: &str, grouping: Grouping) -> Result<Option<ParsedLine>, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    if tokens.is_empty() {
        return Ok(None);
    }
    if tokens.len() <= PROGRESS_TOKEN {
        return Err(ParseError::TooShort {
            expected: PROGRESS_TOKEN + 1,
            found: tokens.len(),
        });
    }

    let progress = strip_last(tokens[PROGRESS_TOKEN]).to_string();

    let record = if tokens[0] == grouping.marker() {
        parse_group(&tokens, grouping)?
    } else if tokens[0] == GENERATION_MARKER {
        parse_generation(&tokens)?
    } else {
        LineRecord::Other
    };

    Ok(Some(ParsedLine { progress, record }))
}

/// Extract the label from a marker line.
fn parse_group(tokens: &[&str], grouping: Grouping) -> Result<LineRecord, ParseError> {
    let marker = grouping.marker();

    if tokens.len() <= LABEL_TOKEN {
        return Err(ParseError::MissingField {
            marker,
            expected: LABEL_TOKEN + 1,
            found: tokens.len(),
        });
    }

    let raw = tokens[LABEL_TOKEN];
    let label = if grouping.strips_label() {
        strip_last(raw)
    } else {
        raw
    };

    if label.is_empty() {
        return Err(ParseError::EmptyLabel { marker });
    }

    Ok(LineRecord::Group {
        label: label.to_string(),
    })
}

/// Extract generation and fitness from a `gen` line.
fn parse_generation(tokens: &[&str]) -> Result<LineRecord, ParseError> {
    if tokens.len() <= FITNESS_TOKEN {
        return Err(ParseError::MissingField {
            marker: GENERATION_MARKER,
            expected: FITNESS_TOKEN + 1,
            found: tokens.len(),
        });
    }

    // `gen 42: ...` — the generation number ends with a separator.
    let gen_token = strip_last(tokens[GENERATION_TOKEN]);
    let generation = gen_token
        .parse::<u64>()
        .map_err(|source| ParseError::InvalidGeneration {
            token: tokens[GENERATION_TOKEN].to_string(),
            source,
        })?;

    // `... [0.75 : ...` — the fitness value opens with a bracket.
    let fit_token = strip_first(tokens[FITNESS_TOKEN]);
    let fitness = fit_token
        .parse::<f64>()
        .map_err(|source| ParseError::InvalidFitness {
            token: tokens[FITNESS_TOKEN].to_string(),
            source,
        })?;

    Ok(LineRecord::Generation {
        generation,
        fitness,
    })
}

/// Drop the last character of a token.
fn strip_last(token: &str) -> &str {
    let mut chars = token.chars();
    chars.next_back();
    chars.as_str()
}

/// Drop the first character of a token.
fn strip_first(token: &str) -> &str {
    let mut chars = token.chars();
    chars.next();
    chars.as_str()
}
