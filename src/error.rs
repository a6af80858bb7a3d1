//! # Failure Model
//!
//! Every parser reports failure through one record type, [`ParseError`].
//! Primitives raise the base kinds directly. Combinators either recover from a
//! sub-failure (choice, maybe, the repetition family) or re-raise it with extra
//! context (sequence, repeat) while keeping the position the failure happened
//! at.
//!
//! Building a grammar can fail too (bad regular expression, unsupported binary
//! width). Those are reported separately through [`Error`], before any input is
//! read.

use std::fmt;

use enumset::EnumSet;
use thiserror::Error;

use crate::input::{Modality, describe_modalities};

/// Coarse classification of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NoMatch,
    EndOfInput,
    BadInputType,
    CountOutOfRange,
    UserRejected,
}

/// The set of modalities a parser accepts, as carried in failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modalities(pub EnumSet<Modality>);

impl fmt::Display for Modalities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe_modalities(self.0))
    }
}

/// Inclusive count range for repetitions. A missing `max` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repetition {
    pub min: usize,
    pub max: Option<usize>,
}

impl Repetition {
    /// Bounds given in the wrong order are swapped.
    pub fn new(min: usize, max: Option<usize>) -> Self {
        match max {
            Some(max) if max < min => Self {
                min: max,
                max: Some(min),
            },
            _ => Self { min, max },
        }
    }

    pub fn any() -> Self {
        Self::new(0, None)
    }

    pub fn at_least(min: usize) -> Self {
        Self::new(min, None)
    }

    pub fn at_most(max: usize) -> Self {
        Self::new(0, Some(max))
    }

    pub fn exactly(count: usize) -> Self {
        Self::new(count, Some(count))
    }

    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }

    /// True once `count` successes make the range unreachable.
    pub(crate) fn exceeded_by(&self, count: usize) -> bool {
        self.max.is_some_and(|max| count > max)
    }
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (min, Some(max)) if min == max => write!(f, "exactly {min}"),
            (0, None) => f.write_str("any number of"),
            (min, None) => write!(f, "at least {min}"),
            (min, Some(max)) => write!(f, "{min}-{max}"),
        }
    }
}

/// A structured parse failure.
///
/// `parser` is the diagnostic name of the parser that reported it and
/// `position` the cursor index it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{parser} parser (position {position}): expected {expected}, found {actual}")]
    NoMatch {
        parser: String,
        position: usize,
        expected: String,
        actual: String,
    },

    #[error(
        "{parser} parser (position {position}): expected {expected}, but only {available} element(s) remain"
    )]
    EndOfInput {
        parser: String,
        position: usize,
        expected: String,
        available: usize,
    },

    #[error("{parser} parser (position {position}): expected {expected}, got {actual}")]
    BadInputType {
        parser: String,
        position: usize,
        expected: Modalities,
        actual: Modality,
    },

    #[error("{parser} parser (position {position}): expected {expected} values, got {actual}")]
    CountOutOfRange {
        parser: String,
        position: usize,
        expected: Repetition,
        actual: usize,
        /// The sub-failure that stopped the repetition, when one is relevant.
        cause: Option<Box<ParseError>>,
    },

    #[error("{parser} parser (position {position}): {message}")]
    UserRejected {
        parser: String,
        position: usize,
        message: String,
    },

    /// A failure of element `element` of a composite parser.
    #[error("{parser} parser, element {element}: {inner}")]
    Context {
        parser: String,
        element: usize,
        #[source]
        inner: Box<ParseError>,
    },
}

impl ParseError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ParseError::NoMatch { .. } => FailureKind::NoMatch,
            ParseError::EndOfInput { .. } => FailureKind::EndOfInput,
            ParseError::BadInputType { .. } => FailureKind::BadInputType,
            ParseError::CountOutOfRange { .. } => FailureKind::CountOutOfRange,
            ParseError::UserRejected { .. } => FailureKind::UserRejected,
            ParseError::Context { inner, .. } => inner.kind(),
        }
    }

    pub fn position(&self) -> usize {
        match self {
            ParseError::NoMatch { position, .. }
            | ParseError::EndOfInput { position, .. }
            | ParseError::BadInputType { position, .. }
            | ParseError::CountOutOfRange { position, .. }
            | ParseError::UserRejected { position, .. } => *position,
            ParseError::Context { inner, .. } => inner.position(),
        }
    }

    /// Name of the parser that reported the failure.
    pub fn parser(&self) -> &str {
        match self {
            ParseError::NoMatch { parser, .. }
            | ParseError::EndOfInput { parser, .. }
            | ParseError::BadInputType { parser, .. }
            | ParseError::CountOutOfRange { parser, .. }
            | ParseError::UserRejected { parser, .. }
            | ParseError::Context { parser, .. } => parser,
        }
    }

    /// The innermost failure, looking through `Context` wrappers.
    pub fn root(&self) -> &ParseError {
        match self {
            ParseError::Context { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Move the failure to `position`, keeping everything else.
    pub fn at(mut self, position: usize) -> Self {
        self.reposition(position);
        self
    }

    /// Replace the expected descriptor of `NoMatch` and `EndOfInput` failures.
    pub(crate) fn relabel(mut self, label: &str) -> Self {
        self.set_expected(label);
        self
    }

    /// Report the failure under another parser name.
    pub(crate) fn renamed(mut self, name: &str) -> Self {
        match &mut self {
            ParseError::NoMatch { parser, .. }
            | ParseError::EndOfInput { parser, .. }
            | ParseError::BadInputType { parser, .. }
            | ParseError::CountOutOfRange { parser, .. }
            | ParseError::UserRejected { parser, .. }
            | ParseError::Context { parser, .. } => *parser = name.to_string(),
        }
        self
    }

    fn reposition(&mut self, new_position: usize) {
        match self {
            ParseError::NoMatch { position, .. }
            | ParseError::EndOfInput { position, .. }
            | ParseError::BadInputType { position, .. }
            | ParseError::CountOutOfRange { position, .. }
            | ParseError::UserRejected { position, .. } => *position = new_position,
            ParseError::Context { inner, .. } => inner.reposition(new_position),
        }
    }

    fn set_expected(&mut self, label: &str) {
        match self {
            ParseError::NoMatch { expected, .. } | ParseError::EndOfInput { expected, .. } => {
                *expected = label.to_string();
            }
            ParseError::Context { inner, .. } => inner.set_expected(label),
            _ => {}
        }
    }
}

/// Errors raised while building a grammar.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid regular expression: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("pattern {pattern:?} has no capture group {group}")]
    MissingGroup { pattern: String, group: usize },
    #[error("unsupported binary width {0}, use 1 to 8 bytes")]
    UnsupportedWidth(usize),
}
