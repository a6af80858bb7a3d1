use std::rc::Rc;

use enumset::EnumSet;

use crate::config::Settings;
use crate::error::{Modalities, ParseError};
use crate::input::{Modality, Source};

#[derive(Debug, PartialEq, Eq)]
struct Shared {
    source: Source,
    settings: Settings,
}

/// An immutable snapshot of a parse in progress.
///
/// A state carries the shared input, the cursor, and either the result of the
/// last parser or the failure it reported. Parsers never change a state; they
/// derive a new one. Once a state is failed every parser handed that state
/// passes the failure along without looking at the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseState<T> {
    shared: Rc<Shared>,
    cursor: usize,
    outcome: Result<T, ParseError>,
    suppressed: bool,
}

impl ParseState<()> {
    pub fn new(source: impl Into<Source>) -> Self {
        Self::with_settings(source, Settings::default())
    }

    pub fn with_settings(source: impl Into<Source>, settings: Settings) -> Self {
        Self {
            shared: Rc::new(Shared {
                source: source.into(),
                settings,
            }),
            cursor: 0,
            outcome: Ok(()),
            suppressed: false,
        }
    }
}

impl<T> ParseState<T> {
    pub fn source(&self) -> &Source {
        &self.shared.source
    }

    pub fn settings(&self) -> &Settings {
        &self.shared.settings
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn result(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn failure(&self) -> Option<&ParseError> {
        self.outcome.as_ref().err()
    }

    pub fn outcome(&self) -> Result<&T, &ParseError> {
        self.outcome.as_ref()
    }

    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }

    /// Whether enclosing collections should leave this result out.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn is_at_end(&self) -> bool {
        self.source().is_end(self.cursor)
    }

    /// Diagnostic rendering of the input at the cursor.
    pub fn snippet(&self) -> String {
        self.source().snippet(self.cursor, self.settings())
    }

    /// Number of elements left after the cursor.
    pub fn remaining(&self) -> usize {
        self.source().len().saturating_sub(self.cursor)
    }

    /// A successful state at `cursor` carrying `value`.
    pub fn succeed<U>(&self, cursor: usize, value: U) -> ParseState<U> {
        ParseState {
            shared: Rc::clone(&self.shared),
            cursor,
            outcome: Ok(value),
            suppressed: false,
        }
    }

    /// A failed state at this state's cursor.
    pub fn fail<U>(&self, error: ParseError) -> ParseState<U> {
        ParseState {
            shared: Rc::clone(&self.shared),
            cursor: self.cursor,
            outcome: Err(error),
            suppressed: false,
        }
    }

    /// Fail with `NoMatch`, quoting the input at the cursor.
    pub fn no_match<U>(&self, parser: &str, expected: impl Into<String>) -> ParseState<U> {
        self.fail(ParseError::NoMatch {
            parser: parser.to_string(),
            position: self.cursor,
            expected: expected.into(),
            actual: self.snippet(),
        })
    }

    /// Fail with `EndOfInput`, reporting how many elements were left.
    pub fn end_of_input<U>(&self, parser: &str, expected: impl Into<String>) -> ParseState<U> {
        self.fail(ParseError::EndOfInput {
            parser: parser.to_string(),
            position: self.cursor,
            expected: expected.into(),
            available: self.remaining(),
        })
    }

    /// Fail with `BadInputType` for a parser accepting `accepted`.
    pub fn bad_input<U>(&self, parser: &str, accepted: EnumSet<Modality>) -> ParseState<U> {
        self.fail(ParseError::BadInputType {
            parser: parser.to_string(),
            position: self.cursor,
            expected: Modalities(accepted),
            actual: self.source().modality(),
        })
    }

    /// The failure of this state, retyped; `None` if the state succeeded.
    pub fn propagate<U>(&self) -> Option<ParseState<U>> {
        self.failure().map(|error| self.fail(error.clone()))
    }

    /// A result-less state at `cursor`, sharing this state's input.
    pub fn at(&self, cursor: usize) -> ParseState<()> {
        self.succeed(cursor, ())
    }

    /// Transform the result, keeping the cursor and the suppression flag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseState<U> {
        ParseState {
            shared: self.shared,
            cursor: self.cursor,
            outcome: self.outcome.map(f),
            suppressed: self.suppressed,
        }
    }

    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    /// Mark the result as excluded from enclosing collections.
    pub fn suppress(mut self) -> Self {
        self.suppressed = true;
        self
    }

    pub fn into_result(self) -> Result<T, ParseError> {
        self.outcome
    }

    /// Separate the position from the outcome.
    pub fn split(self) -> (ParseState<()>, Result<T, ParseError>) {
        let position = ParseState {
            shared: self.shared,
            cursor: self.cursor,
            outcome: Ok(()),
            suppressed: false,
        };
        (position, self.outcome)
    }
}

/// The capability every parser provides.
///
/// `parse` holds the parser's own logic and is only ever called through
/// [`BoxedParser::execute`](super::BoxedParser::execute), which has already
/// checked that the incoming state is live and that its input has one of the
/// modalities the parser `accepts`.
pub trait Parser<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<T>;

    /// Diagnostic name used in failures.
    fn name(&self) -> &str {
        "parser"
    }

    /// Description of what the parser is looking for.
    fn expected(&self) -> String {
        "a value".to_string()
    }

    fn accepts(&self) -> EnumSet<Modality> {
        EnumSet::all()
    }
}

// Allow closures to be parsers
impl<T, F: Fn(&ParseState<()>) -> ParseState<T>> Parser<T> for F {
    fn parse(&self, state: &ParseState<()>) -> ParseState<T> {
        self(state)
    }
}
