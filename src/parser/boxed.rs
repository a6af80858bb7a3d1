use std::ops::{Add, BitOr, Mul, Shr, Sub};
use std::rc::Rc;

use enumset::EnumSet;

use crate::config::Settings;
use crate::error::ParseError;
use crate::input::{Modality, Source};

use super::combinators::choice;
use super::state::{ParseState, Parser};

// === Boxed Parser for type erasure ===

/// A shared, type-erased parser producing `T`.
///
/// Every primitive and combinator in the crate hands out a `BoxedParser`.
/// Cloning is cheap and clones share the same underlying parser.
pub struct BoxedParser<T> {
    parser: Rc<dyn Parser<T>>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl<T: 'static> BoxedParser<T> {
    pub fn new<P: Parser<T> + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(parser),
        }
    }
}

impl<T> BoxedParser<T> {
    pub fn name(&self) -> &str {
        self.parser.name()
    }

    pub fn expected(&self) -> String {
        self.parser.expected()
    }

    pub fn accepts(&self) -> EnumSet<Modality> {
        self.parser.accepts()
    }

    /// Run the parser against `state`.
    ///
    /// A failed `state` is passed through untouched (retyped). Input of a
    /// modality the parser does not accept fails with `BadInputType` before the
    /// parser's own logic runs.
    pub fn execute<U>(&self, state: &ParseState<U>) -> ParseState<T> {
        if let Some(failed) = state.propagate() {
            return failed;
        }

        let accepted = self.accepts();
        if !accepted.contains(state.source().modality()) {
            return state.bad_input(self.name(), accepted);
        }

        self.parser.parse(&state.at(state.cursor()))
    }

    /// Parse `input` from its first element.
    pub fn run(&self, input: impl Into<Source>) -> ParseState<T> {
        self.run_with(input, Settings::default())
    }

    pub fn run_with(&self, input: impl Into<Source>, settings: Settings) -> ParseState<T> {
        let initial = ParseState::with_settings(input, settings);
        log::debug!(
            "running {} parser over {} elements of {}",
            self.name(),
            initial.source().len(),
            initial.source().modality()
        );

        let outcome = self.execute(&initial);
        match outcome.failure() {
            Some(error) => log::debug!("{} parser failed: {error}", self.name()),
            None => log::debug!("{} parser stopped at {}", self.name(), outcome.cursor()),
        }
        outcome
    }

    /// Parse `input` and return the result, or the failure as an error.
    pub fn get_result(&self, input: impl Into<Source>) -> Result<T, ParseError> {
        self.run(input).into_result()
    }

    /// Parse `input` and hand the outcome to exactly one of two continuations.
    pub fn fork<R>(
        &self,
        input: impl Into<Source>,
        on_success: impl FnOnce(&T, &ParseState<T>) -> R,
        on_failure: impl FnOnce(&ParseError, &ParseState<T>) -> R,
    ) -> R {
        let state = self.run(input);
        match state.outcome() {
            Ok(value) => on_success(value, &state),
            Err(error) => on_failure(error, &state),
        }
    }
}

/// Wraps a parser and rewrites its successful states.
struct MapState<T, U> {
    inner: BoxedParser<T>,
    mapper: Rc<dyn Fn(ParseState<T>) -> ParseState<U>>,
}

impl<T, U> Parser<U> for MapState<T, U> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<U> {
        let next = self.inner.execute(state);
        match next.propagate() {
            Some(failed) => failed,
            None => (self.mapper)(next),
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn expected(&self) -> String {
        self.inner.expected()
    }

    fn accepts(&self) -> EnumSet<Modality> {
        self.inner.accepts()
    }
}

/// Overrides the diagnostic name and, optionally, the expected descriptor.
struct Named<T> {
    inner: BoxedParser<T>,
    name: String,
    label: Option<String>,
}

impl<T> Parser<T> for Named<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<T> {
        let next = self.inner.execute(state);
        let Some(error) = next.failure() else {
            return next;
        };

        let mut error = error.clone();
        if let Some(label) = &self.label {
            error = error.relabel(label);
        }
        if error.parser() == self.inner.name() {
            error = error.renamed(&self.name);
        }
        state.fail(error)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn expected(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.inner.expected())
    }

    fn accepts(&self) -> EnumSet<Modality> {
        self.inner.accepts()
    }
}

// === Combinators as methods ===

impl<T: 'static> BoxedParser<T> {
    /// Map: transform the result of a successful parse.
    pub fn map<U: 'static, F: Fn(T) -> U + 'static>(self, f: F) -> BoxedParser<U> {
        self.map_state(move |state| state.map(&f))
    }

    /// Map the whole successful state, e.g. to move the cursor along with the result.
    pub fn map_state<U: 'static, F>(self, f: F) -> BoxedParser<U>
    where
        F: Fn(ParseState<T>) -> ParseState<U> + 'static,
    {
        BoxedParser::new(MapState {
            inner: self,
            mapper: Rc::new(f),
        })
    }

    /// Keep matching as before, but leave the result out of enclosing collections.
    pub fn ignore(self) -> BoxedParser<T> {
        self.map_state(ParseState::suppress)
    }

    /// Report failures of this parser under `name`.
    pub fn named(self, name: impl Into<String>) -> BoxedParser<T> {
        BoxedParser::new(Named {
            inner: self,
            name: name.into(),
            label: None,
        })
    }

    /// Add a label to this parser for better error messages
    pub fn label(self, expected: impl Into<String>) -> BoxedParser<T> {
        let name = self.name().to_string();
        BoxedParser::new(Named {
            inner: self,
            name,
            label: Some(expected.into()),
        })
    }

    /// Sequence: parse self then other, return (T, U)
    pub fn seq<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<(T, U)> {
        BoxedParser::new(move |state: &ParseState<()>| {
            let (after_first, first) = self.execute(state).split();
            let first = match first {
                Ok(value) => value,
                Err(error) => return state.fail(error),
            };
            let (after_second, second) = other.execute(&after_first).split();
            match second {
                Ok(value) => after_second.succeed(after_second.cursor(), (first, value)),
                Err(error) => state.fail(error),
            }
        })
    }

    /// Keep left: parse self then other, discard other's result
    pub fn skip<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<T> {
        self.seq(other).map(|(a, _)| a)
    }

    /// Keep right: parse self then other, discard self's result
    pub fn skip_left<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<U> {
        self.seq(other).map(|(_, b)| b)
    }

    /// Choice: try self, if fails try other
    pub fn or(self, other: BoxedParser<T>) -> BoxedParser<T> {
        choice(vec![self, other])
    }
}

// === Operator Overloading ===

/// `+` for sequence: A + B -> (A, B)
impl<T: 'static, U: 'static> Add<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<(T, U)>;

    fn add(self, rhs: BoxedParser<U>) -> Self::Output {
        self.seq(rhs)
    }
}

/// `-` for keep left: A - B -> A (parse B, discard result)
impl<T: 'static, U: 'static> Sub<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn sub(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip(rhs)
    }
}

/// `*` for keep right: A * B -> B (parse A, discard result)
impl<T: 'static, U: 'static> Mul<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn mul(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip_left(rhs)
    }
}

/// `|` for choice: A | B -> A or B
impl<T: 'static> BitOr<BoxedParser<T>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn bitor(self, rhs: BoxedParser<T>) -> Self::Output {
        self.or(rhs)
    }
}

/// `>>` for map: A >> fn -> B
impl<T: 'static, U: 'static, F: Fn(T) -> U + 'static> Shr<F> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}
