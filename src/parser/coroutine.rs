//! # Step-by-step rules
//!
//! [`coroutine`] lets a grammar rule be written as an ordinary function. The
//! body receives a [`Coroutine`] and calls [`Coroutine::step`] for every
//! sub-parser it wants to run. A successful step advances the captured
//! position and hands back the value. A failed step returns an [`Abort`], which
//! the body passes up with `?`, abandoning the rule.
//!
//! ```
//! use plait::parser::{character, coroutine, digits, letters};
//!
//! let assignment = coroutine(|co| {
//!     let name = co.step(&letters())?;
//!     co.step(&character('='))?;
//!     let value: u32 = co.step(&digits())?.parse().map_err(|_| co.reject("number too large"))?;
//!     Ok((name, value))
//! });
//!
//! assert_eq!(assignment.get_result("x=42").unwrap(), ("x".to_string(), 42));
//! ```

use std::fmt;

use crate::error::ParseError;

use super::boxed::BoxedParser;
use super::state::{ParseState, Parser};

/// The reason a rule body stopped early. Carries the failure to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abort(ParseError);

impl Abort {
    pub fn error(&self) -> &ParseError {
        &self.0
    }

    pub fn into_error(self) -> ParseError {
        self.0
    }
}

impl From<ParseError> for Abort {
    fn from(error: ParseError) -> Self {
        Abort(error)
    }
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule aborted: {}", self.0)
    }
}

/// The position a rule body is parsing from.
pub struct Coroutine {
    state: ParseState<()>,
    start: usize,
}

impl Coroutine {
    /// Run `parser` at the current position.
    ///
    /// On success the position moves past what `parser` consumed. On failure
    /// the position is left alone and the returned [`Abort`] should be
    /// propagated out of the body.
    pub fn step<U>(&mut self, parser: &BoxedParser<U>) -> Result<U, Abort> {
        let (after, outcome) = parser.execute(&self.state).split();
        let value = outcome?;
        self.state = after;
        Ok(value)
    }

    /// Like [`step`](Self::step), but a failure is not fatal: the position is
    /// kept and `None` is returned.
    pub fn attempt<U>(&mut self, parser: &BoxedParser<U>) -> Option<U> {
        self.step(parser).ok()
    }

    /// Abandon the rule with a `UserRejected` failure at the current position.
    pub fn reject(&self, message: impl Into<String>) -> Abort {
        Abort(ParseError::UserRejected {
            parser: "coroutine".to_string(),
            position: self.state.cursor(),
            message: message.into(),
        })
    }

    pub fn position(&self) -> usize {
        self.state.cursor()
    }

    pub fn state(&self) -> &ParseState<()> {
        &self.state
    }

    pub fn is_at_end(&self) -> bool {
        self.state.is_at_end()
    }
}

type Body<T> = dyn Fn(&mut Coroutine) -> Result<T, Abort>;

struct CoroutineParser<T> {
    body: Box<Body<T>>,
}

impl<T> Parser<T> for CoroutineParser<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<T> {
        let mut context = Coroutine {
            state: state.clone(),
            start: state.cursor(),
        };

        match (self.body)(&mut context) {
            Ok(value) => context.state.succeed(context.state.cursor(), value),
            Err(Abort(error)) => {
                log::trace!("coroutine aborted at {}: {error}", context.position());
                let error = if context.position() == context.start {
                    error.at(context.start)
                } else {
                    error
                };
                state.fail(error)
            }
        }
    }

    fn name(&self) -> &str {
        "coroutine"
    }

    fn expected(&self) -> String {
        "a value produced by a rule".to_string()
    }
}

/// A parser whose logic is the function `body`.
///
/// The result is the body's return value and the parser ends where the last
/// successful step ended. Failures propagated out of the body fail the parser
/// as a whole, starting over from its original position.
pub fn coroutine<T: 'static, F>(body: F) -> BoxedParser<T>
where
    F: Fn(&mut Coroutine) -> Result<T, Abort> + 'static,
{
    BoxedParser::new(CoroutineParser {
        body: Box::new(body),
    })
}
