use std::fmt::Display;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use enumset::EnumSet;
use once_cell::unsync::OnceCell;

use crate::error::{ParseError, Repetition};
use crate::input::{Item, Modality};

use super::boxed::BoxedParser;
use super::state::{ParseState, Parser};

// === Choice and sequence ===

struct Choice<T> {
    alternatives: Vec<BoxedParser<T>>,
}

impl<T> Parser<T> for Choice<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<T> {
        for (index, alternative) in self.alternatives.iter().enumerate() {
            let next = alternative.execute(state);
            match next.failure() {
                None => return next,
                Some(error) => log::trace!("choice alternative {index} failed: {error}"),
            }
        }
        state.no_match(self.name(), self.expected())
    }

    fn name(&self) -> &str {
        "choice"
    }

    fn expected(&self) -> String {
        let options = self
            .alternatives
            .iter()
            .map(BoxedParser::expected)
            .collect::<Vec<_>>();
        format!("one of {}", options.join(", "))
    }

    fn accepts(&self) -> EnumSet<Modality> {
        if self.alternatives.is_empty() {
            return EnumSet::all();
        }
        self.alternatives
            .iter()
            .fold(EnumSet::empty(), |set, alternative| set | alternative.accepts())
    }
}

/// Ordered choice: the first alternative that matches at the current position
/// wins. Later alternatives are not run once one succeeds.
pub fn choice<T: 'static>(alternatives: Vec<BoxedParser<T>>) -> BoxedParser<T> {
    BoxedParser::new(Choice { alternatives })
}

struct Sequence<T> {
    parsers: Vec<BoxedParser<T>>,
}

impl<T> Parser<Vec<T>> for Sequence<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<Vec<T>> {
        let mut current = state.clone();
        let mut values = Vec::with_capacity(self.parsers.len());

        for (element, parser) in self.parsers.iter().enumerate() {
            let next = parser.execute(&current);
            let suppressed = next.is_suppressed();
            let (after, outcome) = next.split();
            match outcome {
                Ok(value) if !suppressed => values.push(value),
                Ok(_) => {}
                Err(inner) => {
                    return state.fail(ParseError::Context {
                        parser: self.name().to_string(),
                        element,
                        inner: Box::new(inner),
                    });
                }
            }
            current = after;
        }

        current.succeed(current.cursor(), values)
    }

    fn name(&self) -> &str {
        "sequence"
    }

    fn expected(&self) -> String {
        match self.parsers.first() {
            Some(first) => first.expected(),
            None => "nothing".to_string(),
        }
    }
}

/// Run `parsers` in order and collect their results, leaving out ignored ones.
///
/// Stops at the first failure, which is reported wrapped in a
/// [`ParseError::Context`] naming the failing element.
pub fn sequence<T: 'static>(parsers: Vec<BoxedParser<T>>) -> BoxedParser<Vec<T>> {
    BoxedParser::new(Sequence { parsers })
}

/// `before`, then `value`, then `after`; only the result of `value` is kept.
pub fn between<A: 'static, T: 'static, B: 'static>(
    before: BoxedParser<A>,
    after: BoxedParser<B>,
    value: BoxedParser<T>,
) -> BoxedParser<T> {
    before * value - after
}

// === Repetition ===

struct Many<T> {
    inner: BoxedParser<T>,
    range: Repetition,
}

impl<T> Parser<Vec<T>> for Many<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<Vec<T>> {
        let mut current = state.clone();
        let mut values = Vec::new();
        let mut count = 0;

        loop {
            let next = self.inner.execute(&current);
            let suppressed = next.is_suppressed();
            let (after, outcome) = next.split();
            let value = match outcome {
                Ok(value) => value,
                Err(error) => {
                    log::trace!("many stopped after {count} matches: {error}");
                    break;
                }
            };

            count += 1;
            if !suppressed {
                values.push(value);
            }

            let progressed = after.cursor() != current.cursor();
            current = after;
            if !progressed || self.range.exceeded_by(count) {
                break;
            }
        }

        if !self.range.contains(count) {
            return state.fail(ParseError::CountOutOfRange {
                parser: self.name().to_string(),
                position: state.cursor(),
                expected: self.range,
                actual: count,
                cause: None,
            });
        }

        current.succeed(current.cursor(), values)
    }

    fn name(&self) -> &str {
        "many"
    }

    fn expected(&self) -> String {
        format!("{} {}", self.range, self.inner.expected())
    }

    fn accepts(&self) -> EnumSet<Modality> {
        self.inner.accepts()
    }
}

fn repeated<T: 'static>(parser: BoxedParser<T>, range: Repetition) -> BoxedParser<Vec<T>> {
    BoxedParser::new(Many {
        inner: parser,
        range,
    })
}

/// Zero or more matches. Never fails.
pub fn many<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    repeated(parser, Repetition::any())
}

/// Between `min` and `max` matches, inclusive. Bounds given in the wrong order
/// are swapped.
///
/// Matching is greedy: up to `max + 1` attempts are made, so input holding more
/// than `max` matches fails with `CountOutOfRange`.
pub fn many_range<T: 'static>(
    parser: BoxedParser<T>,
    min: usize,
    max: usize,
) -> BoxedParser<Vec<T>> {
    repeated(parser, Repetition::new(min, Some(max)))
}

pub fn at_least<T: 'static>(parser: BoxedParser<T>, min: usize) -> BoxedParser<Vec<T>> {
    repeated(parser, Repetition::at_least(min))
}

pub fn at_least_one<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    at_least(parser, 1)
}

pub fn at_most<T: 'static>(parser: BoxedParser<T>, max: usize) -> BoxedParser<Vec<T>> {
    repeated(parser, Repetition::at_most(max))
}

pub fn exactly<T: 'static>(parser: BoxedParser<T>, count: usize) -> BoxedParser<Vec<T>> {
    repeated(parser, Repetition::exactly(count))
}

struct SeparatedBy<S, T> {
    separator: BoxedParser<S>,
    value: BoxedParser<T>,
    range: Repetition,
}

impl<S, T> Parser<Vec<T>> for SeparatedBy<S, T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<Vec<T>> {
        let mut current = state.clone();
        let mut values = Vec::new();
        let mut count = 0;

        loop {
            let next = if count == 0 {
                self.value.execute(&current)
            } else {
                self.value.execute(&self.separator.execute(&current))
            };

            // a separator without a value is left unconsumed
            let suppressed = next.is_suppressed();
            let (after, outcome) = next.split();
            let value = match outcome {
                Ok(value) => value,
                Err(error) => {
                    log::trace!("separated list stopped after {count} values: {error}");
                    break;
                }
            };

            count += 1;
            if !suppressed {
                values.push(value);
            }

            let progressed = after.cursor() != current.cursor();
            current = after;
            if !progressed || self.range.exceeded_by(count) {
                break;
            }
        }

        if !self.range.contains(count) {
            return state.fail(ParseError::CountOutOfRange {
                parser: self.name().to_string(),
                position: state.cursor(),
                expected: self.range,
                actual: count,
                cause: None,
            });
        }

        current.succeed(current.cursor(), values)
    }

    fn name(&self) -> &str {
        "separated_by"
    }

    fn expected(&self) -> String {
        format!(
            "{} {} separated by {}",
            self.range,
            self.value.expected(),
            self.separator.expected()
        )
    }

    fn accepts(&self) -> EnumSet<Modality> {
        self.value.accepts()
    }
}

fn separated<S: 'static, T: 'static>(
    separator: BoxedParser<S>,
    value: BoxedParser<T>,
    range: Repetition,
) -> BoxedParser<Vec<T>> {
    BoxedParser::new(SeparatedBy {
        separator,
        value,
        range,
    })
}

/// Zero or more `value`s with a `separator` between each pair.
///
/// A trailing separator that is not followed by a value is not consumed.
pub fn separated_by<S: 'static, T: 'static>(
    separator: BoxedParser<S>,
    value: BoxedParser<T>,
) -> BoxedParser<Vec<T>> {
    separated(separator, value, Repetition::any())
}

pub fn separated_by_range<S: 'static, T: 'static>(
    separator: BoxedParser<S>,
    value: BoxedParser<T>,
    min: usize,
    max: usize,
) -> BoxedParser<Vec<T>> {
    separated(separator, value, Repetition::new(min, Some(max)))
}

pub fn at_least_separated_by<S: 'static, T: 'static>(
    separator: BoxedParser<S>,
    value: BoxedParser<T>,
    min: usize,
) -> BoxedParser<Vec<T>> {
    separated(separator, value, Repetition::at_least(min))
}

pub fn at_least_one_separated_by<S: 'static, T: 'static>(
    separator: BoxedParser<S>,
    value: BoxedParser<T>,
) -> BoxedParser<Vec<T>> {
    at_least_separated_by(separator, value, 1)
}

pub fn at_most_separated_by<S: 'static, T: 'static>(
    separator: BoxedParser<S>,
    value: BoxedParser<T>,
    max: usize,
) -> BoxedParser<Vec<T>> {
    separated(separator, value, Repetition::at_most(max))
}

pub fn exactly_separated_by<S: 'static, T: 'static>(
    separator: BoxedParser<S>,
    value: BoxedParser<T>,
    count: usize,
) -> BoxedParser<Vec<T>> {
    separated(separator, value, Repetition::exactly(count))
}

struct Repeat<T> {
    inner: BoxedParser<T>,
    count: usize,
}

impl<T> Parser<Vec<T>> for Repeat<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<Vec<T>> {
        let mut current = state.clone();
        let mut values = Vec::with_capacity(self.count);

        for index in 0..self.count {
            let next = self.inner.execute(&current);
            let suppressed = next.is_suppressed();
            let (after, outcome) = next.split();
            match outcome {
                Ok(value) if !suppressed => values.push(value),
                Ok(_) => {}
                Err(cause) => {
                    return state.fail(ParseError::CountOutOfRange {
                        parser: self.name().to_string(),
                        position: cause.position(),
                        expected: Repetition::exactly(self.count),
                        actual: index,
                        cause: Some(Box::new(cause)),
                    });
                }
            }
            current = after;
        }

        current.succeed(current.cursor(), values)
    }

    fn name(&self) -> &str {
        "repeat"
    }

    fn expected(&self) -> String {
        format!("exactly {} {}", self.count, self.inner.expected())
    }

    fn accepts(&self) -> EnumSet<Modality> {
        self.inner.accepts()
    }
}

/// Exactly `count` matches. Further matches are not attempted.
pub fn repeat<T: 'static>(parser: BoxedParser<T>, count: usize) -> BoxedParser<Vec<T>> {
    BoxedParser::new(Repeat {
        inner: parser,
        count,
    })
}

// === Optional and zero-width ===

struct Maybe<T> {
    inner: BoxedParser<T>,
}

impl<T> Parser<Option<T>> for Maybe<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<Option<T>> {
        let next = self.inner.execute(state);
        if next.is_failure() {
            return state.succeed(state.cursor(), None);
        }
        next.map(Some)
    }

    fn name(&self) -> &str {
        "maybe"
    }

    fn expected(&self) -> String {
        format!("optionally {}", self.inner.expected())
    }

    fn accepts(&self) -> EnumSet<Modality> {
        self.inner.accepts()
    }
}

/// `Some` result of `parser`, or `None` at the original position if it fails.
pub fn maybe<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(Maybe { inner: parser })
}

impl<T: 'static> BoxedParser<Option<T>> {
    /// Replace an absent result with `default`.
    pub fn value_if_absent(self, default: T) -> BoxedParser<T>
    where
        T: Clone,
    {
        self.map(move |value| value.unwrap_or_else(|| default.clone()))
    }

    /// Leave an absent result out of enclosing collections.
    pub fn ignore_if_absent(self) -> BoxedParser<Option<T>> {
        self.map_state(|state| {
            if matches!(state.result(), Some(None)) {
                state.suppress()
            } else {
                state
            }
        })
    }
}

struct LookAhead<T> {
    inner: BoxedParser<T>,
}

impl<T> Parser<T> for LookAhead<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<T> {
        let next = self.inner.execute(state);
        match next.failure() {
            Some(error) => state.fail(error.clone().at(state.cursor())),
            None => next.with_cursor(state.cursor()),
        }
    }

    fn name(&self) -> &str {
        "look_ahead"
    }

    fn expected(&self) -> String {
        self.inner.expected()
    }

    fn accepts(&self) -> EnumSet<Modality> {
        self.inner.accepts()
    }
}

/// Run `parser` but leave the cursor where it was.
pub fn look_ahead<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<T> {
    BoxedParser::new(LookAhead { inner: parser })
}

struct AnythingExcept<E, U> {
    except: BoxedParser<U>,
    element: PhantomData<fn() -> E>,
}

impl<E: Item, U> Parser<E> for AnythingExcept<E, U> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<E> {
        let Some(items) = E::slice(state.source()) else {
            return state.bad_input(self.name(), self.accepts());
        };

        if !self.except.execute(state).is_failure() {
            return state.no_match(self.name(), self.expected());
        }

        match items.get(state.cursor()) {
            Some(item) => state.succeed(state.cursor() + 1, item.clone()),
            None => state.end_of_input(self.name(), self.expected()),
        }
    }

    fn name(&self) -> &str {
        "anything_except"
    }

    fn expected(&self) -> String {
        format!("anything except {}", self.except.expected())
    }

    fn accepts(&self) -> EnumSet<Modality> {
        E::MODALITY.into()
    }
}

/// One element, provided `except` does not match here.
pub fn anything_except<E: Item, U: 'static>(except: BoxedParser<U>) -> BoxedParser<E> {
    BoxedParser::new(AnythingExcept {
        except,
        element: PhantomData,
    })
}

struct EverythingUntil<E, U> {
    until: BoxedParser<U>,
    element: PhantomData<fn() -> E>,
}

impl<E: Item, U> Parser<Vec<E>> for EverythingUntil<E, U> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<Vec<E>> {
        let Some(items) = E::slice(state.source()) else {
            return state.bad_input(self.name(), self.accepts());
        };

        let mut cursor = state.cursor();
        loop {
            if !self.until.execute(&state.at(cursor)).is_failure() {
                let collected = items.get(state.cursor()..cursor).unwrap_or(&[]).to_vec();
                return state.succeed(cursor, collected);
            }
            if cursor >= items.len() {
                return state.fail(ParseError::EndOfInput {
                    parser: self.name().to_string(),
                    position: cursor,
                    expected: self.expected(),
                    available: 0,
                });
            }
            cursor += 1;
        }
    }

    fn name(&self) -> &str {
        "everything_until"
    }

    fn expected(&self) -> String {
        format!("anything followed by {}", self.until.expected())
    }

    fn accepts(&self) -> EnumSet<Modality> {
        E::MODALITY.into()
    }
}

/// Every element up to where `until` matches. The match itself is not
/// consumed. Fails with `EndOfInput` if `until` never matches.
pub fn everything_until<E: Item, U: 'static>(until: BoxedParser<U>) -> BoxedParser<Vec<E>> {
    BoxedParser::new(EverythingUntil {
        until,
        element: PhantomData,
    })
}

/// [`everything_until`] over characters, collected into a `String`.
pub fn string_until<U: 'static>(until: BoxedParser<U>) -> BoxedParser<String> {
    everything_until::<char, U>(until)
        .map(|chars| chars.into_iter().collect())
        .named("string_until")
}

// === Recursion ===

struct Recursive<T> {
    parser: OnceCell<BoxedParser<T>>,
    producer: Box<dyn Fn() -> BoxedParser<T>>,
}

impl<T> Parser<T> for Recursive<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<T> {
        let parser = self.parser.get_or_init(|| {
            log::trace!("building recursive parser");
            (self.producer)()
        });
        parser.execute(state)
    }

    fn name(&self) -> &str {
        "recursive"
    }

    // Must not build or consult the inner parser: descriptors of a cyclic
    // grammar would never terminate.
    fn expected(&self) -> String {
        "recursive value".to_string()
    }
}

/// Defer building a parser until it first runs.
///
/// `producer` is called at most once. This is how a grammar refers to itself:
///
/// ```
/// use plait::parser::{BoxedParser, character, choice, recursive, sequence, succeed_with};
///
/// fn nested() -> BoxedParser<usize> {
///     recursive(|| {
///         let open = character('(').map(|_| 0);
///         let close = character(')').map(|_| 0);
///         let inner = sequence(vec![open, nested(), close]).map(|parts| parts[1] + 1);
///         choice(vec![inner, succeed_with(0)])
///     })
/// }
///
/// assert_eq!(nested().get_result("((()))").unwrap(), 3);
/// ```
pub fn recursive<T: 'static, F>(producer: F) -> BoxedParser<T>
where
    F: Fn() -> BoxedParser<T> + 'static,
{
    BoxedParser::new(Recursive {
        parser: OnceCell::new(),
        producer: Box::new(producer),
    })
}

type Slot<T> = OnceCell<BoxedParser<T>>;

/// The handle `fix` passes to its definition. Holds the parser weakly so the
/// definition does not keep itself alive.
struct Deferred<T> {
    slot: Weak<Slot<T>>,
}

impl<T> Parser<T> for Deferred<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<T> {
        let slot = self.slot.upgrade();
        match slot.as_deref().and_then(OnceCell::get) {
            Some(parser) => parser.execute(state),
            None => state.fail(ParseError::UserRejected {
                parser: self.name().to_string(),
                position: state.cursor(),
                message: "recursive parser used outside of its definition".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "recursive"
    }

    fn expected(&self) -> String {
        "recursive value".to_string()
    }
}

struct Fixed<T> {
    slot: Rc<Slot<T>>,
}

impl<T> Parser<T> for Fixed<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<T> {
        match self.slot.get() {
            Some(parser) => parser.execute(state),
            None => state.no_match(self.name(), self.expected()),
        }
    }

    fn name(&self) -> &str {
        self.slot.get().map_or("recursive", BoxedParser::name)
    }

    fn expected(&self) -> String {
        self.slot
            .get()
            .map_or_else(|| "recursive value".to_string(), BoxedParser::expected)
    }
}

/// Define a parser in terms of itself.
///
/// `define` receives a handle to the parser being defined and returns its
/// definition. Unlike [`recursive`], all recursive uses share one instance.
pub fn fix<T: 'static, F>(define: F) -> BoxedParser<T>
where
    F: FnOnce(BoxedParser<T>) -> BoxedParser<T>,
{
    let slot = Rc::new(Slot::new());
    let handle = BoxedParser::new(Deferred {
        slot: Rc::downgrade(&slot),
    });
    let definition = define(handle);
    if slot.set(definition).is_err() {
        log::trace!("recursive slot was already filled");
    }
    BoxedParser::new(Fixed { slot })
}

// === Collections ===

struct Pick<T> {
    inner: BoxedParser<Vec<T>>,
    name: &'static str,
    description: String,
    select: Box<dyn Fn(&[T]) -> Option<T>>,
}

impl<T> Parser<T> for Pick<T> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<T> {
        let next = self.inner.execute(state);
        if let Some(failed) = next.propagate() {
            return failed;
        }

        match next.result().and_then(|values| (self.select)(values.as_slice())) {
            Some(value) => next.succeed(next.cursor(), value),
            None => state.no_match(self.name, self.description.clone()),
        }
    }

    fn name(&self) -> &str {
        self.name
    }

    fn expected(&self) -> String {
        self.description.clone()
    }

    fn accepts(&self) -> EnumSet<Modality> {
        self.inner.accepts()
    }
}

impl<T: Clone + 'static> BoxedParser<Vec<T>> {
    /// The element at `index` of the collected results.
    pub fn nth(self, index: usize) -> BoxedParser<T> {
        BoxedParser::new(Pick {
            inner: self,
            name: "nth",
            description: format!("a value at index {index}"),
            select: Box::new(move |values: &[T]| values.get(index).cloned()),
        })
    }

    pub fn first(self) -> BoxedParser<T> {
        self.nth(0)
    }

    pub fn last(self) -> BoxedParser<T> {
        BoxedParser::new(Pick {
            inner: self,
            name: "last",
            description: "at least one value".to_string(),
            select: Box::new(|values: &[T]| values.last().cloned()),
        })
    }
}

impl<T: Display + 'static> BoxedParser<Vec<T>> {
    /// Render every result and concatenate them with `separator` in between.
    pub fn join(self, separator: impl Into<String>) -> BoxedParser<String> {
        let separator = separator.into();
        self.map(move |values| {
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(&separator)
        })
    }
}
