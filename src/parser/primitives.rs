use std::marker::PhantomData;
use std::rc::Rc;

use enumset::EnumSet;
use regex::Regex;

use crate::error::{Error, ParseError};
use crate::input::{InputSource, Item, Modality, Source, Token};

use super::boxed::BoxedParser;
use super::combinators::{at_least_one, maybe};
use super::state::{ParseState, Parser};

// === Literals ===

struct Literal {
    text: String,
    chars: Vec<char>,
}

impl Parser<String> for Literal {
    fn parse(&self, state: &ParseState<()>) -> ParseState<String> {
        let cursor = state.cursor();
        let matched = match state.source() {
            Source::Characters(source) => starts_with(source.suffix(cursor), self.chars.as_slice()),
            Source::Bytes(source) => starts_with(source.suffix(cursor), self.text.as_bytes()),
            Source::Tokens(_) => return state.bad_input(self.name(), self.accepts()),
        };

        match matched {
            Prefix::Matched(width) => state.succeed(state.cursor() + width, self.text.clone()),
            Prefix::TooShort => state.end_of_input(self.name(), self.expected()),
            Prefix::Mismatch => state.no_match(self.name(), self.expected()),
        }
    }

    fn name(&self) -> &str {
        "string"
    }

    fn expected(&self) -> String {
        format!("string {:?}", self.text)
    }

    fn accepts(&self) -> EnumSet<Modality> {
        Modality::Characters | Modality::Bytes
    }
}

enum Prefix {
    Matched(usize),
    TooShort,
    Mismatch,
}

// Length first, then element by element.
fn starts_with<E: PartialEq>(input: &[E], wanted: &[E]) -> Prefix {
    if input.len() < wanted.len() {
        Prefix::TooShort
    } else if input.iter().zip(wanted).all(|(a, b)| a == b) {
        Prefix::Matched(wanted.len())
    } else {
        Prefix::Mismatch
    }
}

/// Match `text` literally. Works on character input and, via its UTF-8
/// encoding, on byte input.
pub fn string(text: impl Into<String>) -> BoxedParser<String> {
    let text = text.into();
    let chars = text.chars().collect();
    BoxedParser::new(Literal { text, chars })
}

struct ByteLiteral {
    bytes: Vec<u8>,
}

impl Parser<Vec<u8>> for ByteLiteral {
    fn parse(&self, state: &ParseState<()>) -> ParseState<Vec<u8>> {
        let Some(source) = state.source().as_bytes() else {
            return state.bad_input(self.name(), self.accepts());
        };

        match starts_with(source.suffix(state.cursor()), self.bytes.as_slice()) {
            Prefix::Matched(width) => state.succeed(state.cursor() + width, self.bytes.clone()),
            Prefix::TooShort => state.end_of_input(self.name(), self.expected()),
            Prefix::Mismatch => state.no_match(self.name(), self.expected()),
        }
    }

    fn name(&self) -> &str {
        "bytes"
    }

    fn expected(&self) -> String {
        let rendered = self.bytes.iter().map(|b| format!("0x{b:02x}")).collect::<Vec<_>>();
        format!("bytes [{}]", rendered.join(", "))
    }

    fn accepts(&self) -> EnumSet<Modality> {
        Modality::Bytes.into()
    }
}

/// Match a literal byte sequence.
pub fn bytes(bytes: impl Into<Vec<u8>>) -> BoxedParser<Vec<u8>> {
    BoxedParser::new(ByteLiteral {
        bytes: bytes.into(),
    })
}

pub fn byte(value: u8) -> BoxedParser<u8> {
    bytes(vec![value]).map(move |_| value)
}

struct TokenLiteral {
    tokens: Vec<Token>,
}

impl Parser<Vec<Token>> for TokenLiteral {
    fn parse(&self, state: &ParseState<()>) -> ParseState<Vec<Token>> {
        let Some(source) = state.source().as_tokens() else {
            return state.bad_input(self.name(), self.accepts());
        };

        let upcoming = source.suffix(state.cursor());
        if upcoming.len() < self.tokens.len() {
            return state.end_of_input(self.name(), self.expected());
        }

        let matched = upcoming
            .iter()
            .zip(&self.tokens)
            .all(|(found, wanted)| found.same_id(wanted));
        if !matched {
            return state.no_match(self.name(), self.expected());
        }

        let width = self.tokens.len();
        state.succeed(state.cursor() + width, upcoming[..width].to_vec())
    }

    fn name(&self) -> &str {
        "tokens"
    }

    fn expected(&self) -> String {
        let ids = self.tokens.iter().map(|token| token.id.as_str()).collect::<Vec<_>>();
        format!("tokens [{}] (ignoring data)", ids.join(", "))
    }

    fn accepts(&self) -> EnumSet<Modality> {
        Modality::Tokens.into()
    }
}

/// Match a run of tokens by id. The result holds the tokens found in the
/// input, payloads included.
pub fn tokens(tokens: impl Into<Vec<Token>>) -> BoxedParser<Vec<Token>> {
    BoxedParser::new(TokenLiteral {
        tokens: tokens.into(),
    })
}

// === Single elements ===

struct CharMatch {
    name: String,
    description: String,
    predicate: Rc<dyn Fn(char) -> bool>,
}

impl Parser<char> for CharMatch {
    fn parse(&self, state: &ParseState<()>) -> ParseState<char> {
        let Some(source) = state.source().as_chars() else {
            return state.bad_input(self.name(), self.accepts());
        };

        match source.get(state.cursor()) {
            Some(&c) if (self.predicate)(c) => state.succeed(state.cursor() + 1, c),
            Some(_) => state.no_match(self.name(), self.expected()),
            None => state.end_of_input(self.name(), self.expected()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn expected(&self) -> String {
        self.description.clone()
    }

    fn accepts(&self) -> EnumSet<Modality> {
        Modality::Characters.into()
    }
}

/// One character satisfying `predicate`.
pub fn char_where<F>(description: impl Into<String>, predicate: F) -> BoxedParser<char>
where
    F: Fn(char) -> bool + 'static,
{
    BoxedParser::new(CharMatch {
        name: "char_where".to_string(),
        description: description.into(),
        predicate: Rc::new(predicate),
    })
}

pub fn character(wanted: char) -> BoxedParser<char> {
    BoxedParser::new(CharMatch {
        name: "character".to_string(),
        description: format!("character {wanted:?}"),
        predicate: Rc::new(move |c| c == wanted),
    })
}

/// Any one of the characters of `choices`.
pub fn any_of(choices: &str) -> BoxedParser<char> {
    let set = choices.chars().collect::<Vec<_>>();
    BoxedParser::new(CharMatch {
        name: "any_of".to_string(),
        description: format!("one of {choices:?}"),
        predicate: Rc::new(move |c| set.contains(&c)),
    })
}

struct TokenMatch {
    description: String,
    predicate: Rc<dyn Fn(&Token) -> bool>,
}

impl Parser<Token> for TokenMatch {
    fn parse(&self, state: &ParseState<()>) -> ParseState<Token> {
        let Some(source) = state.source().as_tokens() else {
            return state.bad_input(self.name(), self.accepts());
        };

        match source.get(state.cursor()) {
            Some(token) if (self.predicate)(token) => {
                state.succeed(state.cursor() + 1, token.clone())
            }
            Some(_) => state.no_match(self.name(), self.expected()),
            None => state.end_of_input(self.name(), self.expected()),
        }
    }

    fn name(&self) -> &str {
        "token"
    }

    fn expected(&self) -> String {
        self.description.clone()
    }

    fn accepts(&self) -> EnumSet<Modality> {
        Modality::Tokens.into()
    }
}

/// One token with the same id as `wanted`.
pub fn token(wanted: Token) -> BoxedParser<Token> {
    BoxedParser::new(TokenMatch {
        description: format!("token {wanted} (ignoring data)"),
        predicate: Rc::new(move |token: &Token| token.same_id(&wanted)),
    })
}

pub fn token_id(id: impl Into<String>) -> BoxedParser<Token> {
    token(Token::dataless(id))
}

struct AnyElement<E> {
    element: PhantomData<fn() -> E>,
}

impl<E: Item> Parser<E> for AnyElement<E> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<E> {
        let Some(items) = E::slice(state.source()) else {
            return state.bad_input(self.name(), self.accepts());
        };

        match items.get(state.cursor()) {
            Some(item) => state.succeed(state.cursor() + 1, item.clone()),
            None => state.end_of_input(self.name(), self.expected()),
        }
    }

    fn name(&self) -> &str {
        "any"
    }

    fn expected(&self) -> String {
        format!("any element of {}", E::MODALITY)
    }

    fn accepts(&self) -> EnumSet<Modality> {
        E::MODALITY.into()
    }
}

/// Exactly one element of whatever kind `E` is.
pub fn any<E: Item>() -> BoxedParser<E> {
    BoxedParser::new(AnyElement {
        element: PhantomData,
    })
}

pub fn any_char() -> BoxedParser<char> {
    any::<char>()
}

// === Zero-width ===

struct EndOfInput;

impl Parser<()> for EndOfInput {
    fn parse(&self, state: &ParseState<()>) -> ParseState<()> {
        if state.is_at_end() {
            state.succeed(state.cursor(), ())
        } else {
            state.no_match(self.name(), self.expected())
        }
    }

    fn name(&self) -> &str {
        "end_of_input"
    }

    fn expected(&self) -> String {
        "end of input".to_string()
    }
}

pub fn end_of_input() -> BoxedParser<()> {
    BoxedParser::new(EndOfInput)
}

struct Peek<E> {
    count: usize,
    element: PhantomData<fn() -> E>,
}

impl<E: Item> Parser<Vec<E>> for Peek<E> {
    fn parse(&self, state: &ParseState<()>) -> ParseState<Vec<E>> {
        let Some(items) = E::slice(state.source()) else {
            return state.bad_input(self.name(), self.accepts());
        };

        let ahead = items.get(state.cursor()..).unwrap_or(&[]);
        let seen = ahead.iter().take(self.count).cloned().collect();
        state.succeed(state.cursor(), seen)
    }

    fn name(&self) -> &str {
        "peek"
    }

    fn expected(&self) -> String {
        format!("up to {} elements of {}", self.count, E::MODALITY)
    }

    fn accepts(&self) -> EnumSet<Modality> {
        E::MODALITY.into()
    }
}

/// Up to `count` upcoming elements, without consuming them. Never fails on
/// input of the right modality.
pub fn peek<E: Item>(count: usize) -> BoxedParser<Vec<E>> {
    BoxedParser::new(Peek {
        count,
        element: PhantomData,
    })
}

pub fn peek_string(count: usize) -> BoxedParser<String> {
    peek::<char>(count).map(|chars| chars.into_iter().collect())
}

pub fn peek_char() -> BoxedParser<Option<char>> {
    peek::<char>(1).map(|chars| chars.first().copied())
}

pub fn peek_byte() -> BoxedParser<Option<u8>> {
    peek::<u8>(1).map(|bytes| bytes.first().copied())
}

pub fn peek_token() -> BoxedParser<Option<Token>> {
    peek::<Token>(1).map(|tokens| tokens.into_iter().next())
}

// === Unconditional ===

/// Always succeeds with a clone of `value`, consuming nothing.
pub fn succeed_with<T: Clone + 'static>(value: T) -> BoxedParser<T> {
    BoxedParser::new(move |state: &ParseState<()>| state.succeed(state.cursor(), value.clone()))
        .named("succeed_with")
}

/// Always fails with a `UserRejected` failure carrying `message`.
pub fn fail<T: 'static>(message: impl Into<String>) -> BoxedParser<T> {
    let message = message.into();
    BoxedParser::new(move |state: &ParseState<()>| -> ParseState<T> {
        state.fail(ParseError::UserRejected {
            parser: "fail".to_string(),
            position: state.cursor(),
            message: message.clone(),
        })
    })
    .named("fail")
}

// === Regular expressions ===

struct Pattern {
    pattern: String,
    anchored: Regex,
    group: usize,
}

impl Parser<String> for Pattern {
    fn parse(&self, state: &ParseState<()>) -> ParseState<String> {
        let Some(source) = state.source().as_chars() else {
            return state.bad_input(self.name(), self.accepts());
        };

        let rest = source.str_from(state.cursor());
        let Some(captures) = self.anchored.captures(rest) else {
            return state.no_match(self.name(), self.expected());
        };
        let Some(whole) = captures.get(0) else {
            return state.no_match(self.name(), self.expected());
        };

        let value = captures.get(self.group).map_or("", |group| group.as_str());
        let width = whole.as_str().chars().count();
        state.succeed(state.cursor() + width, value.to_string())
    }

    fn name(&self) -> &str {
        "regex"
    }

    fn expected(&self) -> String {
        format!("string matching pattern {:?}", self.pattern)
    }

    fn accepts(&self) -> EnumSet<Modality> {
        Modality::Characters.into()
    }
}

/// Match `pattern` at the cursor and return the whole match.
///
/// The pattern is anchored at the cursor; a match further along the input
/// counts as no match.
pub fn regex(pattern: &str) -> Result<BoxedParser<String>, Error> {
    regex_group(pattern, 0)
}

/// Like [`regex`], but the result is capture group `group`. The cursor still
/// moves past the whole match.
pub fn regex_group(pattern: &str, group: usize) -> Result<BoxedParser<String>, Error> {
    let regex = Regex::new(pattern)?;
    if group >= regex.captures_len() {
        return Err(Error::MissingGroup {
            pattern: pattern.to_string(),
            group,
        });
    }
    let anchored = Regex::new(&format!("^(?:{pattern})"))?;
    Ok(BoxedParser::new(Pattern {
        pattern: pattern.to_string(),
        anchored,
        group,
    }))
}

// === Character classes ===

pub fn digit() -> BoxedParser<char> {
    char_where("a digit", |c| c.is_ascii_digit()).named("digit")
}

pub fn digits() -> BoxedParser<String> {
    collect_chars(at_least_one(digit())).named("digits")
}

pub fn letter() -> BoxedParser<char> {
    char_where("a letter", |c| c.is_ascii_alphabetic()).named("letter")
}

pub fn letters() -> BoxedParser<String> {
    collect_chars(at_least_one(letter())).named("letters")
}

pub fn whitespace() -> BoxedParser<String> {
    let blank = char_where("whitespace", char::is_whitespace);
    collect_chars(at_least_one(blank)).named("whitespace")
}

/// Whitespace if there is any, otherwise the empty string.
pub fn optional_whitespace() -> BoxedParser<String> {
    maybe(whitespace()).value_if_absent(String::new())
}

fn collect_chars(parser: BoxedParser<Vec<char>>) -> BoxedParser<String> {
    parser.map(|chars| chars.into_iter().collect())
}
