//! # Input Sources
//!
//! A parse always reads from exactly one of three backing stores:
//!
//! - [`CharSource`] - text, addressed by `char` index
//! - [`ByteSource`] - raw bytes
//! - [`TokenSource`] - tokens produced by an external lexer
//!
//! Each store implements [`InputSource`]. The [`Source`] sum is what a
//! [`ParseState`](crate::parser::ParseState) actually holds, so parsers can
//! dispatch on the concrete modality without downcasting. Sources are built once
//! per run and never mutated afterwards.

mod token;

pub use token::Token;

use std::fmt;

use enumset::{EnumSet, EnumSetType};

use crate::config::Settings;

/// The shape of the input a parser can read.
#[derive(Debug, EnumSetType)]
pub enum Modality {
    Characters,
    Bytes,
    Tokens,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Modality::Characters => "character input",
            Modality::Bytes => "byte input",
            Modality::Tokens => "token input",
        })
    }
}

/// Render a modality set as `"character input or byte input"`.
pub fn describe_modalities(set: EnumSet<Modality>) -> String {
    set.iter()
        .map(|modality| modality.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Read access shared by all three backing stores.
pub trait InputSource {
    type Element;

    const MODALITY: Modality;

    /// All elements of the input, in order.
    fn elements(&self) -> &[Self::Element];

    /// Human readable rendering of at most `width` elements starting at `index`.
    fn snippet(&self, index: usize, width: usize) -> String;

    fn len(&self) -> usize {
        self.elements().len()
    }

    fn is_empty(&self) -> bool {
        self.elements().is_empty()
    }

    fn get(&self, index: usize) -> Option<&Self::Element> {
        self.elements().get(index)
    }

    /// Everything from `index` to the end. Empty when `index` is past the end.
    fn suffix(&self, index: usize) -> &[Self::Element] {
        self.elements().get(index..).unwrap_or(&[])
    }

    fn is_end(&self, index: usize) -> bool {
        index >= self.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSource {
    text: String,
    chars: Vec<char>,
    // byte offset of every char, plus one trailing entry for `text.len()`
    offsets: Vec<usize>,
}

impl CharSource {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let (offsets, chars): (Vec<_>, Vec<_>) = text.char_indices().unzip();
        let mut offsets = offsets;
        offsets.push(text.len());
        Self {
            text,
            chars,
            offsets,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The remaining text starting at char `index`.
    pub fn str_from(&self, index: usize) -> &str {
        match self.offsets.get(index) {
            Some(&offset) => &self.text[offset..],
            None => "",
        }
    }
}

impl InputSource for CharSource {
    type Element = char;

    const MODALITY: Modality = Modality::Characters;

    fn elements(&self) -> &[char] {
        &self.chars
    }

    fn snippet(&self, index: usize, width: usize) -> String {
        if self.is_end(index) {
            return "end of input".to_string();
        }
        let shown = self.suffix(index).iter().take(width).collect::<String>();
        let ellipsis = if width < self.len() - index { "..." } else { "" };
        format!("{shown:?}{ellipsis}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteSource {
    bytes: Vec<u8>,
}

impl ByteSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl InputSource for ByteSource {
    type Element = u8;

    const MODALITY: Modality = Modality::Bytes;

    fn elements(&self) -> &[u8] {
        &self.bytes
    }

    fn snippet(&self, index: usize, width: usize) -> String {
        let shown = self.suffix(index).iter().take(width).map(|b| format!("0x{b:02x}"));
        render_elements("bytes", shown, index.saturating_add(width) >= self.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSource {
    tokens: Vec<Token>,
}

impl TokenSource {
    pub fn new(tokens: impl Into<Vec<Token>>) -> Self {
        Self {
            tokens: tokens.into(),
        }
    }
}

impl InputSource for TokenSource {
    type Element = Token;

    const MODALITY: Modality = Modality::Tokens;

    fn elements(&self) -> &[Token] {
        &self.tokens
    }

    fn snippet(&self, index: usize, width: usize) -> String {
        let shown = self.suffix(index).iter().take(width).map(Token::to_string);
        render_elements("tokens", shown, index.saturating_add(width) >= self.len())
    }
}

fn render_elements(prefix: &str, shown: impl Iterator<Item = String>, at_end: bool) -> String {
    let mut parts = shown.collect::<Vec<_>>();
    parts.push(if at_end { "*END*" } else { "..." }.to_string());
    format!("{prefix} {}", parts.join(", "))
}

/// The input of one parse run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Characters(CharSource),
    Bytes(ByteSource),
    Tokens(TokenSource),
}

impl Source {
    pub fn modality(&self) -> Modality {
        match self {
            Source::Characters(_) => Modality::Characters,
            Source::Bytes(_) => Modality::Bytes,
            Source::Tokens(_) => Modality::Tokens,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Source::Characters(source) => source.len(),
            Source::Bytes(source) => source.len(),
            Source::Tokens(source) => source.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_end(&self, index: usize) -> bool {
        index >= self.len()
    }

    /// Diagnostic rendering of the input at `index`, sized by `settings`.
    pub fn snippet(&self, index: usize, settings: &Settings) -> String {
        match self {
            Source::Characters(source) => source.snippet(index, settings.char_snippet_width),
            Source::Bytes(source) => source.snippet(index, settings.element_snippet_width),
            Source::Tokens(source) => source.snippet(index, settings.element_snippet_width),
        }
    }

    pub fn as_chars(&self) -> Option<&CharSource> {
        match self {
            Source::Characters(source) => Some(source),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&ByteSource> {
        match self {
            Source::Bytes(source) => Some(source),
            _ => None,
        }
    }

    pub fn as_tokens(&self) -> Option<&TokenSource> {
        match self {
            Source::Tokens(source) => Some(source),
            _ => None,
        }
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Characters(CharSource::new(text))
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::Characters(CharSource::new(text))
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Self {
        Source::Bytes(ByteSource::new(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for Source {
    fn from(bytes: &[u8; N]) -> Self {
        Source::Bytes(ByteSource::new(bytes.as_slice()))
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Bytes(ByteSource::new(bytes))
    }
}

impl From<&[Token]> for Source {
    fn from(tokens: &[Token]) -> Self {
        Source::Tokens(TokenSource::new(tokens))
    }
}

impl From<Vec<Token>> for Source {
    fn from(tokens: Vec<Token>) -> Self {
        Source::Tokens(TokenSource::new(tokens))
    }
}

/// An element type one of the sources is made of.
///
/// Lets element-generic parsers such as [`any`](crate::parser::any) or
/// [`everything_until`](crate::parser::everything_until) pick their modality
/// from the requested element type.
pub trait Item: Clone + fmt::Debug + 'static {
    const MODALITY: Modality;

    fn slice(source: &Source) -> Option<&[Self]>;
}

impl Item for char {
    const MODALITY: Modality = Modality::Characters;

    fn slice(source: &Source) -> Option<&[Self]> {
        source.as_chars().map(InputSource::elements)
    }
}

impl Item for u8 {
    const MODALITY: Modality = Modality::Bytes;

    fn slice(source: &Source) -> Option<&[Self]> {
        source.as_bytes().map(InputSource::elements)
    }
}

impl Item for Token {
    const MODALITY: Modality = Modality::Tokens;

    fn slice(source: &Source) -> Option<&[Self]> {
        source.as_tokens().map(InputSource::elements)
    }
}
