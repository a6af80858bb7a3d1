//! # Plait - Parser Combinators over Characters, Bytes and Tokens
//!
//! Plait builds parsers out of small pieces. Leaf parsers match literal text,
//! character classes, regular expressions, byte strings, fixed-width binary
//! integers or pre-lexed tokens; combinators glue them into grammars. The same
//! combinators work over all three input modalities.
//!
//! ## Architecture Overview
//!
//! 1. **Input** (`input`) - The three backing stores and the [`input::Source`] sum a run reads from
//! 2. **State** (`parser::ParseState`) - An immutable cursor snapshot carrying a result or a failure
//! 3. **Primitives** (`parser`) - Leaf matchers: `string`, `digit`, `regex`, `bytes`, `u16_be`, `tokens`, ...
//! 4. **Combinators** (`parser`) - `sequence`, `choice`, `many`, `separated_by`, `maybe`, `look_ahead`, ...
//! 5. **Rules** (`parser::coroutine`) - Grammar rules written as ordinary step-by-step functions
//!
//! ## Parse Flow
//!
//! ```text
//! Input (&str / &[u8] / Vec<Token>)
//!     ↓
//! [Source] → shared, never mutated
//!     ↓
//! [Parser] → ParseState { cursor, result | failure }
//!     ↓
//! get_result() → Result<T, ParseError>
//! ```
//!
//! ## Key Design Decisions
//!
//! ### Immutable States
//! Every parser derives a fresh [`parser::ParseState`] from the one it was given.
//! Backtracking is just holding on to an older state: ordered choice, `maybe`
//! and the repetition family retry from the state they started with.
//!
//! ### Failures Are Values
//! A failed state keeps its [`error::ParseError`] and every later parser passes
//! it along untouched. Only combinators that recover by contract (choice,
//! maybe, repetition) look at a failure.
//!
//! ### Operators
//! Parsers compose with operators as well as functions:
//! - `a + b` - sequence, result `(A, B)`
//! - `a - b` - sequence, keep `A`
//! - `a * b` - sequence, keep `B`
//! - `a | b` - ordered choice
//! - `p >> f` - map the result
//!
//! ## Example
//!
//! ```
//! use plait::parser::{character, digits, separated_by};
//!
//! let numbers = separated_by(character(','), digits() >> |d: String| d.parse::<u32>().unwrap_or(0));
//! assert_eq!(numbers.get_result("1,22,333").unwrap(), vec![1, 22, 333]);
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod parser;

pub use config::Settings;
pub use error::{Error, FailureKind, ParseError};
pub use input::{Modality, Source, Token};
pub use parser::{BoxedParser, ParseState, Parser};
