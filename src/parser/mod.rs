mod binary;
mod boxed;
mod combinators;
mod coroutine;
mod primitives;
mod state;

pub use binary::*;
pub use boxed::BoxedParser;
pub use combinators::*;
pub use coroutine::{Abort, Coroutine, coroutine};
pub use primitives::*;
pub use state::{ParseState, Parser};
