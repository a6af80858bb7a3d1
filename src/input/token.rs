use std::fmt;

/// A pre-lexed unit of input.
///
/// Tokens are produced by some external lexer. Matching primitives only look
/// at the `id`; the optional `data` payload rides along untouched so grammars
/// can read it back from the matched tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub id: String,
    pub data: Option<String>,
}

impl Token {
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: Some(data.into()),
        }
    }

    /// A token that carries no payload.
    pub fn dataless(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: None,
        }
    }

    /// Id-only comparison, the notion of equality used by every matcher.
    pub fn same_id(&self, other: &Token) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => write!(f, "{}({})", self.id, data),
            None => f.write_str(&self.id),
        }
    }
}
