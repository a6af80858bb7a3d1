#![allow(dead_code)]

use lachs::Span;
use plait::Token;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[lachs::token]
pub enum Lexeme {
    #[terminal("(")]
    LParen,
    #[terminal(")")]
    RParen,
    #[terminal(",")]
    Comma,
    #[terminal("+")]
    Plus,
    #[terminal("*")]
    Star,
    #[literal("[0-9]+")]
    Integer,
    #[literal("[a-zA-Z_]+")]
    Ident,
}

impl Lexeme {
    pub fn pos(&self) -> Span {
        match self {
            Lexeme::LParen(inner) => inner.position.clone(),
            Lexeme::RParen(inner) => inner.position.clone(),
            Lexeme::Comma(inner) => inner.position.clone(),
            Lexeme::Plus(inner) => inner.position.clone(),
            Lexeme::Star(inner) => inner.position.clone(),
            Lexeme::Integer(inner) => inner.position.clone(),
            Lexeme::Ident(inner) => inner.position.clone(),
        }
    }

    pub fn to_token(&self) -> Token {
        match self {
            Lexeme::LParen(_) => Token::dataless("lparen"),
            Lexeme::RParen(_) => Token::dataless("rparen"),
            Lexeme::Comma(_) => Token::dataless("comma"),
            Lexeme::Plus(_) => Token::dataless("plus"),
            Lexeme::Star(_) => Token::dataless("star"),
            Lexeme::Integer(inner) => Token::new("integer", inner.value.clone()),
            Lexeme::Ident(inner) => Token::new("ident", inner.value.clone()),
        }
    }
}

/// Lex `source` into plain tokens.
pub fn lex(source: &str) -> Vec<Token> {
    Lexeme::lex(source)
        .expect("lexing failed")
        .iter()
        .map(Lexeme::to_token)
        .collect()
}
