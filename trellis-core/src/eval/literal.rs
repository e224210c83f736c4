//! Literal Parser
//!
//! Recursive-descent parser over the token stream for the JSON5-flavored
//! literal subset attribute values carry: `null`, booleans, numbers,
//! single- or double-quoted strings, arrays, and objects with unquoted
//! keys. Trailing commas are tolerated.
//!
//! Also parses the call-statement form `name(arg, ...)` used by `@init`,
//! `@if` and event handlers, where every argument is itself a literal.

use crate::error::{EngineError, Result};
use crate::value::Value;

use super::lexer::{lex, Token};

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Result<Self> {
        Ok(Self {
            tokens: lex(src)?,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn at(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(at, _)| *at)
            .unwrap_or(0)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn fail<T>(&self, message: impl Into<String>) -> Result<T> {
        Err(EngineError::Parse {
            at: self.at(),
            message: message.into(),
        })
    }

    fn expect(&mut self, want: Token) -> Result<()> {
        match self.next() {
            Some(token) if token == want => Ok(()),
            Some(token) => self.fail(format!("expected {want:?}, found {token:?}")),
            None => self.fail(format!("expected {want:?}, found end of input")),
        }
    }

    fn value(&mut self) -> Result<Value> {
        match self.next() {
            Some(Token::Num(n)) => Ok(Value::Num(n)),
            Some(Token::Str(s)) => Ok(Value::Str(s)),
            Some(Token::Ident(word)) => match word.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" => Ok(Value::Null),
                other => self.fail(format!("unexpected identifier '{other}'")),
            },
            Some(Token::LBracket) => self.list(),
            Some(Token::LBrace) => self.object(),
            Some(token) => self.fail(format!("unexpected {token:?}")),
            None => self.fail("unexpected end of input"),
        }
    }

    fn list(&mut self) -> Result<Value> {
        let mut items = Vec::new();
        loop {
            if self.peek() == Some(&Token::RBracket) {
                self.next();
                return Ok(Value::list(items));
            }
            items.push(self.value()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RBracket) => return Ok(Value::list(items)),
                _ => return self.fail("expected ',' or ']'"),
            }
        }
    }

    fn object(&mut self) -> Result<Value> {
        let mut pairs: Vec<(String, Value)> = Vec::new();
        loop {
            if self.peek() == Some(&Token::RBrace) {
                self.next();
                return Ok(Value::object(pairs));
            }
            let key = match self.next() {
                Some(Token::Ident(word)) => word,
                Some(Token::Str(s)) => s,
                _ => return self.fail("expected object key"),
            };
            self.expect(Token::Colon)?;
            pairs.push((key, self.value()?));
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RBrace) => return Ok(Value::object(pairs)),
                _ => return self.fail("expected ',' or '}'"),
            }
        }
    }

    fn done(&self) -> bool {
        self.pos == self.tokens.len()
    }
}

/// Parse one complete literal.
pub fn parse_literal(src: &str) -> Result<Value> {
    let mut parser = Parser::new(src)?;
    let value = parser.value()?;
    if !parser.done() {
        return parser.fail("trailing input after literal");
    }
    Ok(value)
}

/// Parse a call statement: `name(arg, ...)` or a bare `name` (zero
/// arguments).
pub fn parse_call(src: &str) -> Result<(String, Vec<Value>)> {
    let mut parser = Parser::new(src)?;
    let name = match parser.next() {
        Some(Token::Ident(word)) => word,
        _ => return parser.fail("expected function name"),
    };
    if parser.done() {
        return Ok((name, Vec::new()));
    }
    parser.expect(Token::LParen)?;
    let mut args = Vec::new();
    loop {
        if parser.peek() == Some(&Token::RParen) {
            parser.next();
            break;
        }
        args.push(parser.value()?);
        match parser.next() {
            Some(Token::Comma) => continue,
            Some(Token::RParen) => break,
            _ => return parser.fail("expected ',' or ')'"),
        }
    }
    if !parser.done() {
        return parser.fail("trailing input after call");
    }
    Ok((name, args))
}
