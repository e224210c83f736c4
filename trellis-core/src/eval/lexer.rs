//! Token Stream
//!
//! A small hand-rolled lexer for the attribute micro-language: JSON5-style
//! literals plus identifiers and call parentheses. The lexer keeps byte
//! offsets so parse errors point into the attribute string.

use crate::error::{EngineError, Result};

/// One lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    /// Quoted string, quotes removed, escapes resolved.
    Str(String),
    Num(f64),
    /// Bare word: object key, `true`/`false`/`null`, or a call name.
    Ident(String),
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Lex `src` into `(byte_offset, token)` pairs.
pub fn lex(src: &str) -> Result<Vec<(usize, Token)>> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(at, c)) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '{' => {
                chars.next();
                tokens.push((at, Token::LBrace));
            }
            '}' => {
                chars.next();
                tokens.push((at, Token::RBrace));
            }
            '[' => {
                chars.next();
                tokens.push((at, Token::LBracket));
            }
            ']' => {
                chars.next();
                tokens.push((at, Token::RBracket));
            }
            '(' => {
                chars.next();
                tokens.push((at, Token::LParen));
            }
            ')' => {
                chars.next();
                tokens.push((at, Token::RParen));
            }
            ':' => {
                chars.next();
                tokens.push((at, Token::Colon));
            }
            ',' => {
                chars.next();
                tokens.push((at, Token::Comma));
            }
            '\'' | '"' => {
                chars.next();
                let quote = c;
                let mut out = String::new();
                let mut closed = false;
                while let Some((_, ch)) = chars.next() {
                    if ch == quote {
                        closed = true;
                        break;
                    }
                    if ch == '\\' {
                        match chars.next() {
                            Some((_, 'n')) => out.push('\n'),
                            Some((_, 't')) => out.push('\t'),
                            Some((_, escaped)) => out.push(escaped),
                            None => break,
                        }
                    } else {
                        out.push(ch);
                    }
                }
                if !closed {
                    return Err(EngineError::Parse {
                        at,
                        message: "unterminated string".to_string(),
                    });
                }
                tokens.push((at, Token::Str(out)));
            }
            '-' | '+' | '0'..='9' => {
                let mut raw = String::new();
                if c == '-' || c == '+' {
                    raw.push(c);
                    chars.next();
                }
                let mut seen_digit = false;
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' || d == 'e' || d == 'E' {
                        if d.is_ascii_digit() {
                            seen_digit = true;
                        }
                        raw.push(d);
                        chars.next();
                        // Exponent sign directly after e/E.
                        if d == 'e' || d == 'E' {
                            if let Some(&(_, sign @ ('-' | '+'))) = chars.peek() {
                                raw.push(sign);
                                chars.next();
                            }
                        }
                    } else {
                        break;
                    }
                }
                let parsed = if seen_digit { raw.parse::<f64>().ok() } else { None };
                match parsed {
                    Some(n) => tokens.push((at, Token::Num(n))),
                    None => {
                        return Err(EngineError::Parse {
                            at,
                            message: format!("invalid number '{raw}'"),
                        })
                    }
                }
            }
            c if is_ident_start(c) => {
                let mut word = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if is_ident_continue(d) {
                        word.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((at, Token::Ident(word)));
            }
            other => {
                return Err(EngineError::Parse {
                    at,
                    message: format!("unexpected character '{other}'"),
                });
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_delimiters_and_scalars() {
        let tokens = lex("{count: 5, label: 'hi'}").unwrap();
        let kinds: Vec<Token> = tokens.into_iter().map(|(_, t)| t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::LBrace,
                Token::Ident("count".into()),
                Token::Colon,
                Token::Num(5.0),
                Token::Comma,
                Token::Ident("label".into()),
                Token::Colon,
                Token::Str("hi".into()),
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn lexes_negative_and_exponent_numbers() {
        let tokens = lex("[-2.5, 1e3, +4]").unwrap();
        let nums: Vec<f64> = tokens
            .into_iter()
            .filter_map(|(_, t)| match t {
                Token::Num(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(nums, vec![-2.5, 1000.0, 4.0]);
    }

    #[test]
    fn string_escapes_resolve() {
        let tokens = lex(r#""a\nb\"c""#).unwrap();
        assert_eq!(tokens[0].1, Token::Str("a\nb\"c".into()));
    }

    #[test]
    fn unterminated_string_is_a_parse_error() {
        assert!(lex("'oops").is_err());
    }

    #[test]
    fn stray_character_reports_offset() {
        let err = lex("  ;").unwrap_err();
        match err {
            EngineError::Parse { at, .. } => assert_eq!(at, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
