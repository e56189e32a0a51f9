//! Rule tokenizer implemented with nom.
//!
//! Whitespace between tokens is skipped. Every token records the byte offset
//! where it starts so the parser can point at the offending input.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, take_while},
    character::complete::{char, digit1, none_of, satisfy},
    combinator::{map, opt, recognize, value},
    sequence::{delimited, pair},
    IResult,
};

use crate::ast::{Spanned, Token};
use crate::error::{RuleResult, RuleSyntaxError};

/// Splits a rule string into positioned tokens.
///
/// # Examples
///
/// ```rust
/// use docrule::{tokenize, Token};
///
/// let tokens = tokenize(r#"field("Name") | first"#).unwrap();
/// assert_eq!(tokens[0].token, Token::Ident("field".to_string()));
/// assert_eq!(tokens[4].token, Token::Pipe);
/// assert_eq!(tokens[4].position, 14);
/// ```
pub fn tokenize(input: &str) -> RuleResult<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let position = input.len() - rest.len();
        let (remaining, lexeme) = lexeme(rest).map_err(|_| diagnose(input, rest))?;

        let token = match lexeme {
            Lexeme::Token(token) => token,
            Lexeme::Number(digits) => match digits.parse::<i64>() {
                Ok(n) => Token::Number(n),
                Err(_) => {
                    return Err(RuleSyntaxError::at(
                        position,
                        format!("integer literal '{}' is out of range", digits),
                    ))
                }
            },
        };

        tokens.push(Spanned::new(token, position));
        rest = remaining.trim_start();
    }

    Ok(tokens)
}

enum Lexeme<'a> {
    Token(Token),
    Number(&'a str),
}

fn lexeme(input: &str) -> IResult<&str, Lexeme<'_>> {
    alt((
        map(punctuation, Lexeme::Token),
        map(identifier, |name| Lexeme::Token(Token::Ident(name.to_string()))),
        map(string_literal, |s| Lexeme::Token(Token::Str(s))),
        map(number_literal, Lexeme::Number),
    ))(input)
}

fn punctuation(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
        value(Token::Comma, char(',')),
        value(Token::Pipe, char('|')),
    ))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                none_of("\\\""),
                '\\',
                alt((
                    value("\\", char('\\')),
                    value("\"", char('"')),
                    value("\n", char('n')),
                    value("\t", char('t')),
                    value("\r", char('r')),
                )),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

fn number_literal(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), digit1))(input)
}

/// Builds a readable error for input no token rule accepts.
fn diagnose(input: &str, rest: &str) -> RuleSyntaxError {
    let position = input.len() - rest.len();
    match rest.chars().next() {
        Some('"') => string_error(position, rest),
        Some('-') => RuleSyntaxError::at(position, "expected digits after '-'"),
        Some(c) => RuleSyntaxError::at(position, format!("unexpected character '{}'", c)),
        None => RuleSyntaxError::at(position, "unexpected end of rule"),
    }
}

fn string_error(start: usize, rest: &str) -> RuleSyntaxError {
    let mut chars = rest.char_indices().skip(1);
    while let Some((offset, c)) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some((_, '"' | '\\' | 'n' | 't' | 'r')) => {}
                Some((_, other)) => {
                    return RuleSyntaxError::at(
                        start + offset,
                        format!("invalid escape sequence '\\{}'", other),
                    )
                }
                None => break,
            }
        }
    }
    RuleSyntaxError::at(start, "unterminated string literal")
}
