//! Recursive-descent parser over the token stream.
//!
//! Grammar:
//!
//! ```text
//! rule     := pipeline
//! pipeline := function ("|" function)*
//! value    := pipeline | STRING | NUMBER
//! function := IDENT ["(" [value ("," value)*] ")"]
//! ```

use crate::ast::{Node, Spanned, Token};
use crate::error::{RuleResult, RuleSyntaxError};
use crate::lexer::tokenize;

/// Maximum depth of nested argument lists.
pub const MAX_NESTING: usize = 64;

/// Parse a rule string into a syntax tree.
///
/// A rule with a single stage yields a [`Node::FunctionCall`]; a rule with
/// several `|`-separated stages yields a [`Node::Pipeline`].
///
/// # Examples
///
/// ```rust
/// use docrule::{parse, Node};
///
/// let rule = parse(r#"field("Relation") | join("; ")"#).unwrap();
/// assert!(matches!(rule, Node::Pipeline(ref stages) if stages.len() == 2));
///
/// let rule = parse("sort").unwrap();
/// assert!(matches!(rule, Node::FunctionCall { ref args, .. } if args.is_empty()));
/// ```
pub fn parse(input: &str) -> RuleResult<Node> {
    if input.trim().is_empty() {
        return Err(RuleSyntaxError::Empty);
    }

    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens: &tokens,
        index: 0,
        end: input.len(),
        depth: 0,
    };

    let node = parser.pipeline()?;
    if let Some(extra) = parser.peek() {
        return Err(RuleSyntaxError::at(
            extra.position,
            format!("unexpected '{}' after end of rule", extra.token),
        ));
    }
    Ok(node)
}

struct Parser<'t> {
    tokens: &'t [Spanned],
    index: usize,
    /// Byte length of the input, reported for errors at end of rule.
    end: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Spanned> {
        self.tokens.get(self.index)
    }

    fn bump(&mut self) -> Option<&'t Spanned> {
        let token = self.tokens.get(self.index);
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek().is_some_and(|s| &s.token == expected)
    }

    fn pipeline(&mut self) -> RuleResult<Node> {
        let first = self.function()?;
        if !self.check(&Token::Pipe) {
            return Ok(first);
        }

        let mut stages = vec![first];
        while self.check(&Token::Pipe) {
            self.bump();
            stages.push(self.function()?);
        }
        Ok(Node::Pipeline(stages))
    }

    fn function(&mut self) -> RuleResult<Node> {
        let (name, position) = match self.bump() {
            Some(Spanned {
                token: Token::Ident(name),
                position,
            }) => (name.clone(), *position),
            Some(other) => {
                return Err(RuleSyntaxError::at(
                    other.position,
                    format!("expected function name but found '{}'", other.token),
                ))
            }
            None => {
                return Err(RuleSyntaxError::at(
                    self.end,
                    "expected function name but found end of rule",
                ))
            }
        };

        let args = if self.check(&Token::LParen) {
            self.bump();
            self.arguments(&name, position)?
        } else {
            Vec::new()
        };

        Ok(Node::FunctionCall {
            name,
            args,
            position,
        })
    }

    fn arguments(&mut self, name: &str, position: usize) -> RuleResult<Vec<Node>> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(RuleSyntaxError::at(
                position,
                format!("arguments nested deeper than {} levels", MAX_NESTING),
            ));
        }

        let mut args = Vec::new();
        if self.check(&Token::RParen) {
            self.bump();
            self.depth -= 1;
            return Ok(args);
        }

        loop {
            args.push(self.value(name)?);
            match self.bump() {
                Some(Spanned {
                    token: Token::Comma,
                    ..
                }) => continue,
                Some(Spanned {
                    token: Token::RParen,
                    ..
                }) => break,
                Some(other) => {
                    return Err(RuleSyntaxError::at(
                        other.position,
                        format!("expected ',' or ')' but found '{}'", other.token),
                    ))
                }
                None => {
                    return Err(RuleSyntaxError::Incomplete(format!(
                        "missing ')' to close the arguments of '{}'",
                        name
                    )))
                }
            }
        }

        self.depth -= 1;
        Ok(args)
    }

    fn value(&mut self, name: &str) -> RuleResult<Node> {
        match self.peek() {
            Some(Spanned {
                token: Token::Str(s),
                ..
            }) => {
                let node = Node::StringLiteral(s.clone());
                self.bump();
                Ok(node)
            }
            Some(Spanned {
                token: Token::Number(n),
                ..
            }) => {
                let node = Node::NumberLiteral(*n);
                self.bump();
                Ok(node)
            }
            Some(Spanned {
                token: Token::Ident(_),
                ..
            }) => self.pipeline(),
            Some(other) => Err(RuleSyntaxError::at(
                other.position,
                format!("expected an argument but found '{}'", other.token),
            )),
            None => Err(RuleSyntaxError::Incomplete(format!(
                "missing argument for '{}'",
                name
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
