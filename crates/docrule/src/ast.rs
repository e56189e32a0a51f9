//! Token and syntax tree types for rule strings.

// =============================================================================
// Tokens
// =============================================================================

/// A lexical unit of a rule string.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    /// Function name, e.g. `field` or `formatDate`.
    Ident(String),
    /// Double-quoted string literal with escapes already resolved.
    Str(String),
    /// Optionally signed integer literal.
    Number(i64),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `|`
    Pipe,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "{}", name),
            Token::Str(s) => write_quoted(f, s),
            Token::Number(n) => write!(f, "{}", n),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Pipe => write!(f, "|"),
        }
    }
}

/// A token together with the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Byte offset of the first character of the token.
    pub position: usize,
}

impl Spanned {
    /// Creates a spanned token.
    pub fn new(token: Token, position: usize) -> Self {
        Self { token, position }
    }
}

// =============================================================================
// Syntax tree
// =============================================================================

/// A node of the rule syntax tree.
///
/// A rule is a [`Node::Pipeline`] of function calls, or a single
/// [`Node::FunctionCall`] when it has only one stage. Arguments are literals
/// or nested pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// Function application.
    /// Example: `field("Name")`, `sort`
    FunctionCall {
        /// Function name as written in the rule.
        name: String,
        /// Arguments in source order (empty for a bare name).
        args: Vec<Node>,
        /// Byte offset of the function name.
        position: usize,
    },

    /// String literal argument.
    /// Example: `"; "`
    StringLiteral(String),

    /// Integer literal argument.
    /// Example: `-1`
    NumberLiteral(i64),

    /// Two or more stages chained with `|`, applied left to right.
    /// Example: `field("Relation") | join("; ")`
    Pipeline(Vec<Node>),
}

impl Node {
    /// Returns the stages of this node: the children of a pipeline, or the
    /// node itself.
    pub fn stages(&self) -> &[Node] {
        match self {
            Node::Pipeline(stages) => stages,
            other => std::slice::from_ref(other),
        }
    }

    /// Returns true if this node is a string or number literal.
    pub fn is_literal(&self) -> bool {
        matches!(self, Node::StringLiteral(_) | Node::NumberLiteral(_))
    }

    /// Returns every function name used in this tree, in source order.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::FunctionCall { name, args, .. } => {
                out.push(name);
                for arg in args {
                    arg.collect_names(out);
                }
            }
            Node::Pipeline(stages) => {
                for stage in stages {
                    stage.collect_names(out);
                }
            }
            Node::StringLiteral(_) | Node::NumberLiteral(_) => {}
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::FunctionCall { name, args, .. } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            Node::StringLiteral(s) => write_quoted(f, s),
            Node::NumberLiteral(n) => write!(f, "{}", n),
            Node::Pipeline(stages) => {
                for (i, stage) in stages.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", stage)?;
                }
                Ok(())
            }
        }
    }
}

fn write_quoted(f: &mut std::fmt::Formatter<'_>, s: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for ch in s.chars() {
        match ch {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}
