//! Token layer between the AST and SQL text.
//!
//! A [`TokenStream`] renders two ways. [`TokenStream::serialize`] inlines
//! literals, escaped for the dialect, and backs `explain`.
//! [`TokenStream::serialize_bound`] swaps each literal for a placeholder and
//! collects the values; the store only ever executes this form.

use super::dialect::{Dialect, SqlDialect};
use super::expr::Literal;

/// One lexical element of generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Select,
    Distinct,
    From,
    Where,
    GroupBy,
    OrderBy,
    Asc,
    Desc,
    Limit,
    Offset,
    With,
    As,
    And,
    Not,
    In,
    Like,
    Case,
    When,
    Then,
    Else,
    End,
    /// Dialect spelling of true / false.
    True,
    False,

    Comma,
    Star,
    LParen,
    RParen,

    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,

    Space,
    Newline,
    Indent(usize),

    /// Quoted identifier.
    Ident(String),
    FunctionName(String),

    // Literals. Everything but NULL is bound in bound mode.
    LitInt(i64),
    LitFloat(f64),
    LitString(String),
    LitBool(bool),
    LitNull,

    /// Static SQL fragment, emitted verbatim. Never built from view input.
    Raw(String),
}

impl Token {
    pub fn serialize(&self, dialect: Dialect) -> String {
        let keyword = match self {
            Token::Select => "SELECT",
            Token::Distinct => "DISTINCT",
            Token::From => "FROM",
            Token::Where => "WHERE",
            Token::GroupBy => "GROUP BY",
            Token::OrderBy => "ORDER BY",
            Token::Asc => "ASC",
            Token::Desc => "DESC",
            Token::Limit => "LIMIT",
            Token::Offset => "OFFSET",
            Token::With => "WITH",
            Token::As => "AS",
            Token::And => "AND",
            Token::Not => "NOT",
            Token::In => "IN",
            Token::Like => "LIKE",
            Token::Case => "CASE",
            Token::When => "WHEN",
            Token::Then => "THEN",
            Token::Else => "ELSE",
            Token::End => "END",
            Token::True => dialect.format_bool(true),
            Token::False => dialect.format_bool(false),
            Token::Comma => ",",
            Token::Star => "*",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Eq => "=",
            Token::Ne => "<>",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Lte => "<=",
            Token::Gte => ">=",
            Token::Space => " ",
            Token::Newline => "\n",
            Token::LitNull => "NULL",
            Token::LitBool(b) => dialect.format_bool(*b),

            Token::Indent(n) => return "  ".repeat(*n),
            Token::Ident(name) => return dialect.quote_identifier(name),
            Token::FunctionName(name) => return name.to_uppercase(),
            Token::LitInt(n) => return n.to_string(),
            Token::LitFloat(f) => return format_float(*f),
            Token::LitString(s) => return dialect.quote_string(s),
            Token::Raw(s) => return s.clone(),
        };
        keyword.to_string()
    }

    fn bind_value(&self) -> Option<Literal> {
        match self {
            Token::LitInt(n) => Some(Literal::Int(*n)),
            Token::LitFloat(f) if f.is_finite() => Some(Literal::Float(*f)),
            Token::LitString(s) => Some(Literal::String(s.clone())),
            Token::LitBool(b) => Some(Literal::Bool(*b)),
            _ => None,
        }
    }
}

/// Shortest round-tripping form. NaN and infinities have no SQL literal and
/// render as NULL.
fn format_float(f: f64) -> String {
    if !f.is_finite() {
        return "NULL".into();
    }
    let mut buffer = ryu::Buffer::new();
    buffer.format_finite(f).to_string()
}

/// Executable SQL: text with placeholders plus the values for them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundSql {
    pub sql: String,
    pub params: Vec<Literal>,
}

impl std::fmt::Display for BoundSql {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend_from_slice(&other.tokens);
        self
    }

    pub fn serialize(&self, dialect: Dialect) -> String {
        self.tokens.iter().map(|t| t.serialize(dialect)).collect()
    }

    /// Placeholders are numbered in emission order, which is also the
    /// order of `params`.
    pub fn serialize_bound(&self, dialect: Dialect) -> BoundSql {
        let mut bound = BoundSql::default();
        for token in &self.tokens {
            if let Some(value) = token.bind_value() {
                bound.params.push(value);
                bound.sql.push_str(&dialect.placeholder(bound.params.len()));
            } else {
                bound.sql.push_str(&token.serialize(dialect));
            }
        }
        bound
    }

    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }

    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }

    pub fn indent(&mut self, depth: usize) -> &mut Self {
        self.push(Token::Indent(depth))
    }

    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }

    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }

    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
