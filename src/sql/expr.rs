//! Expression AST for predicates, bucket labels and aggregates.
//!
//! Expressions are built with the free constructors ([`col`], [`lit_str`],
//! [`avg`], ...) and the [`ExprExt`] combinators, then rendered through a
//! [`TokenStream`]. Literals stay typed until serialization so the stream can
//! either inline them or bind them.

use super::dialect::Dialect;
use super::query::SelectExpr;
use super::token::{Token, TokenStream};

/// A SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Unqualified column; every query reads a single table.
    Column(String),

    Literal(Literal),

    /// `left op right`
    Binary {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// `NAME(args...)`
    Function { name: String, args: Vec<Expr> },

    /// Searched CASE. Arms are tried in order.
    Case {
        arms: Vec<(Expr, Expr)>,
        otherwise: Box<Expr>,
    },

    /// `expr IN (values...)`
    In { expr: Box<Expr>, values: Vec<Expr> },

    /// `expr [NOT] LIKE pattern`
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
    },

    /// `*`
    Star,

    Paren(Box<Expr>),
}

/// Typed literal. Bound as a parameter or inlined, depending on rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
}

impl BinaryOperator {
    fn token(self) -> Token {
        match self {
            BinaryOperator::Eq => Token::Eq,
            BinaryOperator::Ne => Token::Ne,
            BinaryOperator::Lt => Token::Lt,
            BinaryOperator::Gt => Token::Gt,
            BinaryOperator::Lte => Token::Lte,
            BinaryOperator::Gte => Token::Gte,
            BinaryOperator::And => Token::And,
        }
    }
}

impl Expr {
    /// Tokens for the default dialect.
    pub fn to_tokens(&self) -> TokenStream {
        self.to_tokens_for_dialect(Dialect::default())
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column(name) => {
                ts.push(Token::Ident(name.clone()));
            }

            Expr::Literal(lit) => {
                ts.push(match lit {
                    Literal::Int(n) => Token::LitInt(*n),
                    Literal::Float(f) => Token::LitFloat(*f),
                    Literal::String(s) => Token::LitString(s.clone()),
                    Literal::Bool(b) => Token::LitBool(*b),
                    Literal::Null => Token::LitNull,
                });
            }

            Expr::Binary { left, op, right } => {
                ts.append(&left.to_tokens_for_dialect(dialect))
                    .space()
                    .push(op.token())
                    .space()
                    .append(&right.to_tokens_for_dialect(dialect));
            }

            Expr::Function { name, args } => {
                ts.push(Token::FunctionName(name.clone())).lparen();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens_for_dialect(dialect));
                }
                ts.rparen();
            }

            Expr::Case { arms, otherwise } => {
                ts.push(Token::Case);
                for (when, then) in arms {
                    ts.space()
                        .push(Token::When)
                        .space()
                        .append(&when.to_tokens_for_dialect(dialect))
                        .space()
                        .push(Token::Then)
                        .space()
                        .append(&then.to_tokens_for_dialect(dialect));
                }
                ts.space()
                    .push(Token::Else)
                    .space()
                    .append(&otherwise.to_tokens_for_dialect(dialect))
                    .space()
                    .push(Token::End);
            }

            Expr::In { expr, values } => {
                // `x IN ()` does not parse; an empty list matches nothing.
                if values.is_empty() {
                    ts.push(Token::False);
                } else {
                    ts.append(&expr.to_tokens_for_dialect(dialect))
                        .space()
                        .push(Token::In)
                        .space()
                        .lparen();
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(&value.to_tokens_for_dialect(dialect));
                    }
                    ts.rparen();
                }
            }

            Expr::Like {
                expr,
                pattern,
                negated,
            } => {
                ts.append(&expr.to_tokens_for_dialect(dialect));
                if *negated {
                    ts.space().push(Token::Not);
                }
                ts.space()
                    .push(Token::Like)
                    .space()
                    .append(&pattern.to_tokens_for_dialect(dialect));
            }

            Expr::Star => {
                ts.push(Token::Star);
            }

            Expr::Paren(inner) => {
                ts.lparen()
                    .append(&inner.to_tokens_for_dialect(dialect))
                    .rparen();
            }
        }

        ts
    }

    /// AND of every condition, left to right. `None` for an empty list.
    pub fn conjunction(conditions: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        conditions.into_iter().reduce(|acc, next| acc.and(next))
    }
}

pub fn col(name: &str) -> Expr {
    Expr::Column(name.into())
}

pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

pub fn lit_float(f: f64) -> Expr {
    Expr::Literal(Literal::Float(f))
}

pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

pub fn lit_null() -> Expr {
    Expr::Literal(Literal::Null)
}

pub fn star() -> Expr {
    Expr::Star
}

/// `CASE WHEN .. THEN .. ELSE otherwise END`
pub fn case_when(arms: Vec<(Expr, Expr)>, otherwise: Expr) -> Expr {
    Expr::Case {
        arms,
        otherwise: Box::new(otherwise),
    }
}

/// `COUNT(*)`; counts rows whatever their values.
pub fn count_star() -> Expr {
    func("COUNT", vec![star()])
}

pub fn sum(expr: Expr) -> Expr {
    func("SUM", vec![expr])
}

pub fn avg(expr: Expr) -> Expr {
    func("AVG", vec![expr])
}

pub fn min(expr: Expr) -> Expr {
    func("MIN", vec![expr])
}

pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
    }
}

/// Fluent combinators for anything convertible to an [`Expr`].
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn eq(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Eq, other.into())
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Ne, other.into())
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Gt, other.into())
    }

    fn gte(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Gte, other.into())
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Lt, other.into())
    }

    fn lte(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Lte, other.into())
    }

    fn and(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::And, other.into())
    }

    fn like(self, pattern: impl Into<Expr>) -> Expr {
        like(self.into_expr(), pattern.into(), false)
    }

    fn not_like(self, pattern: impl Into<Expr>) -> Expr {
        like(self.into_expr(), pattern.into(), true)
    }

    fn in_list(self, values: Vec<Expr>) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            values,
        }
    }

    fn paren(self) -> Expr {
        Expr::Paren(Box::new(self.into_expr()))
    }

    /// SELECT-list item `expr AS name`.
    fn alias(self, name: &str) -> SelectExpr {
        SelectExpr {
            expr: self.into_expr(),
            alias: Some(name.into()),
        }
    }
}

fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

fn like(expr: Expr, pattern: Expr, negated: bool) -> Expr {
    Expr::Like {
        expr: Box::new(expr),
        pattern: Box::new(pattern),
        negated,
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl From<Literal> for Expr {
    fn from(lit: Literal) -> Self {
        Expr::Literal(lit)
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        lit_int(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        lit_int(n.into())
    }
}

impl From<f64> for Expr {
    fn from(f: f64) -> Self {
        lit_float(f)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        lit_str(s)
    }
}
