//! SQL generation.
//!
//! Views compile to a [`Query`], which renders through a [`TokenStream`]
//! either with inline literals (for `explain`) or as [`BoundSql`] with
//! positional parameters (for execution). View input only ever reaches SQL
//! as a literal token.

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    avg, case_when, col, count_star, func, lit_float, lit_int, lit_null, lit_str, min, star, sum,
    BinaryOperator, Expr, ExprExt, Literal,
};
pub use query::{Cte, OrderByExpr, Query, SelectExpr, SortDir};
pub use token::{BoundSql, Token, TokenStream};
