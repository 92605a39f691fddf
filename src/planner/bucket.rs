//! Bucket expressions built from ordered group rules.

use crate::model::condition::Condition;
use crate::sql::{case_when, lit_int, lit_null, Expr};

use super::predicate::compile;

/// Label expression plus the rank expression that orders its output.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketExpression {
    /// Label of the first matching rule, or NULL.
    pub label: Expr,
    /// Position (from 0) of the first matching rule, or NULL.
    pub rank: Expr,
    /// Rules that compiled to a WHEN arm.
    pub arms: usize,
}

/// Build the CASE expressions bucketing `column` by `groups`.
///
/// CASE evaluates its arms in order, so the first matching rule wins. Rules
/// that degrade contribute no arm. With no arms at all every row lands in the
/// NULL bucket.
pub fn build_buckets<'a>(
    column: &str,
    groups: impl IntoIterator<Item = (&'a str, Condition)>,
) -> BucketExpression {
    let mut label_arms = Vec::new();
    let mut rank_arms = Vec::new();

    for (label, condition) in groups {
        let Some(when) = compile(column, &condition).to_expr() else {
            continue;
        };
        rank_arms.push((when.clone(), lit_int(rank_arms.len() as i64)));
        label_arms.push((when, Expr::from(label)));
    }

    let arms = label_arms.len();
    BucketExpression {
        label: case(label_arms),
        rank: case(rank_arms),
        arms,
    }
}

fn case(arms: Vec<(Expr, Expr)>) -> Expr {
    if arms.is_empty() {
        return lit_null();
    }
    case_when(arms, lit_null())
}
