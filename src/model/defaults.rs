//! Default group rules offered when a chart is first created.

use super::condition::{Condition, ConditionType, Operation};
use super::parameter::{Aggregation, Parameter};

/// Probability quartiles used by new pie charts, in percent.
const PIE_BUCKETS: [(i64, i64); 4] = [(0, 25), (26, 50), (51, 75), (76, 100)];

/// One `date eq` rule per reference date, labelled with its year, averaged.
///
/// `reference_dates` are ISO dates (`YYYY-MM-DD`). Dates too short to carry a
/// year are skipped.
pub fn line_group_parameters(reference_dates: &[String]) -> Vec<Parameter> {
    let mut params: Vec<Parameter> = reference_dates
        .iter()
        .filter_map(|date| date.get(..4).map(|year| (date, year)))
        .enumerate()
        .map(|(i, (date, year))| {
            Parameter::group(
                &i.to_string(),
                &format!("{year}年"),
                Condition::compare(ConditionType::Date, Operation::Eq, date.as_str()),
            )
        })
        .collect();
    params.push(Parameter::Aggregation(Aggregation::Avg));
    params
}

/// Vacancy-probability quartiles, counted.
pub fn pie_group_parameters() -> Vec<Parameter> {
    let mut params: Vec<Parameter> = PIE_BUCKETS
        .iter()
        .enumerate()
        .map(|(i, &(start, last))| {
            Parameter::group(
                &i.to_string(),
                &format!("空き家推定確率{start}~{last}%"),
                Condition::range(ConditionType::FloatRange, start, true, last, true),
            )
        })
        .collect();
    params.push(Parameter::Aggregation(Aggregation::Count));
    params
}
