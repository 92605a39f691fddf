//! Every generated query must parse in every dialect, inline and bound.

use soma_bi::model::{
    defaults, Aggregation, AxisSlot, Condition, ConditionType, Operation, Parameter, Style, Unit,
    View, YearRange,
};
use soma_bi::planner::{Pagination, PlanBuilder};
use soma_bi::sql::Dialect;
use sqlparser::dialect::{DuckDbDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

const DIALECTS: [Dialect; 3] = [Dialect::Sqlite, Dialect::Postgres, Dialect::DuckDb];

fn assert_parses(sql: &str, dialect: Dialect) {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::DuckDb => Box::new(DuckDbDialect {}),
    };
    if let Err(e) = Parser::parse_sql(&*parser_dialect, sql) {
        panic!("invalid SQL for {:?}: {}\n{}", dialect, e, sql);
    }
}

fn views() -> Vec<View> {
    let filters = [
        Condition::compare(ConditionType::Text, Operation::NotContains, "it's")
            .on("normalized_address"),
        Condition::range(ConditionType::FloatRange, 10.5, false, 90, true)
            .on("predicted_probability"),
        Condition::range(ConditionType::DateRange, "2020-01-01", true, "2024-12-31", false)
            .on("registration_date"),
        Condition::boolean(true).on("water_disconnection_flag"),
        Condition::compare(ConditionType::Date, Operation::Gte, "2021-04-01").on("reference_date"),
    ];
    let scoped = |view: View| {
        filters
            .iter()
            .enumerate()
            .fold(view, |v, (i, c)| v.with_parameter(Parameter::filter(&i.to_string(), c.clone())))
            .with_parameter(Parameter::Year(YearRange::new(Some("2021"), Some("2024"))))
            .with_parameter(Parameter::areas(["北区", "O'Hare"]))
    };

    let table = View::new(1, Style::Table, Unit::Building)
        .with_parameter(Parameter::table_columns(["area_group", "predicted_probability"]));
    let line = View::new(1, Style::Line, Unit::Building)
        .with_parameter(Parameter::column(AxisSlot::XAxis, "depth"))
        .with_parameter(Parameter::column(AxisSlot::YAxis, "household_size"));
    let grouped = line
        .with_parameter(Parameter::group(
            "0",
            "a",
            Condition::range(ConditionType::IntegerRange, 0, true, 10, false),
        ))
        .with_parameter(Parameter::Aggregation(Aggregation::Avg));
    let pie = defaults::pie_group_parameters().into_iter().fold(
        View::new(1, Style::Pie, Unit::Building)
            .with_parameter(Parameter::column(AxisSlot::Label, "predicted_probability"))
            .with_parameter(Parameter::column(AxisSlot::Value, "predicted_probability")),
        |v, p| v.with_parameter(p),
    );
    let bar = View::new(1, Style::Bar, Unit::Area)
        .with_parameter(Parameter::column(AxisSlot::XAxis, "reference_date"))
        .with_parameter(Parameter::column(AxisSlot::YAxis, "vacant_house_count"));

    vec![
        scoped(table),
        scoped(line),
        scoped(grouped),
        scoped(pie),
        bar,
    ]
}

#[test]
fn test_generated_sql_parses() {
    let pages = [
        Pagination::all(),
        Pagination::new(25, 50),
        Pagination {
            limit: None,
            offset: Some(3),
        },
    ];
    for view in views() {
        for page in pages {
            let query = PlanBuilder::new(&view).build(page).unwrap().to_query();
            for dialect in DIALECTS {
                assert_parses(&query.to_sql(dialect), dialect);
                assert_parses(&query.to_bound_sql(dialect).sql, dialect);
            }
        }
    }
}
