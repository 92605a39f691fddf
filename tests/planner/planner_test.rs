//! View compilation: plan shape and generated SQL.

use soma_bi::model::{
    defaults, Aggregation, AxisSlot, Condition, ConditionType, Operation, Parameter, Style, Unit,
    View,
};
use soma_bi::planner::{Pagination, PlanBuilder, PlanMode, Shape};
use soma_bi::sql::{Dialect, Literal};

fn depth_chart() -> View {
    View::new(7, Style::Line, Unit::Building)
        .with_parameter(Parameter::column(AxisSlot::XAxis, "depth"))
        .with_parameter(Parameter::column(AxisSlot::YAxis, "household_size"))
}

fn explain(view: &View, page: Pagination, dialect: Dialect) -> String {
    PlanBuilder::new(view)
        .build(page)
        .unwrap()
        .to_query()
        .to_sql(dialect)
}

#[test]
fn test_table_view_sql() {
    let view = View::new(7, Style::Table, Unit::Area)
        .with_parameter(Parameter::table_columns(["area_group", "vacant_house_count"]))
        .with_parameter(Parameter::areas(["北区"]));

    insta::assert_snapshot!(explain(&view, Pagination::new(10, 0), Dialect::Sqlite), @r#"
    SELECT
      "area_group",
      "vacant_house_count"
    FROM "data_set_detail_areas"
    WHERE "data_set_result_id" = 7 AND "area_group" IN ('北区')
    ORDER BY "id" ASC
    LIMIT 10 OFFSET 0
    "#);
}

#[test]
fn test_bucketed_chart_sql() {
    let view = depth_chart()
        .with_parameter(Parameter::group(
            "0",
            "shallow",
            Condition::compare(ConditionType::Integer, Operation::Lt, 10),
        ))
        .with_parameter(Parameter::Aggregation(Aggregation::Sum));

    insta::assert_snapshot!(explain(&view, Pagination::new(10, 0), Dialect::Sqlite), @r#"
    WITH "bucketed" AS (
    SELECT
      "household_size" AS "y",
      CASE WHEN "depth" < 10 THEN 'shallow' ELSE NULL END AS "bucket",
      CASE WHEN "depth" < 10 THEN 0 ELSE NULL END AS "bucket_rank"
    FROM "data_set_detail_buildings"
    WHERE "data_set_result_id" = 7
    )
    SELECT
      "bucket" AS "x",
      SUM("y") AS "y"
    FROM "bucketed"
    WHERE "bucket" <> ''
    GROUP BY "bucket"
    ORDER BY MIN("bucket_rank") ASC
    "#);
}

#[test]
fn test_bar_chart_orders_by_date() {
    let view = View::new(7, Style::Bar, Unit::Area)
        .with_parameter(Parameter::column(AxisSlot::XAxis, "reference_date"))
        .with_parameter(Parameter::column(AxisSlot::YAxis, "vacant_house_count"));
    let sql = explain(&view, Pagination::new(20, 40), Dialect::Postgres);
    assert!(sql.contains("ORDER BY \"reference_date\" ASC, \"id\" ASC"));
    assert!(sql.ends_with("LIMIT 20 OFFSET 40"));
}

#[test]
fn test_offset_only_page_per_dialect() {
    let view = View::new(7, Style::Table, Unit::Area)
        .with_parameter(Parameter::table_columns(["area_group"]));
    let page = Pagination {
        limit: None,
        offset: Some(5),
    };
    assert!(explain(&view, page, Dialect::Sqlite).ends_with("LIMIT -1 OFFSET 5"));
    assert!(explain(&view, page, Dialect::Postgres).ends_with("\nOFFSET 5"));
}

#[test]
fn test_pie_defaults_are_rescaled() {
    let view = defaults::pie_group_parameters().into_iter().fold(
        View::new(7, Style::Pie, Unit::Building)
            .with_parameter(Parameter::column(AxisSlot::Label, "predicted_probability"))
            .with_parameter(Parameter::column(AxisSlot::Value, "predicted_probability")),
        |view, p| view.with_parameter(p),
    );
    let plan = PlanBuilder::new(&view).build(Pagination::all()).unwrap();
    assert!(plan.is_bucketed());
    assert!(matches!(
        plan.shape,
        Shape::Chart {
            aggregation: Aggregation::Count,
            ..
        }
    ));

    let sql = plan.to_query().to_sql(Dialect::Sqlite);
    assert!(sql.contains("\"predicted_probability\" >= 0.26 AND \"predicted_probability\" <= 0.5"));
    assert!(sql.contains("THEN '空き家推定確率76~100%'"));
    assert!(sql.contains("COUNT(*) AS \"y\""));
}

#[test]
fn test_bound_sql_carries_every_literal() {
    let view = View::new(7, Style::Table, Unit::Building)
        .with_parameter(Parameter::table_columns(["normalized_address"]))
        .with_parameter(Parameter::filter(
            "address",
            Condition::compare(ConditionType::Text, Operation::Contains, "x' OR 1=1 --")
                .on("normalized_address"),
        ));
    let plan = PlanBuilder::new(&view).build(Pagination::new(5, 0)).unwrap();

    let bound = plan.to_query().to_bound_sql(Dialect::Postgres);
    assert!(!bound.sql.contains("OR 1=1"));
    assert!(bound.sql.contains("LIKE $2"));
    assert_eq!(
        bound.params,
        vec![
            Literal::Int(7),
            Literal::String("%x' OR 1=1 --%".into()),
            Literal::Int(5),
            Literal::Int(0),
        ]
    );

    let bound = plan.to_query().to_bound_sql(Dialect::Sqlite);
    assert_eq!(bound.sql.matches('?').count(), bound.params.len());
}

#[test]
fn test_groups_ignored_outside_charts() {
    let view = View::new(7, Style::Table, Unit::Building)
        .with_parameter(Parameter::table_columns(["depth"]))
        .with_parameter(Parameter::group(
            "0",
            "low",
            Condition::compare(ConditionType::Integer, Operation::Lt, 10),
        ));
    let plan = PlanBuilder::new(&view).build(Pagination::all()).unwrap();
    assert!(matches!(plan.mode, PlanMode::Rows(_)));
}

#[test]
fn test_line_defaults_bucket_by_date() {
    let dates = vec!["2024-04-01".to_string(), "2023-04-01".to_string()];
    let view = defaults::line_group_parameters(&dates).into_iter().fold(
        View::new(7, Style::Line, Unit::Building)
            .with_parameter(Parameter::column(AxisSlot::XAxis, "reference_date"))
            .with_parameter(Parameter::column(AxisSlot::YAxis, "predicted_probability")),
        |view, p| view.with_parameter(p),
    );
    let sql = explain(&view, Pagination::all(), Dialect::DuckDb);
    assert!(sql.contains("WHEN \"reference_date\" = '2024-04-01' THEN '2024年'"));
    assert!(sql.contains("AVG(\"y\") AS \"y\""));
}
