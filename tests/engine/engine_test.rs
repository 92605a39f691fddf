//! End-to-end view execution against an in-memory store.

#[path = "../common/mod.rs"]
mod common;

use common::{building, column, insert_all, seed_buildings, seed_depths, store, RESULT_ID};
use soma_bi::engine::format;
use soma_bi::error::{EngineError, ErrorKind, ValidationError};
use soma_bi::model::{
    Aggregation, AxisSlot, Condition, ConditionType, Operation, Parameter, Style, Unit, View,
    YearRange,
};
use soma_bi::planner::Pagination;
use soma_bi::store::Row;
use soma_bi::value::Value;
use soma_bi::QueryEngine;

fn table(columns: &[&str]) -> View {
    View::new(RESULT_ID, Style::Table, Unit::Building)
        .with_parameter(Parameter::table_columns(columns.iter().copied()))
}

fn depth_chart() -> View {
    View::new(RESULT_ID, Style::Line, Unit::Building)
        .with_parameter(Parameter::column(AxisSlot::XAxis, "depth"))
        .with_parameter(Parameter::column(AxisSlot::YAxis, "household_size"))
}

fn rows(engine: &QueryEngine<&soma_bi::SqliteStore>, view: &View, page: Pagination) -> Vec<Row> {
    engine
        .execute(view, page)
        .unwrap()
        .as_table()
        .unwrap()
        .data
        .clone()
}

#[test]
fn test_contains_filter() {
    let store = store();
    insert_all(
        &store,
        Unit::Building,
        ["東京都北区1-1", "大阪府北区2-2", "東京都南区3-3"]
            .map(|a| building("北区", "2024-04-01").with("normalized_address", a)),
    );
    let engine = QueryEngine::new(&store);

    let contains = Condition::compare(ConditionType::Text, Operation::Contains, "東京")
        .on("normalized_address");
    let view = table(&["normalized_address"]).with_parameter(Parameter::filter("address", contains));
    let found = rows(&engine, &view, Pagination::all());
    assert_eq!(
        column(&found, "normalized_address"),
        vec![Value::from("東京都北区1-1"), Value::from("東京都南区3-3")]
    );

    let excludes = Condition::compare(ConditionType::Text, Operation::NotContains, "東京")
        .on("normalized_address");
    let view = view.with_parameter(Parameter::filter("address", excludes));
    let found = rows(&engine, &view, Pagination::all());
    assert_eq!(column(&found, "normalized_address"), vec![Value::from("大阪府北区2-2")]);
}

#[test]
fn test_half_open_range_filter() {
    let store = store();
    seed_depths(&store);
    let engine = QueryEngine::new(&store);

    // (10, 20]
    let range = Condition::range(ConditionType::IntegerRange, 10, false, 20, true).on("depth");
    let view = table(&["depth"]).with_parameter(Parameter::filter("depth", range));
    let found = rows(&engine, &view, Pagination::all());
    assert_eq!(column(&found, "depth"), vec![Value::Integer(15), Value::Integer(20)]);
}

#[test]
fn test_buckets_first_match_wins_and_unmatched_rows_drop() {
    let store = store();
    seed_depths(&store);
    let engine = QueryEngine::new(&store);

    let view = depth_chart()
        .with_parameter(Parameter::group(
            "0",
            "low",
            Condition::range(ConditionType::IntegerRange, 0, true, 30, true),
        ))
        .with_parameter(Parameter::group(
            "1",
            "mid",
            Condition::range(ConditionType::IntegerRange, 30, true, 60, true),
        ))
        .with_parameter(Parameter::Aggregation(Aggregation::Count));

    let payload = engine.execute(&view, Pagination::new(1, 0)).unwrap();
    let chart = payload.as_chart().unwrap();
    assert!(!chart.pagination_applied);

    // 30 lands in "low"; 100 matches nothing; the NULL household size at 45
    // still counts.
    let points: Vec<_> = chart.data.iter().map(|p| (p.x.clone(), p.y.clone())).collect();
    assert_eq!(
        points,
        vec![
            (Value::from("low"), Value::Integer(6)),
            (Value::from("mid"), Value::Integer(1)),
        ]
    );
}

#[test]
fn test_bucket_order_follows_rule_order() {
    let store = store();
    seed_depths(&store);
    let engine = QueryEngine::new(&store);

    let view = depth_chart()
        .with_parameter(Parameter::group(
            "0",
            "deep",
            Condition::compare(ConditionType::Integer, Operation::Gte, 50),
        ))
        .with_parameter(Parameter::group(
            "1",
            "shallow",
            Condition::compare(ConditionType::Integer, Operation::Lt, 50),
        ))
        .with_parameter(Parameter::Aggregation(Aggregation::Sum));

    let payload = engine.execute(&view, Pagination::all()).unwrap();
    let labels: Vec<_> = payload.as_chart().unwrap().data.iter().map(|p| p.x.clone()).collect();
    assert_eq!(labels, vec![Value::from("deep"), Value::from("shallow")]);
}

#[test]
fn test_degraded_conditions_never_fail() {
    let store = store();
    seed_depths(&store);
    let engine = QueryEngine::new(&store);

    let half_range = Condition {
        last_value: None,
        ..Condition::range(ConditionType::IntegerRange, 0, true, 10, true)
    }
    .on("depth");
    let view = table(&["depth"])
        .with_parameter(Parameter::filter("a", half_range))
        .with_parameter(Parameter::filter(
            "b",
            Condition::compare(ConditionType::Boolean, Operation::Contains, "x").on("depth"),
        ))
        .with_parameter(Parameter::filter(
            "c",
            Condition::compare(ConditionType::Integer, Operation::Eq, "abc").on("depth"),
        ))
        .with_parameter(Parameter::filter(
            "d",
            Condition::compare(ConditionType::Integer, Operation::Eq, 1).on("no_such_column"),
        ));

    let found = rows(&engine, &view, Pagination::all());
    assert_eq!(found.len(), 8);

    // A chart whose only rule degrades has no buckets.
    let chart = depth_chart().with_parameter(Parameter::group(
        "0",
        "bad",
        Condition::compare(ConditionType::Unrecognized, Operation::Eq, 1),
    ));
    let payload = engine.execute(&chart, Pagination::all()).unwrap();
    assert!(payload.as_chart().unwrap().data.is_empty());
}

#[test]
fn test_injection_strings_are_data() {
    let store = store();
    let hostile = "'; DROP TABLE data_set_detail_buildings; --";
    insert_all(
        &store,
        Unit::Building,
        [
            building("北区", "2024-04-01").with("normalized_address", hostile),
            building("北区", "2024-04-01").with("normalized_address", "safe"),
        ],
    );
    let engine = QueryEngine::new(&store);

    let view = table(&["normalized_address"]).with_parameter(Parameter::filter(
        "address",
        Condition::compare(ConditionType::Text, Operation::Eq, hostile).on("normalized_address"),
    ));
    let found = rows(&engine, &view, Pagination::all());
    assert_eq!(column(&found, "normalized_address"), vec![Value::from(hostile)]);

    let areas = table(&["normalized_address"]).with_parameter(Parameter::areas(["' OR '1'='1"]));
    assert!(rows(&engine, &areas, Pagination::all()).is_empty());

    // The table survived.
    assert_eq!(rows(&engine, &table(&["normalized_address"]), Pagination::all()).len(), 2);
}

#[test]
fn test_pagination_is_stable() {
    let store = store();
    seed_buildings(&store, 5);
    let engine = QueryEngine::new(&store);
    let view = table(&["household_size"]);

    let all = rows(&engine, &view, Pagination::all());
    assert_eq!(all.len(), 5);

    let first = rows(&engine, &view, Pagination::new(2, 0));
    assert_eq!(first, rows(&engine, &view, Pagination::new(2, 0)));

    let mut paged = Vec::new();
    for offset in [0, 2, 4] {
        paged.extend(rows(&engine, &view, Pagination::new(2, offset)));
    }
    assert_eq!(paged, all);
    assert!(rows(&engine, &view, Pagination::new(2, 6)).is_empty());
}

#[test]
fn test_year_and_area_scope() {
    let store = store();
    insert_all(
        &store,
        Unit::Building,
        [
            building("北区", "2022-04-01").with("household_size", 1),
            building("北区", "2023-04-01").with("household_size", 2),
            building("南区", "2023-09-01").with("household_size", 3),
            building("北区", "2024-04-01").with("household_size", 4),
        ],
    );
    let engine = QueryEngine::new(&store);

    let view = table(&["household_size"])
        .with_parameter(Parameter::Year(YearRange::new(Some("2023"), Some("2023"))))
        .with_parameter(Parameter::areas(["北区"]));
    let found = rows(&engine, &view, Pagination::all());
    assert_eq!(column(&found, "household_size"), vec![Value::Integer(2)]);

    // An open end keeps everything after the start.
    let view = table(&["household_size"])
        .with_parameter(Parameter::Year(YearRange::new(Some("2023"), None)));
    assert_eq!(rows(&engine, &view, Pagination::all()).len(), 3);
}

#[test]
fn test_percent_filter_is_rescaled() {
    let store = store();
    insert_all(
        &store,
        Unit::Building,
        [0.2, 0.55, 0.9].map(|p| building("北区", "2024-04-01").with("predicted_probability", p)),
    );
    let engine = QueryEngine::new(&store);

    let view = table(&["predicted_probability"]).with_parameter(Parameter::filter(
        "probability",
        Condition::range(ConditionType::FloatRange, 50.0, true, 100.0, true)
            .on("predicted_probability"),
    ));
    let found = rows(&engine, &view, Pagination::all());
    assert_eq!(
        column(&found, "predicted_probability"),
        vec![Value::Real(0.55), Value::Real(0.9)]
    );
}

#[test]
fn test_chart_rows_and_presentation() {
    let store = store();
    insert_all(
        &store,
        Unit::Area,
        [("2023-04-01", 0.1239), ("2024-04-01", 0.5)].map(|(date, p)| {
            Row::new()
                .with("data_set_result_id", RESULT_ID)
                .with("area_group", "北区")
                .with("reference_date", date)
                .with("predicted_probability", p)
        }),
    );
    let engine = QueryEngine::new(&store);

    let view = View::new(RESULT_ID, Style::Bar, Unit::Area)
        .with_parameter(Parameter::column(AxisSlot::XAxis, "reference_date"))
        .with_parameter(Parameter::column(AxisSlot::YAxis, "predicted_probability"));
    let payload = engine.execute(&view, Pagination::new(10, 0)).unwrap();
    assert!(payload.as_chart().unwrap().pagination_applied);

    let shown = format::present(payload);
    let ys: Vec<_> = shown.as_chart().unwrap().data.iter().map(|p| p.y.clone()).collect();
    assert_eq!(ys, vec![Value::Real(12.3), Value::Real(50.0)]);

    let json = serde_json::to_value(&shown).unwrap();
    assert_eq!(json["kind"], "chart");
    assert_eq!(json["xAxisColumn"]["name"], "reference_date");
    assert_eq!(json["data"][0]["x"], "2023-04-01");
}

#[test]
fn test_validation_errors() {
    let store = store();
    let engine = QueryEngine::new(&store);

    let err = engine
        .execute(&View::new(RESULT_ID, Style::Map, Unit::Building), Pagination::all())
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::UnsupportedView { style: Style::Map, .. })
    ));

    let err = engine
        .execute(&View::new(RESULT_ID, Style::Bar, Unit::Building), Pagination::all())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = engine
        .execute(
            &table(&["household_size"]).with_parameter(Parameter::table_columns(Vec::<&str>::new())),
            Pagination::all(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::MissingSlot("columns"))
    ));

    let err = engine
        .execute(&View::new(0, Style::Table, Unit::Area), Pagination::all())
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::MissingDatasetResultId)
    ));
    assert!(!err.is_retriable());

    let err = engine
        .execute(
            &depth_chart().with_parameter(Parameter::column(AxisSlot::XAxis, "bogus")),
            Pagination::all(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::UnknownColumn { .. })
    ));
}

#[test]
fn test_reference_dates_and_area_groups() {
    let store = store();
    insert_all(
        &store,
        Unit::Building,
        [
            building("南区", "2023-04-01"),
            building("北区", "2024-04-01"),
            building("北区", "2023-04-01"),
            building("", "2022-04-01"),
        ],
    );
    seed_buildings(&store, 0);
    let engine = QueryEngine::new(&store);

    assert_eq!(
        engine.reference_dates(RESULT_ID, Unit::Building).unwrap(),
        vec!["2024-04-01", "2023-04-01", "2022-04-01"]
    );
    assert_eq!(
        engine.area_groups(RESULT_ID, Unit::Building).unwrap(),
        vec!["北区", "南区"]
    );
    assert!(engine.area_groups(RESULT_ID, Unit::Area).unwrap().is_empty());
    assert!(engine.reference_dates(0, Unit::Area).is_err());
}

#[test]
fn test_operator_coverage() {
    let store = store();
    insert_all(
        &store,
        Unit::Building,
        [
            ("東京都千代田区", 1, 0.8, Value::Integer(1), "2019-05-01"),
            ("大阪府大阪市", 2, 1.0, Value::Integer(0), "2020-01-01"),
            ("東京都港区", 3, 1.2, Value::Null, "2021-07-15"),
        ]
        .map(|(address, size, ratio, label, registered)| {
            building("北区", "2024-04-01")
                .with("normalized_address", address)
                .with("household_size", size)
                .with("gender_ratio", ratio)
                .with("predicted_label", label)
                .with("registration_date", registered)
        }),
    );
    let engine = QueryEngine::new(&store);

    use ConditionType as T;
    use Operation as Op;
    let cases: Vec<(Condition, Vec<i64>)> = vec![
        (Condition::compare(T::Text, Op::Eq, "大阪府大阪市").on("normalized_address"), vec![2]),
        (Condition::compare(T::Text, Op::NotEq, "大阪府大阪市").on("normalized_address"), vec![1, 3]),
        (Condition::compare(T::Text, Op::Contains, "東京").on("normalized_address"), vec![1, 3]),
        (Condition::compare(T::Text, Op::NotContains, "東京").on("normalized_address"), vec![2]),
        (Condition::compare(T::Integer, Op::Eq, 2).on("household_size"), vec![2]),
        (Condition::compare(T::Integer, Op::NotEq, 2).on("household_size"), vec![1, 3]),
        (Condition::compare(T::Integer, Op::Gt, 2).on("household_size"), vec![3]),
        (Condition::compare(T::Integer, Op::Lt, 2).on("household_size"), vec![1]),
        (Condition::compare(T::Integer, Op::Gte, 2).on("household_size"), vec![2, 3]),
        (Condition::compare(T::Integer, Op::Lte, 2).on("household_size"), vec![1, 2]),
        (Condition::compare(T::Integer, Op::Eq, "3").on("household_size"), vec![3]),
        (Condition::compare(T::Float, Op::Gte, 1.0).on("gender_ratio"), vec![2, 3]),
        (Condition::range(T::FloatRange, 0.8, false, 1.2, false).on("gender_ratio"), vec![2]),
        (Condition::range(T::IntegerRange, 1, true, 2, true).on("household_size"), vec![1, 2]),
        (Condition::compare(T::Date, Op::Gt, "2020-01-01").on("registration_date"), vec![3]),
        (Condition::compare(T::Date, Op::Lte, "2020-01-01").on("registration_date"), vec![1, 2]),
        (
            Condition::range(T::DateRange, "2019-01-01", true, "2020-01-01", false)
                .on("registration_date"),
            vec![1],
        ),
        (Condition::boolean(true).on("predicted_label"), vec![1]),
        (Condition::boolean(false).on("predicted_label"), vec![2]),
    ];

    for (condition, expected) in cases {
        let view = table(&["household_size"])
            .with_parameter(Parameter::filter("under_test", condition.clone()));
        let found = rows(&engine, &view, Pagination::all());
        let sizes: Vec<i64> = column(&found, "household_size")
            .iter()
            .filter_map(Value::as_i64)
            .collect();
        assert_eq!(sizes, expected, "{condition:?}");
    }
}
