//! Batch streaming over detail rows.

#[path = "../common/mod.rs"]
mod common;

use common::{building, insert_all, seed_buildings, store, RESULT_ID};
use soma_bi::cursor::BatchRequest;
use soma_bi::error::{EngineError, ValidationError};
use soma_bi::model::{Condition, ConditionType, Operation, Unit};
use soma_bi::store::Row;
use soma_bi::QueryEngine;

fn ids(batch: &[Row]) -> Vec<i64> {
    batch.iter().filter_map(Row::id).collect()
}

#[test]
fn test_exact_multiple_needs_one_empty_fetch() {
    let store = store();
    let inserted = seed_buildings(&store, 6);
    let engine = QueryEngine::new(&store);

    let mut cursor = engine.stream(BatchRequest::new(RESULT_ID, Unit::Building, 3));
    let batches: Vec<Vec<Row>> = cursor.by_ref().map(Result::unwrap).collect();

    assert_eq!(batches.len(), 2);
    assert_eq!(ids(&batches[0]), inserted[..3]);
    assert_eq!(ids(&batches[1]), inserted[3..]);
    assert_eq!(cursor.batches_fetched(), 3);
    assert_eq!(cursor.position(), inserted.last().copied());
}

#[test]
fn test_short_batch_ends_stream() {
    let store = store();
    let inserted = seed_buildings(&store, 5);
    let engine = QueryEngine::new(&store);

    let mut cursor = engine.stream(BatchRequest::new(RESULT_ID, Unit::Building, 3));
    let sizes: Vec<usize> = cursor.by_ref().map(|b| b.unwrap().len()).collect();
    assert_eq!(sizes, vec![3, 2]);
    assert_eq!(cursor.batches_fetched(), 2);
    assert_eq!(cursor.position(), inserted.last().copied());
    assert!(cursor.next().is_none());
}

#[test]
fn test_empty_scope() {
    let store = store();
    let engine = QueryEngine::new(&store);

    let mut cursor = engine.stream(BatchRequest::new(RESULT_ID, Unit::Area, 10));
    assert!(cursor.next().is_none());
    assert_eq!(cursor.batches_fetched(), 1);
    assert_eq!(cursor.position(), None);
}

#[test]
fn test_resume_continues_after_watermark() {
    let store = store();
    let inserted = seed_buildings(&store, 4);
    let engine = QueryEngine::new(&store);

    let mut cursor = engine.stream(BatchRequest::new(RESULT_ID, Unit::Building, 2));
    let first = cursor.next().unwrap().unwrap();
    assert_eq!(ids(&first), inserted[..2]);

    let request = cursor.resume();
    assert_eq!(request.cursor, Some(inserted[1]));

    let rest = engine.next_batch(&request).unwrap();
    assert_eq!(ids(&rest), inserted[2..]);
}

#[test]
fn test_batches_respect_scope() {
    let store = store();
    insert_all(
        &store,
        Unit::Building,
        [
            building("北区", "2024-04-01").with("household_size", 1),
            building("南区", "2024-04-01").with("household_size", 2),
            building("北区", "2023-04-01").with("household_size", 3),
            building("北区", "2024-04-01").with("household_size", 4),
        ],
    );
    let engine = QueryEngine::new(&store);

    let request = BatchRequest::new(RESULT_ID, Unit::Building, 10)
        .with_reference_date("2024-04-01")
        .with_areas(["北区"])
        .with_filter(
            Condition::compare(ConditionType::Integer, Operation::Gt, 1).on("household_size"),
        );
    let batches: Vec<_> = engine.stream(request).map(Result::unwrap).collect();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
    assert_eq!(
        batches[0][0].get("household_size"),
        Some(&soma_bi::value::Value::Integer(4))
    );
}

#[test]
fn test_invalid_requests() {
    let store = store();
    let engine = QueryEngine::new(&store);

    let mut cursor = engine.stream(BatchRequest::new(RESULT_ID, Unit::Building, 0));
    assert!(matches!(
        cursor.next(),
        Some(Err(EngineError::Validation(ValidationError::InvalidBatchSize)))
    ));
    assert!(cursor.next().is_none());

    let err = engine
        .next_batch(&BatchRequest::new(0, Unit::Building, 10))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::MissingDatasetResultId)
    ));
}

#[test]
fn test_request_json_shape() {
    let request: BatchRequest = serde_json::from_str(
        r#"{"dataSetResultId": 3, "unit": "area", "areas": ["北区"], "cursor": 40, "batchSize": 500}"#,
    )
    .unwrap();
    assert_eq!(request.dataset_result_id, 3);
    assert_eq!(request.cursor, Some(40));
    assert_eq!(request.batch_size, 500);
    assert!(request.reference_date.is_none());
}
