//! Forward-only batch iteration over detail rows.
//!
//! Each batch selects rows with `id` above the caller's watermark in
//! ascending `id` order. A batch shorter than the batch size is the last one;
//! an empty first batch means there is no data. Batches are not isolated from
//! concurrent writes.

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::engine::QueryEngine;
use crate::error::{EngineResult, ValidationError};
use crate::model::column::Unit;
use crate::model::condition::Condition;
use crate::planner::{id_order, Pagination, Scope, Selection};
use crate::store::{Row, StoreError, TabularStore};

/// One batch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[serde(rename = "dataSetResultId", alias = "datasetResultId")]
    pub dataset_result_id: i64,
    pub unit: Unit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<String>,
    #[serde(default)]
    pub areas: Vec<String>,
    #[serde(default)]
    pub filters: Vec<Condition>,
    /// Largest id already returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<i64>,
    pub batch_size: u64,
}

impl BatchRequest {
    pub fn new(dataset_result_id: i64, unit: Unit, batch_size: u64) -> Self {
        Self {
            dataset_result_id,
            unit,
            reference_date: None,
            areas: Vec::new(),
            filters: Vec::new(),
            cursor: None,
            batch_size,
        }
    }

    pub fn with_reference_date(mut self, date: &str) -> Self {
        self.reference_date = Some(date.into());
        self
    }

    pub fn with_areas<'a>(mut self, areas: impl IntoIterator<Item = &'a str>) -> Self {
        self.areas = areas.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filter(mut self, condition: Condition) -> Self {
        self.filters.push(condition);
        self
    }

    /// Continue after `cursor`.
    pub fn after(mut self, cursor: i64) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Selection for the next batch.
    pub fn selection(&self) -> Result<Selection, ValidationError> {
        if self.dataset_result_id <= 0 {
            return Err(ValidationError::MissingDatasetResultId);
        }
        if self.batch_size == 0 {
            return Err(ValidationError::InvalidBatchSize);
        }
        let predicate = Scope::new(self.unit, self.dataset_result_id)
            .reference_date(self.reference_date.as_deref())
            .areas(&self.areas)
            .filters(&self.filters)
            .after(self.cursor)
            .into_predicate();
        Ok(Selection {
            columns: Vec::new(),
            predicate,
            order_by: vec![id_order()],
            page: Pagination {
                limit: Some(self.batch_size),
                offset: None,
            },
        })
    }
}

/// Drives [`BatchRequest`]s to the end of a stream.
///
/// Yields non-empty batches. Iteration ends after a short batch, an empty
/// batch or an error; after an error [`BatchCursor::position`] still holds
/// the last successful watermark.
pub struct BatchCursor<'e, S> {
    engine: &'e QueryEngine<S>,
    request: BatchRequest,
    batches_fetched: usize,
    done: bool,
}

impl<'e, S: TabularStore> BatchCursor<'e, S> {
    pub(crate) fn new(engine: &'e QueryEngine<S>, request: BatchRequest) -> Self {
        Self {
            engine,
            request,
            batches_fetched: 0,
            done: false,
        }
    }

    /// Largest id yielded so far.
    pub fn position(&self) -> Option<i64> {
        self.request.cursor
    }

    /// Round trips to the store, including the final empty one.
    pub fn batches_fetched(&self) -> usize {
        self.batches_fetched
    }

    /// The request that continues where this cursor stopped.
    pub fn resume(self) -> BatchRequest {
        self.request
    }
}

impl<S: TabularStore> Iterator for BatchCursor<'_, S> {
    type Item = EngineResult<Vec<Row>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.batches_fetched += 1;

        let rows = match self.engine.next_batch(&self.request) {
            Ok(rows) => rows,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        if rows.is_empty() {
            self.done = true;
            return None;
        }
        let Some(last) = rows.last().and_then(Row::id) else {
            self.done = true;
            return Some(Err(StoreError::MissingCursorColumn.into()));
        };

        self.request.cursor = Some(last);
        if (rows.len() as u64) < self.request.batch_size {
            self.done = true;
        }
        tracing::debug!(cursor = last, rows = rows.len(), "fetched batch");
        Some(Ok(rows))
    }
}

impl<S: TabularStore> FusedIterator for BatchCursor<'_, S> {}
