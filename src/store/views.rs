//! Saved views.
//!
//! Parameters are stored as one JSON array per view, in list order.

use rusqlite::{params, OptionalExtension};

use super::{SqliteStore, StoreResult};
use crate::model::parameter::Parameter;
use crate::model::view::View;

/// CRUD over the `result_views` table.
pub struct ViewRepository<'a> {
    store: &'a SqliteStore,
}

impl<'a> ViewRepository<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Save a new view and return its id. `view.id` is ignored.
    pub fn insert(&self, view: &View) -> StoreResult<i64> {
        let parameters = serde_json::to_string(&view.parameters)?;
        let conn = self.store.conn();
        conn.execute(
            "INSERT INTO result_views (data_set_result_id, style, unit, title, parameters)
             VALUES (?, ?, ?, ?, ?)",
            params![
                view.dataset_result_id,
                view.style.as_str(),
                view.unit.as_str(),
                view.title,
                parameters
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get(&self, id: i64) -> StoreResult<Option<View>> {
        let row: Option<(i64, String, String, String, String)> = self
            .store
            .conn()
            .query_row(
                "SELECT data_set_result_id, style, unit, title, parameters
                 FROM result_views WHERE id = ?",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .optional()?;

        let Some((dataset_result_id, style, unit, title, parameters)) = row else {
            return Ok(None);
        };
        let parameters: Vec<Parameter> = serde_json::from_str(&parameters)?;
        Ok(Some(View {
            id: Some(id),
            dataset_result_id,
            style: serde_json::from_value(style.into())?,
            unit: serde_json::from_value(unit.into())?,
            title,
            parameters,
        }))
    }

    /// Replace view `id`. Returns false if it does not exist.
    pub fn update(&self, id: i64, view: &View) -> StoreResult<bool> {
        let parameters = serde_json::to_string(&view.parameters)?;
        let rows = self.store.conn().execute(
            "UPDATE result_views
             SET data_set_result_id = ?, style = ?, unit = ?, title = ?, parameters = ?
             WHERE id = ?",
            params![
                view.dataset_result_id,
                view.style.as_str(),
                view.unit.as_str(),
                view.title,
                parameters,
                id
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn delete(&self, id: i64) -> StoreResult<bool> {
        let rows = self
            .store
            .conn()
            .execute("DELETE FROM result_views WHERE id = ?", params![id])?;
        Ok(rows > 0)
    }
}
