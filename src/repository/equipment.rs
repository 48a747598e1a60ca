//! Equipment repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::equipment::{Equipment, EquipmentDraft},
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Sqlite>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List all equipment in insertion order
    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Equipment> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Create equipment, initially available
    pub async fn create(&self, draft: &EquipmentDraft) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (item_name, category, qty, status, borrower_name, borrowed_at)
            VALUES (?, ?, ?, 'available', '', NULL)
            RETURNING *
            "#,
        )
        .bind(&draft.item_name)
        .bind(draft.category)
        .bind(draft.qty)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Replace name, category and quantity; lending fields are left alone
    pub async fn update(&self, id: i64, draft: &EquipmentDraft) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment SET item_name = ?, category = ?, qty = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&draft.item_name)
        .bind(draft.category)
        .bind(draft.qty)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Delete equipment
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Move an available item to borrowed.
    ///
    /// The status guard is part of the UPDATE, so of two racing borrowers only
    /// one matches a row. Returns `None` when the item is missing or not available.
    pub async fn mark_borrowed(
        &self,
        id: i64,
        borrower_name: &str,
        borrowed_at: DateTime<Utc>,
    ) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment SET status = 'borrowed', borrower_name = ?, borrowed_at = ?
            WHERE id = ? AND status = 'available'
            RETURNING *
            "#,
        )
        .bind(borrower_name)
        .bind(borrowed_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Move a borrowed item back to available.
    ///
    /// Returns `None` when the item is missing or not borrowed.
    pub async fn mark_returned(&self, id: i64) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment SET status = 'available', borrower_name = '', borrowed_at = NULL
            WHERE id = ? AND status = 'borrowed'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Equipment {} not found", id))
}
