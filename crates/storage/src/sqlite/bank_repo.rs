use study_core::model::{Bank, BankId, ValidatedBank};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{bank_id_from_i64, conn, count_from_i64, id_to_i64, map_bank_row, ser};
use crate::repository::{BankRepository, BankSummary, StorageError};

#[async_trait::async_trait]
impl BankRepository for SqliteRepository {
    async fn insert_new_bank(&self, bank: ValidatedBank) -> Result<Bank, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO banks (title, created_at)
            VALUES (?1, ?2)
            ",
        )
        .bind(&bank.title)
        .bind(bank.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(bank.assign_id(bank_id_from_i64(res.last_insert_rowid())?))
    }

    async fn update_bank(&self, bank: &Bank) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE banks SET title = ?1 WHERE id = ?2")
            .bind(bank.title())
            .bind(id_to_i64("bank_id", bank.id().value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_bank(&self, id: BankId) -> Result<Option<Bank>, StorageError> {
        let row = sqlx::query("SELECT id, title, created_at FROM banks WHERE id = ?1")
            .bind(id_to_i64("bank_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_bank_row).transpose()
    }

    async fn list_banks(&self) -> Result<Vec<BankSummary>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT b.id, b.title, b.created_at, COUNT(q.id) AS question_count
            FROM banks b
            LEFT JOIN questions q ON q.bank_id = b.id
            GROUP BY b.id
            ORDER BY b.created_at DESC, b.id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(BankSummary {
                bank: map_bank_row(&row)?,
                question_count: count_from_i64(
                    row.try_get::<i64, _>("question_count").map_err(ser)?,
                )?,
            });
        }
        Ok(out)
    }

    async fn delete_bank(&self, id: BankId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM banks WHERE id = ?1")
            .bind(id_to_i64("bank_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
