use study_core::model::{BankId, Question, QuestionId, ValidatedQuestion};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    conn, count_from_i64, encode_list, id_to_i64, map_question_row, map_write_error,
    question_id_from_i64, ser,
};
use crate::repository::{PageRequest, QuestionPage, QuestionRepository, StorageError};

const QUESTION_COLUMNS: &str = "id, bank_id, question_text, options, answers, created_at";

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_new_question(
        &self,
        question: ValidatedQuestion,
    ) -> Result<Question, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO questions (bank_id, question_text, options, answers, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(id_to_i64("bank_id", question.bank_id.value())?)
        .bind(&question.question_text)
        .bind(encode_list(&question.options)?)
        .bind(encode_list(&question.answers)?)
        .bind(question.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(question.assign_id(question_id_from_i64(res.last_insert_rowid())?))
    }

    async fn update_question(&self, question: &Question) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE questions
            SET question_text = ?1, options = ?2, answers = ?3
            WHERE id = ?4 AND bank_id = ?5
            ",
        )
        .bind(question.question_text())
        .bind(encode_list(question.options())?)
        .bind(encode_list(question.answers())?)
        .bind(id_to_i64("question_id", question.id().value())?)
        .bind(id_to_i64("bank_id", question.bank_id().value())?)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_to_i64("question_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_question_row).transpose()
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM questions WHERE id = ?1")
            .bind(id_to_i64("question_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_questions(
        &self,
        bank_id: BankId,
        page: PageRequest,
    ) -> Result<QuestionPage, StorageError> {
        let total_count = self.count_questions(bank_id).await?;

        let sql = format!(
            r"
            SELECT {QUESTION_COLUMNS}
            FROM questions
            WHERE bank_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "
        );
        let rows = sqlx::query(&sql)
            .bind(id_to_i64("bank_id", bank_id.value())?)
            .bind(i64::from(page.page_size()))
            .bind(id_to_i64("offset", page.offset())?)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(map_question_row(&row)?);
        }
        Ok(QuestionPage {
            items,
            total_count,
            page: page.page(),
            page_size: page.page_size(),
        })
    }

    async fn count_questions(&self, bank_id: BankId) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM questions WHERE bank_id = ?1")
            .bind(id_to_i64("bank_id", bank_id.value())?)
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;

        count_from_i64(row.try_get::<i64, _>("n").map_err(ser)?)
    }

    async fn all_questions(&self, bank_id: BankId) -> Result<Vec<Question>, StorageError> {
        let sql = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE bank_id = ?1 ORDER BY id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(id_to_i64("bank_id", bank_id.value())?)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_question_row(&row)?);
        }
        Ok(out)
    }
}
