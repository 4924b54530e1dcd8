use std::collections::HashMap;

use exam_core::model::Question;

use super::{SqliteRepository, mapping};
use crate::repository::{QuestionRecord, QuestionRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let record = QuestionRecord::from_question(question);
        let id = mapping::question_id_to_i64(record.id)?;

        let mut tx = self.pool().begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO questions (
                id, question_number, question_text,
                option_a, option_b, option_c, option_d, option_e, option_f,
                correct_answer, explanation, question_kind, image_url,
                simulation_instructions
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ON CONFLICT(id) DO UPDATE SET
                question_number = excluded.question_number,
                question_text = excluded.question_text,
                option_a = excluded.option_a,
                option_b = excluded.option_b,
                option_c = excluded.option_c,
                option_d = excluded.option_d,
                option_e = excluded.option_e,
                option_f = excluded.option_f,
                correct_answer = excluded.correct_answer,
                explanation = excluded.explanation,
                question_kind = excluded.question_kind,
                image_url = excluded.image_url,
                simulation_instructions = excluded.simulation_instructions
            ",
        )
        .bind(id)
        .bind(i64::from(record.number))
        .bind(&record.text)
        .bind(&record.option_a)
        .bind(&record.option_b)
        .bind(&record.option_c)
        .bind(&record.option_d)
        .bind(&record.option_e)
        .bind(&record.option_f)
        .bind(&record.correct_answer)
        .bind(&record.explanation)
        .bind(record.kind.as_str())
        .bind(&record.image_url)
        .bind(&record.simulation_instructions)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        sqlx::query("DELETE FROM simulation_assets WHERE question_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (position, url) in record.simulation_assets.iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("asset position overflow".into()))?;
            sqlx::query(
                r"
                INSERT INTO simulation_assets (question_id, position, url)
                VALUES (?1, ?2, ?3)
                ",
            )
            .bind(id)
            .bind(position)
            .bind(url)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let asset_rows = sqlx::query(
            r"
            SELECT question_id, url
            FROM simulation_assets
            ORDER BY question_id ASC, position ASC
            ",
        )
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut assets_by_question: HashMap<i64, Vec<String>> = HashMap::new();
        for row in asset_rows {
            use sqlx::Row;
            let question_id: i64 = row.try_get("question_id").map_err(conn)?;
            let url: String = row.try_get("url").map_err(conn)?;
            assets_by_question.entry(question_id).or_default().push(url);
        }

        let rows = sqlx::query(
            r"
            SELECT
                id, question_number, question_text,
                option_a, option_b, option_c, option_d, option_e, option_f,
                correct_answer, explanation, question_kind, image_url,
                simulation_instructions
            FROM questions
            ORDER BY question_number ASC
            ",
        )
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            use sqlx::Row;
            let id: i64 = row.try_get("id").map_err(conn)?;
            let assets = assets_by_question.remove(&id).unwrap_or_default();
            questions.push(mapping::map_question_row(&row, assets)?);
        }

        Ok(questions)
    }

    async fn count_questions(&self) -> Result<u32, StorageError> {
        use sqlx::Row;
        let row = sqlx::query("SELECT COUNT(*) AS n FROM questions")
            .fetch_one(self.pool())
            .await
            .map_err(conn)?;
        let n: i64 = row.try_get("n").map_err(conn)?;
        u32::try_from(n).map_err(|_| StorageError::Serialization("question count overflow".into()))
    }
}
