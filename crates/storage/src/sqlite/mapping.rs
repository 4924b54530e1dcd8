use exam_core::model::{Question, QuestionId, QuestionKind};
use sqlx::Row;

use crate::repository::{QuestionRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("question_id overflow".into()))
}

pub(crate) fn parse_question_kind(s: &str) -> Result<QuestionKind, StorageError> {
    s.parse::<QuestionKind>().map_err(ser)
}

pub(crate) fn map_question_row(
    row: &sqlx::sqlite::SqliteRow,
    simulation_assets: Vec<String>,
) -> Result<Question, StorageError> {
    let number_i64: i64 = row.try_get("question_number").map_err(ser)?;
    let number = u32::try_from(number_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid question_number: {number_i64}")))?;

    let kind_str: String = row.try_get("question_kind").map_err(ser)?;
    let kind = parse_question_kind(kind_str.as_str())?;

    let record = QuestionRecord {
        id: question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        number,
        text: row.try_get("question_text").map_err(ser)?,
        option_a: row.try_get("option_a").map_err(ser)?,
        option_b: row.try_get("option_b").map_err(ser)?,
        option_c: row.try_get("option_c").map_err(ser)?,
        option_d: row.try_get("option_d").map_err(ser)?,
        option_e: row.try_get("option_e").map_err(ser)?,
        option_f: row.try_get("option_f").map_err(ser)?,
        correct_answer: row.try_get("correct_answer").map_err(ser)?,
        explanation: row.try_get("explanation").map_err(ser)?,
        kind,
        image_url: row.try_get("image_url").map_err(ser)?,
        simulation_instructions: row.try_get("simulation_instructions").map_err(ser)?,
        simulation_assets,
    };

    record.into_question()
}
