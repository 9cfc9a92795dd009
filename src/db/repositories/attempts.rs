use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{
        from_json, parse_datetime, parse_label, to_i64, to_json, to_optional_u32, to_u64,
    },
};
use crate::models::AttemptRecord;
use crate::sink::AttemptSink;

const ATTEMPT_COLUMNS: &str = "id, device_id, learner_group, target_band, result_band, confidence,
     total_duration_secs, started_at, completed_at,
     orf_total_words, orf_words_correct, orf_errors_total, orf_accuracy_pct, orf_wcpm,
     orf_self_corrections, orf_error_rate, error_marks,
     word_responses, pseudoword_responses,
     comprehension_correct, comprehension_total, comprehension_responses,
     domain_scores, strengths, needs, suggested_focus,
     placement_level, placement_confidence, placement_score, plan";

fn row_to_attempt(row: &Row) -> Result<AttemptRecord> {
    let learner_group: String = row.get("learner_group")?;
    let target_band: String = row.get("target_band")?;
    let result_band: Option<String> = row.get("result_band")?;
    let confidence: String = row.get("confidence")?;
    let total_duration_secs: i64 = row.get("total_duration_secs")?;
    let started_at: String = row.get("started_at")?;
    let completed_at: String = row.get("completed_at")?;
    let placement_level: String = row.get("placement_level")?;
    let placement_confidence: String = row.get("placement_confidence")?;

    let optional_u32 = |column: &str| -> Result<Option<u32>> {
        to_optional_u32(row.get::<_, Option<i64>>(column)?, column)
    };
    let json_column = |column: &str| -> Result<String> { Ok(row.get::<_, String>(column)?) };

    Ok(AttemptRecord {
        id: row.get("id")?,
        device_id: row.get("device_id")?,
        learner_group: parse_label(&learner_group, "learner_group")?,
        target_band: parse_label(&target_band, "target_band")?,
        result_band: result_band
            .map(|band| parse_label(&band, "result_band"))
            .transpose()?,
        confidence: parse_label(&confidence, "confidence")?,
        total_duration_secs: to_u64(total_duration_secs, "total_duration_secs")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        completed_at: parse_datetime(&completed_at, "completed_at")?,

        orf_total_words: optional_u32("orf_total_words")?,
        orf_words_correct: optional_u32("orf_words_correct")?,
        orf_errors_total: optional_u32("orf_errors_total")?,
        orf_accuracy_pct: optional_u32("orf_accuracy_pct")?,
        orf_wcpm: optional_u32("orf_wcpm")?,
        orf_self_corrections: optional_u32("orf_self_corrections")?,
        orf_error_rate: optional_u32("orf_error_rate")?,
        error_marks: from_json(&json_column("error_marks")?, "error_marks")?,

        word_responses: from_json(&json_column("word_responses")?, "word_responses")?,
        pseudoword_responses: from_json(
            &json_column("pseudoword_responses")?,
            "pseudoword_responses",
        )?,

        comprehension_correct: optional_u32("comprehension_correct")?,
        comprehension_total: optional_u32("comprehension_total")?,
        comprehension_responses: from_json(
            &json_column("comprehension_responses")?,
            "comprehension_responses",
        )?,

        domain_scores: from_json(&json_column("domain_scores")?, "domain_scores")?,
        strengths: from_json(&json_column("strengths")?, "strengths")?,
        needs: from_json(&json_column("needs")?, "needs")?,
        suggested_focus: from_json(&json_column("suggested_focus")?, "suggested_focus")?,

        placement_level: parse_label(&placement_level, "placement_level")?,
        placement_confidence: parse_label(&placement_confidence, "placement_confidence")?,
        placement_score: optional_u32("placement_score")?,
        plan: from_json(&json_column("plan")?, "plan")?,
    })
}

impl Database {
    pub async fn insert_attempt(&self, attempt: &AttemptRecord) -> Result<()> {
        let record = attempt.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO attempts (
                    id, device_id, learner_group, target_band, result_band, confidence,
                    total_duration_secs, started_at, completed_at,
                    orf_total_words, orf_words_correct, orf_errors_total, orf_accuracy_pct,
                    orf_wcpm, orf_self_corrections, orf_error_rate, error_marks,
                    word_responses, pseudoword_responses,
                    comprehension_correct, comprehension_total, comprehension_responses,
                    domain_scores, strengths, needs, suggested_focus,
                    placement_level, placement_confidence, placement_score, plan, created_at
                 ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                    ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31
                 )",
                params![
                    record.id,
                    record.device_id,
                    record.learner_group.as_str(),
                    record.target_band.as_str(),
                    record.result_band.map(|band| band.as_str()),
                    record.confidence.as_str(),
                    to_i64(record.total_duration_secs)?,
                    record.started_at.to_rfc3339(),
                    record.completed_at.to_rfc3339(),
                    record.orf_total_words,
                    record.orf_words_correct,
                    record.orf_errors_total,
                    record.orf_accuracy_pct,
                    record.orf_wcpm,
                    record.orf_self_corrections,
                    record.orf_error_rate,
                    to_json(&record.error_marks, "error_marks")?,
                    to_json(&record.word_responses, "word_responses")?,
                    to_json(&record.pseudoword_responses, "pseudoword_responses")?,
                    record.comprehension_correct,
                    record.comprehension_total,
                    to_json(&record.comprehension_responses, "comprehension_responses")?,
                    to_json(&record.domain_scores, "domain_scores")?,
                    to_json(&record.strengths, "strengths")?,
                    to_json(&record.needs, "needs")?,
                    to_json(&record.suggested_focus, "suggested_focus")?,
                    record.placement_level.as_str(),
                    record.placement_confidence.as_str(),
                    record.placement_score,
                    to_json(&record.plan, "plan")?,
                    Utc::now().to_rfc3339(),
                ],
            )
            .with_context(|| format!("failed to insert attempt {}", record.id))?;
            Ok(())
        })
        .await
    }

    pub async fn get_attempt(&self, attempt_id: &str) -> Result<Option<AttemptRecord>> {
        let attempt_id = attempt_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE id = ?1"
            ))?;

            stmt.query_row(params![attempt_id], |row| Ok(row_to_attempt(row)))
                .optional()?
                .transpose()
        })
        .await
    }

    /// Most recently completed attempts first.
    pub async fn list_recent_attempts(&self, limit: usize) -> Result<Vec<AttemptRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ATTEMPT_COLUMNS} FROM attempts
                 ORDER BY completed_at DESC
                 LIMIT ?1"
            ))?;

            let mut rows = stmt.query(params![limit])?;
            let mut attempts = Vec::new();
            while let Some(row) = rows.next()? {
                attempts.push(row_to_attempt(row)?);
            }
            Ok(attempts)
        })
        .await
    }
}

#[async_trait]
impl AttemptSink for Database {
    async fn record(&self, attempt: &AttemptRecord) -> Result<()> {
        self.insert_attempt(attempt).await
    }
}
