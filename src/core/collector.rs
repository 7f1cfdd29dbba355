use crate::core::context::Roster;
use crate::domain::model::{EntityId, RawEntry, ResultEntry};
use crate::domain::ports::EntrySource;
use crate::utils::error::{RankingError, Result};
use serde_json::Value;

/// Normalizes a reference field to an id.
///
/// Accepts a scalar id (`7`), a nested object (`{"id": 7, "name": ...}`) or a
/// bare string (`"7"`). Anything else has no id.
pub fn extract_ref_id(value: &Value) -> Option<EntityId> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(EntityId::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(EntityId::new(u.to_string()))
            } else {
                let f = n.as_f64()?;
                // 7.0 and 7 refer to the same row
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some(EntityId::from(f as i64))
                } else {
                    Some(EntityId::new(n.to_string()))
                }
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| EntityId::from(trimmed))
        }
        Value::Object(obj) => obj.get("id").and_then(extract_ref_id),
        _ => None,
    }
}

pub fn extract_marks(value: &Value) -> Option<f64> {
    let marks = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    marks.is_finite().then_some(marks)
}

pub fn normalize_entry(raw: &RawEntry) -> Option<ResultEntry> {
    let student_id = extract_ref_id(&raw.student_ref)?;
    let subject_id = extract_ref_id(&raw.subject_ref)?;
    let marks_obtained = extract_marks(&raw.marks_obtained)?;

    Some(ResultEntry {
        student_id,
        subject_id,
        term_report_id: extract_ref_id(&raw.term_report_ref),
        marks_obtained,
    })
}

/// Normalizes raw entries and keeps those whose student is on the roster.
pub fn filter_to_roster(raw_entries: &[RawEntry], roster: &Roster) -> Vec<ResultEntry> {
    let mut kept = Vec::with_capacity(raw_entries.len());
    let mut malformed = 0usize;
    let mut outside = 0usize;

    for raw in raw_entries {
        match normalize_entry(raw) {
            Some(entry) if roster.contains(&entry.student_id) => kept.push(entry),
            Some(_) => outside += 1,
            None => {
                malformed += 1;
                tracing::debug!("Skipping entry without usable references or marks: {:?}", raw);
            }
        }
    }

    if malformed > 0 {
        tracing::warn!("⚠️ Dropped {} malformed result entries", malformed);
    }
    tracing::debug!(
        "Kept {} entries, {} belong to students outside the roster",
        kept.len(),
        outside
    );

    kept
}

/// Fetches entries for all term reports in one call and filters to the roster.
pub async fn collect_entries(
    source: &dyn EntrySource,
    term_report_ids: &[EntityId],
    roster: &Roster,
) -> Result<Vec<ResultEntry>> {
    let raw_entries = source.entries(term_report_ids).await?;
    tracing::info!(
        "📥 Fetched {} result entries for {} term reports",
        raw_entries.len(),
        term_report_ids.len()
    );

    let entries = filter_to_roster(&raw_entries, roster);
    if entries.is_empty() {
        return Err(RankingError::NoEntries {
            term_reports: term_report_ids.len(),
            roster_size: roster.len(),
        });
    }

    Ok(entries)
}
