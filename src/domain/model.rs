use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Backend identifier, normalized to its textual form.
///
/// The REST backend hands out integer primary keys for most resources, but
/// nothing in the engine depends on that, so ids are kept as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric view of the id, when it is one.
    pub fn as_number(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: EntityId,
    pub name: String,
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolClass {
    pub id: EntityId,
    pub name: String,
}

/// Per-term header that mark entries attach to. Not scoped by class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermReport {
    pub id: EntityId,
    pub term: u32,
    pub academic_year: String,
}

/// Entry exactly as the backend delivered it.
///
/// References may be a scalar id, a nested object carrying an `id`, or a bare
/// string; marks may be a number or a numeric string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(alias = "student", default)]
    pub student_ref: serde_json::Value,
    #[serde(alias = "subject", default)]
    pub subject_ref: serde_json::Value,
    #[serde(alias = "term_report", default)]
    pub term_report_ref: serde_json::Value,
    #[serde(default)]
    pub marks_obtained: serde_json::Value,
}

/// Normalized mark entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub student_id: EntityId,
    pub subject_id: EntityId,
    pub term_report_id: Option<EntityId>,
    pub marks_obtained: f64,
}

/// Scope selection as typed by the user; any field may still be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeSelection {
    pub class_id: Option<String>,
    pub term: Option<u32>,
    pub academic_year: Option<String>,
}

impl ScopeSelection {
    pub fn new(class_id: impl Into<String>, term: u32, academic_year: impl Into<String>) -> Self {
        Self {
            class_id: Some(class_id.into()),
            term: Some(term),
            academic_year: Some(academic_year.into()),
        }
    }
}

/// Fully resolved ranking scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankingScope {
    pub class_id: EntityId,
    pub term: u32,
    pub academic_year: String,
}

impl fmt::Display for RankingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "class {} / term {} / {}",
            self.class_id, self.term, self.academic_year
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStudentScore {
    pub student_id: EntityId,
    pub name: String,
    pub class_name: String,
    /// Subject display name -> summed marks.
    pub subject_scores: BTreeMap<String, f64>,
    pub grand_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeritRow {
    #[serde(flatten)]
    pub score: AggregatedStudentScore,
    pub position: usize,
    pub position_suffix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeritList {
    pub scope: RankingScope,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<MeritRow>,
}

impl MeritList {
    /// Sorted union of subject columns across all rows.
    pub fn subject_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .rows
            .iter()
            .flat_map(|row| row.score.subject_scores.keys().cloned())
            .collect();
        columns.sort();
        columns.dedup();
        columns
    }
}

/// (term, academic year) pair for which at least one term report exists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermPeriod {
    pub academic_year: String,
    pub term: u32,
}

/// Values used to populate scope selection controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionCatalog {
    pub classes: Vec<SchoolClass>,
    pub subjects: Vec<Subject>,
    pub periods: Vec<TermPeriod>,
}
