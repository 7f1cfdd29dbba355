use crate::domain::model::MeritList;
use crate::domain::ports::Storage;
use crate::utils::error::{RankingError, Result};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub const VALUES: [&'static str; 2] = ["csv", "json"];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(RankingError::InvalidConfigValueError {
                field: "output.formats".to_string(),
                value: other.to_string(),
                reason: format!("Allowed values: {}", Self::VALUES.join(", ")),
            }),
        }
    }
}

/// One row per student; subject columns are the union across the list.
pub fn to_csv(list: &MeritList) -> Result<String> {
    let columns = list.subject_columns();
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![
        "position".to_string(),
        "suffix".to_string(),
        "student_id".to_string(),
        "name".to_string(),
        "class".to_string(),
    ];
    header.extend(columns.iter().cloned());
    header.push("grand_total".to_string());
    writer.write_record(&header)?;

    for row in &list.rows {
        let mut record = vec![
            row.position.to_string(),
            row.position_suffix.clone(),
            row.score.student_id.to_string(),
            row.score.name.clone(),
            row.score.class_name.clone(),
        ];
        for column in &columns {
            record.push(
                row.score
                    .subject_scores
                    .get(column)
                    .map(|marks| marks.to_string())
                    .unwrap_or_default(),
            );
        }
        record.push(row.score.grand_total.to_string());
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RankingError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn to_json(list: &MeritList) -> Result<String> {
    Ok(serde_json::to_string_pretty(list)?)
}

/// `merit_list_class-7_term-1_2024-2025`
pub fn file_stem(list: &MeritList) -> String {
    let year: String = list
        .scope
        .academic_year
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!(
        "merit_list_class-{}_term-{}_{}",
        list.scope.class_id, list.scope.term, year
    )
}

/// Writes one file per format; returns the written file names.
pub async fn save_exports<S: Storage>(
    storage: &S,
    list: &MeritList,
    formats: &[ExportFormat],
) -> Result<Vec<String>> {
    let stem = file_stem(list);
    let mut written = Vec::with_capacity(formats.len());

    for format in formats {
        let body = match format {
            ExportFormat::Csv => to_csv(list)?,
            ExportFormat::Json => to_json(list)?,
        };
        let name = format!("{}.{}", stem, format.extension());
        tracing::debug!("Writing {} ({} bytes)", name, body.len());
        storage.write_file(&name, body.as_bytes()).await?;
        written.push(name);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AggregatedStudentScore, EntityId, MeritRow, RankingScope};
    use chrono::Utc;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn row(position: usize, id: i64, name: &str, subjects: &[(&str, f64)]) -> MeritRow {
        let subject_scores: BTreeMap<String, f64> = subjects
            .iter()
            .map(|(s, m)| (s.to_string(), *m))
            .collect();
        let grand_total: f64 = subject_scores.values().sum();
        MeritRow {
            score: AggregatedStudentScore {
                student_id: EntityId::from(id),
                name: name.to_string(),
                class_name: "SS 2".to_string(),
                subject_scores,
                grand_total,
            },
            position,
            position_suffix: crate::core::ranker::ordinal_suffix(
                position,
                Default::default(),
            ),
        }
    }

    fn list() -> MeritList {
        MeritList {
            scope: RankingScope {
                class_id: EntityId::from(7),
                term: 1,
                academic_year: "2024/2025".to_string(),
            },
            generated_at: Utc::now(),
            rows: vec![
                row(1, 3, "Ngozi", &[("Mathematics", 90.0), ("English", 70.5)]),
                row(2, 1, "Tunde", &[("Mathematics", 80.0), ("Biology", 55.0)]),
            ],
        }
    }

    #[test]
    fn test_csv_uses_union_of_subject_columns() {
        let csv = to_csv(&list()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "position,suffix,student_id,name,class,Biology,English,Mathematics,grand_total"
        );
        assert_eq!(lines[1], "1,1st,3,Ngozi,SS 2,,70.5,90,160.5");
        assert_eq!(lines[2], "2,2nd,1,Tunde,SS 2,55,,80,135");
    }

    #[test]
    fn test_json_flattens_scores() {
        let json: serde_json::Value = serde_json::from_str(&to_json(&list()).unwrap()).unwrap();
        let first = &json["rows"][0];

        assert_eq!(first["position"], 1);
        assert_eq!(first["position_suffix"], "1st");
        assert_eq!(first["name"], "Ngozi");
        assert_eq!(first["grand_total"], 160.5);
    }

    #[tokio::test]
    async fn test_save_exports_writes_each_format() {
        let storage = MockStorage::default();

        let written = save_exports(&storage, &list(), &[ExportFormat::Csv, ExportFormat::Json])
            .await
            .unwrap();

        assert_eq!(
            written,
            vec![
                "merit_list_class-7_term-1_2024-2025.csv".to_string(),
                "merit_list_class-7_term-1_2024-2025.json".to_string(),
            ]
        );
        assert_eq!(storage.files.lock().await.len(), 2);
    }
}
