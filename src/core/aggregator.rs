use crate::core::context::Roster;
use crate::domain::model::{AggregatedStudentScore, EntityId, ResultEntry, Student, Subject};
use crate::utils::error::{RankingError, Result};
use std::collections::{BTreeMap, HashMap};

/// Subject id -> display name.
#[derive(Debug, Clone, Default)]
pub struct SubjectLookup {
    names: HashMap<EntityId, String>,
}

impl SubjectLookup {
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self {
            names: subjects.into_iter().map(|s| (s.id, s.name)).collect(),
        }
    }

    /// Display name, or `Subject {id}` when the subject record is gone.
    pub fn label(&self, subject_id: &EntityId) -> String {
        self.names
            .get(subject_id)
            .cloned()
            .unwrap_or_else(|| format!("Subject {}", subject_id))
    }
}

struct Accumulator<'a> {
    student: &'a Student,
    subject_scores: BTreeMap<String, f64>,
}

/// Sums marks per student and subject.
///
/// Output order follows each student's first appearance in `entries`.
/// Entries for students missing from the roster are skipped.
pub fn aggregate_scores(
    entries: &[ResultEntry],
    roster: &Roster,
    subjects: &SubjectLookup,
    class_label: &str,
) -> Result<Vec<AggregatedStudentScore>> {
    let students: HashMap<&EntityId, &Student> =
        roster.students.iter().map(|s| (&s.id, s)).collect();

    let mut order: Vec<EntityId> = Vec::new();
    let mut totals: HashMap<EntityId, Accumulator> = HashMap::new();
    let mut unresolved = 0usize;

    for entry in entries {
        let Some(&student) = students.get(&entry.student_id) else {
            unresolved += 1;
            continue;
        };

        let acc = totals.entry(entry.student_id.clone()).or_insert_with(|| {
            order.push(entry.student_id.clone());
            Accumulator {
                student,
                subject_scores: BTreeMap::new(),
            }
        });

        *acc
            .subject_scores
            .entry(subjects.label(&entry.subject_id))
            .or_insert(0.0) += entry.marks_obtained;
    }

    if unresolved > 0 {
        tracing::debug!("Skipped {} entries with no matching roster student", unresolved);
    }

    let scores: Vec<AggregatedStudentScore> = order
        .iter()
        .filter_map(|id| totals.remove(id))
        .map(|acc| {
            let grand_total: f64 = acc.subject_scores.values().sum();
            AggregatedStudentScore {
                student_id: acc.student.id.clone(),
                name: acc.student.name.clone(),
                class_name: acc
                    .student
                    .class_name
                    .clone()
                    .unwrap_or_else(|| class_label.to_string()),
                subject_scores: acc.subject_scores,
                grand_total,
            }
        })
        .collect();

    if scores.is_empty() {
        return Err(RankingError::NoScoredStudents {
            entries: entries.len(),
        });
    }

    tracing::info!("🧮 Aggregated scores for {} students", scores.len());
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, name: &str) -> Student {
        Student {
            id: EntityId::from(id),
            name: name.to_string(),
            class_name: Some("JSS 1A".to_string()),
        }
    }

    fn entry(student: i64, subject: i64, marks: f64) -> ResultEntry {
        ResultEntry {
            student_id: EntityId::from(student),
            subject_id: EntityId::from(subject),
            term_report_id: None,
            marks_obtained: marks,
        }
    }

    fn subjects() -> SubjectLookup {
        SubjectLookup::new(vec![
            Subject {
                id: EntityId::from(1),
                name: "Mathematics".to_string(),
            },
            Subject {
                id: EntityId::from(2),
                name: "English".to_string(),
            },
        ])
    }

    #[test]
    fn test_entries_for_same_subject_are_summed() {
        let roster = Roster::new(vec![student(1, "Alice")]);
        let entries = vec![entry(1, 1, 30.0), entry(1, 1, 20.0)];

        let scores = aggregate_scores(&entries, &roster, &subjects(), "JSS 1A").unwrap();

        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].subject_scores["Mathematics"], 50.0);
        assert_eq!(scores[0].grand_total, 50.0);
    }

    #[test]
    fn test_missing_subject_falls_back_to_synthetic_label() {
        let roster = Roster::new(vec![student(1, "Alice")]);
        let entries = vec![entry(1, 1, 40.0), entry(1, 99, 15.0)];

        let scores = aggregate_scores(&entries, &roster, &subjects(), "JSS 1A").unwrap();

        assert_eq!(scores[0].subject_scores["Subject 99"], 15.0);
        assert_eq!(scores[0].grand_total, 55.0);
    }

    #[test]
    fn test_students_without_entries_are_excluded() {
        let roster = Roster::new(vec![student(1, "Alice"), student(2, "Bob")]);
        let entries = vec![entry(1, 2, 70.0)];

        let scores = aggregate_scores(&entries, &roster, &subjects(), "JSS 1A").unwrap();

        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].name, "Alice");
    }

    #[test]
    fn test_class_label_used_when_student_has_none() {
        let mut alice = student(1, "Alice");
        alice.class_name = None;
        let roster = Roster::new(vec![alice]);

        let scores =
            aggregate_scores(&[entry(1, 1, 10.0)], &roster, &subjects(), "Class 4").unwrap();
        assert_eq!(scores[0].class_name, "Class 4");
    }

    #[test]
    fn test_no_resolvable_students_is_an_error() {
        let roster = Roster::new(vec![student(1, "Alice")]);
        let entries = vec![entry(5, 1, 10.0), entry(6, 1, 20.0)];

        let err = aggregate_scores(&entries, &roster, &subjects(), "JSS 1A").unwrap_err();
        assert!(matches!(err, RankingError::NoScoredStudents { entries: 2 }));
    }

    #[test]
    fn test_grand_total_matches_subject_sum() {
        let roster = Roster::new(vec![student(1, "Alice"), student(2, "Bob")]);
        let entries = vec![
            entry(1, 1, 80.0),
            entry(2, 1, 90.0),
            entry(1, 2, 70.5),
            entry(2, 2, 60.0),
            entry(2, 7, 12.25),
        ];

        let scores = aggregate_scores(&entries, &roster, &subjects(), "JSS 1A").unwrap();
        for score in &scores {
            let sum: f64 = score.subject_scores.values().sum();
            assert_eq!(score.grand_total, sum);
        }
        assert_eq!(scores[0].name, "Alice");
        assert_eq!(scores[1].name, "Bob");
    }
}
