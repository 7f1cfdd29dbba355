use crate::domain::model::{EntityId, RankingScope, ScopeSelection, Student};
use crate::domain::ports::RosterSource;
use crate::utils::error::{RankingError, Result};
use std::collections::HashSet;

/// Validates a selection. Runs before any backend call.
pub fn resolve_scope(selection: &ScopeSelection) -> Result<RankingScope> {
    let class_id = non_blank(selection.class_id.as_deref()).ok_or_else(|| missing("class"))?;
    let term = selection.term.ok_or_else(|| missing("term"))?;
    let academic_year =
        non_blank(selection.academic_year.as_deref()).ok_or_else(|| missing("academic year"))?;

    Ok(RankingScope {
        class_id: EntityId::new(class_id),
        term,
        academic_year: academic_year.to_string(),
    })
}

/// Students currently enrolled in the scope's class.
#[derive(Debug, Clone)]
pub struct Roster {
    pub students: Vec<Student>,
    pub ids: HashSet<EntityId>,
}

impl Roster {
    pub fn new(students: Vec<Student>) -> Self {
        let ids = students.iter().map(|s| s.id.clone()).collect();
        Self { students, ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids.contains(id)
    }
}

pub async fn load_roster(source: &dyn RosterSource, scope: &RankingScope) -> Result<Roster> {
    let students = source.roster(&scope.class_id).await?;
    tracing::info!(
        "👥 Roster for class {}: {} students",
        scope.class_id,
        students.len()
    );
    Ok(Roster::new(students))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn missing(field: &str) -> RankingError {
    RankingError::MissingSelection {
        field: field.to_string(),
    }
}
