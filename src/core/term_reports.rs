use crate::domain::model::{EntityId, RankingScope};
use crate::domain::ports::TermReportSource;
use crate::utils::error::{RankingError, Result};

/// Ids of every term report for the scope's (term, year), regardless of class.
pub async fn locate_term_reports(
    source: &dyn TermReportSource,
    scope: &RankingScope,
) -> Result<Vec<EntityId>> {
    let reports = source
        .term_reports(scope.term, &scope.academic_year)
        .await?;

    // The backend filter is trusted but not relied on.
    let mut ids: Vec<EntityId> = reports
        .into_iter()
        .filter(|r| r.term == scope.term && r.academic_year == scope.academic_year)
        .map(|r| r.id)
        .collect();
    ids.sort();
    ids.dedup();

    if ids.is_empty() {
        return Err(RankingError::NoTermReports {
            term: scope.term,
            academic_year: scope.academic_year.clone(),
        });
    }

    tracing::info!(
        "🗂️ Found {} term reports for term {} of {}",
        ids.len(),
        scope.term,
        scope.academic_year
    );
    Ok(ids)
}
