use crate::domain::model::{SelectionCatalog, TermPeriod};
use crate::domain::ports::{ClassSource, SubjectSource, TermReportSource};
use crate::utils::error::Result;

/// Fetches the selection lists concurrently. None depends on another.
pub async fn load_catalog(
    classes: &dyn ClassSource,
    subjects: &dyn SubjectSource,
    term_reports: &dyn TermReportSource,
) -> Result<SelectionCatalog> {
    let (mut classes, mut subjects, reports) = tokio::try_join!(
        classes.classes(),
        subjects.subjects(),
        term_reports.all_term_reports()
    )?;

    classes.sort_by(|a, b| a.name.cmp(&b.name));
    subjects.sort_by(|a, b| a.name.cmp(&b.name));

    let mut periods: Vec<TermPeriod> = reports
        .into_iter()
        .map(|r| TermPeriod {
            academic_year: r.academic_year,
            term: r.term,
        })
        .collect();
    periods.sort();
    periods.dedup();

    tracing::debug!(
        "Catalog: {} classes, {} subjects, {} term periods",
        classes.len(),
        subjects.len(),
        periods.len()
    );

    Ok(SelectionCatalog {
        classes,
        subjects,
        periods,
    })
}
