use crate::domain::model::{
    EntityId, RankingScope, RawEntry, SchoolClass, Student, Subject, TermReport,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Class id -> enrolled students.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn roster(&self, class_id: &EntityId) -> Result<Vec<Student>>;
}

#[async_trait]
pub trait TermReportSource: Send + Sync {
    /// Term reports matching (term, year), across every class.
    async fn term_reports(&self, term: u32, academic_year: &str) -> Result<Vec<TermReport>>;

    /// Every term report the backend knows about.
    async fn all_term_reports(&self) -> Result<Vec<TermReport>>;
}

#[async_trait]
pub trait EntrySource: Send + Sync {
    /// One batched query for all entries attached to any of `term_report_ids`.
    async fn entries(&self, term_report_ids: &[EntityId]) -> Result<Vec<RawEntry>>;
}

#[async_trait]
pub trait SubjectSource: Send + Sync {
    async fn subjects(&self) -> Result<Vec<Subject>>;
}

#[async_trait]
pub trait ClassSource: Send + Sync {
    async fn classes(&self) -> Result<Vec<SchoolClass>>;
}

/// External report-card store that recomputes and stores positions itself.
#[async_trait]
pub trait PositionStore: Send + Sync {
    async fn recompute_positions(&self, scope: &RankingScope) -> Result<()>;
}

/// Destination for exported merit lists.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
