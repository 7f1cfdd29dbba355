use crate::core::aggregator::{aggregate_scores, SubjectLookup};
use crate::core::catalog::load_catalog;
use crate::core::collector::collect_entries;
use crate::core::context::{load_roster, resolve_scope};
use crate::core::persister::PositionPersister;
use crate::core::ranker::{rank, RankingPolicy};
use crate::core::term_reports::locate_term_reports;
use crate::domain::model::{MeritList, MeritRow, RankingScope, ScopeSelection, SelectionCatalog};
use crate::domain::ports::{
    ClassSource, EntrySource, PositionStore, RosterSource, SubjectSource, TermReportSource,
};
use crate::utils::error::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

/// The read-side collaborators a ranking run draws from.
#[derive(Clone)]
pub struct DataSources {
    pub roster: Arc<dyn RosterSource>,
    pub term_reports: Arc<dyn TermReportSource>,
    pub entries: Arc<dyn EntrySource>,
    pub subjects: Arc<dyn SubjectSource>,
    pub classes: Arc<dyn ClassSource>,
}

impl DataSources {
    /// All sources served by a single backend.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: RosterSource + TermReportSource + EntrySource + SubjectSource + ClassSource + 'static,
    {
        Self {
            roster: backend.clone(),
            term_reports: backend.clone(),
            entries: backend.clone(),
            subjects: backend.clone(),
            classes: backend,
        }
    }
}

/// Result of one run.
///
/// `persist` is the spawned report-card update. Dropping it does not cancel
/// the update, and awaiting it never yields the update's error.
#[derive(Debug)]
pub struct RankingRun {
    pub merit_list: MeritList,
    pub persist: JoinHandle<()>,
}

pub struct RankingEngine {
    sources: DataSources,
    persister: PositionPersister,
    policy: RankingPolicy,
}

impl RankingEngine {
    pub fn new(sources: DataSources, store: Arc<dyn PositionStore>) -> Self {
        Self {
            sources,
            persister: PositionPersister::new(store),
            policy: RankingPolicy::default(),
        }
    }

    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: RosterSource
            + TermReportSource
            + EntrySource
            + SubjectSource
            + ClassSource
            + PositionStore
            + 'static,
    {
        let store: Arc<dyn PositionStore> = backend.clone();
        Self::new(DataSources::from_backend(backend), store)
    }

    pub fn with_policy(mut self, policy: RankingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RankingPolicy {
        self.policy
    }

    /// Builds the merit list for a selection and kicks off the report-card update.
    pub async fn run(&self, selection: &ScopeSelection) -> Result<RankingRun> {
        let scope = resolve_scope(selection)?;
        let started = Instant::now();
        tracing::info!("🏁 Ranking {}", scope);

        let rows = self.compute(&scope).await?;
        tracing::info!(
            "✅ Ranked {} students for {} in {:?}",
            rows.len(),
            scope,
            started.elapsed()
        );

        let persist = self.persister.dispatch(scope.clone());

        Ok(RankingRun {
            merit_list: MeritList {
                scope,
                generated_at: Utc::now(),
                rows,
            },
            persist,
        })
    }

    /// Every stage up to and including ranking, with no side effects.
    pub async fn compute(&self, scope: &RankingScope) -> Result<Vec<MeritRow>> {
        let roster = load_roster(self.sources.roster.as_ref(), scope).await?;
        let term_report_ids = locate_term_reports(self.sources.term_reports.as_ref(), scope).await?;
        let entries =
            collect_entries(self.sources.entries.as_ref(), &term_report_ids, &roster).await?;

        let subjects = SubjectLookup::new(self.sources.subjects.subjects().await?);
        let scores = aggregate_scores(&entries, &roster, &subjects, scope.class_id.as_str())?;

        Ok(rank(scores, self.policy))
    }

    pub async fn catalog(&self) -> Result<SelectionCatalog> {
        load_catalog(
            self.sources.classes.as_ref(),
            self.sources.subjects.as_ref(),
            self.sources.term_reports.as_ref(),
        )
        .await
    }
}
