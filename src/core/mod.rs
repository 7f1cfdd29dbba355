pub mod aggregator;
pub mod catalog;
pub mod collector;
pub mod context;
pub mod engine;
pub mod export;
pub mod persister;
pub mod ranker;
pub mod term_reports;

pub use crate::domain::model::{MeritList, MeritRow, RankingScope, ScopeSelection};
pub use crate::domain::ports::{PositionStore, Storage};
pub use crate::utils::error::Result;
