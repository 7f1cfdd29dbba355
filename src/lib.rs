pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{http::RestBackend, storage::LocalStorage};
#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::RankConfig;
pub use core::engine::{DataSources, RankingEngine, RankingRun};
pub use core::ranker::{OrdinalStyle, RankingPolicy, TieBreak};
pub use domain::model::{MeritList, MeritRow, RankingScope, ScopeSelection};
pub use utils::error::{RankingError, Result};
