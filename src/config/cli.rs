use crate::config::toml_config::{OutputConfig, RankConfig, RankingConfig};
use crate::domain::model::ScopeSelection;
use crate::utils::error::{RankingError, Result};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "merit-rank")]
#[command(about = "Rank a class by total marks for a term and academic year")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Backend base URL (overrides the config file)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Class id to rank
    #[arg(long = "class")]
    pub class_id: Option<String>,

    /// Term number
    #[arg(long)]
    pub term: Option<u32>,

    /// Academic year, e.g. 2024/2025
    #[arg(long = "year")]
    pub academic_year: Option<String>,

    /// Ordering among equal totals: sort_order, student_id or name
    #[arg(long)]
    pub tie_break: Option<String>,

    /// Position suffix style: simplified or english
    #[arg(long)]
    pub ordinal: Option<String>,

    /// Directory for exported merit lists
    #[arg(long)]
    pub output: Option<String>,

    /// Export formats (csv, json)
    #[arg(long, value_delimiter = ',')]
    pub format: Vec<String>,

    /// Print available classes, subjects and terms, then exit
    #[arg(long)]
    pub list_options: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn selection(&self) -> ScopeSelection {
        ScopeSelection {
            class_id: self.class_id.clone(),
            term: self.term,
            academic_year: self.academic_year.clone(),
        }
    }

    /// Config file (if any) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<RankConfig> {
        let mut config = match (&self.config, &self.base_url) {
            (Some(path), _) => RankConfig::from_file(path)?,
            (None, Some(base_url)) => RankConfig::for_base_url(base_url.clone()),
            (None, None) => {
                return Err(RankingError::MissingConfigError {
                    field: "backend.base_url (use --config or --base-url)".to_string(),
                })
            }
        };

        if let Some(base_url) = &self.base_url {
            config.backend.base_url = base_url.clone();
        }

        if self.tie_break.is_some() || self.ordinal.is_some() {
            let ranking = config.ranking.get_or_insert_with(RankingConfig::default);
            if let Some(tie_break) = &self.tie_break {
                ranking.tie_break = Some(tie_break.clone());
            }
            if let Some(ordinal) = &self.ordinal {
                ranking.ordinal_style = Some(ordinal.clone());
            }
        }

        if self.output.is_some() || !self.format.is_empty() {
            let output = config.output.get_or_insert_with(|| OutputConfig {
                path: "./output".to_string(),
                formats: vec!["csv".to_string()],
            });
            if let Some(path) = &self.output {
                output.path = path.clone();
            }
            if !self.format.is_empty() {
                output.formats = self.format.clone();
            }
        }

        Ok(config)
    }
}
