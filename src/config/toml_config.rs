use crate::adapters::http::EndpointPaths;
use crate::core::export::ExportFormat;
use crate::core::ranker::{OrdinalStyle, RankingPolicy, TieBreak};
use crate::utils::error::{RankingError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankConfig {
    pub backend: BackendConfig,
    pub ranking: Option<RankingConfig>,
    pub output: Option<OutputConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
    pub endpoints: Option<EndpointConfig>,
}

/// Resource paths relative to `base_url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub students: Option<String>,
    pub classes: Option<String>,
    pub subjects: Option<String>,
    pub term_reports: Option<String>,
    pub entries: Option<String>,
    pub calculate_positions: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingConfig {
    pub tie_break: Option<String>,
    pub ordinal_style: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: Option<bool>,
}

impl RankConfig {
    /// Minimal configuration pointing at `base_url`, everything else default.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            backend: BackendConfig {
                base_url: base_url.into(),
                timeout_seconds: None,
                headers: None,
                endpoints: None,
            },
            ranking: None,
            output: None,
            logging: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RankingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RankingError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("backend.base_url", &self.backend.base_url)?;

        if let Some(timeout) = self.backend.timeout_seconds {
            validation::validate_range("backend.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(endpoints) = &self.backend.endpoints {
            let overrides = [
                ("backend.endpoints.students", &endpoints.students),
                ("backend.endpoints.classes", &endpoints.classes),
                ("backend.endpoints.subjects", &endpoints.subjects),
                ("backend.endpoints.term_reports", &endpoints.term_reports),
                ("backend.endpoints.entries", &endpoints.entries),
                (
                    "backend.endpoints.calculate_positions",
                    &endpoints.calculate_positions,
                ),
            ];
            for (field, value) in overrides {
                if let Some(path) = value {
                    validation::validate_non_empty_string(field, path)?;
                }
            }
        }

        if let Some(ranking) = &self.ranking {
            if let Some(tie_break) = &ranking.tie_break {
                validation::validate_one_of("ranking.tie_break", tie_break, &TieBreak::VALUES)?;
            }
            if let Some(style) = &ranking.ordinal_style {
                validation::validate_one_of(
                    "ranking.ordinal_style",
                    style,
                    &OrdinalStyle::VALUES,
                )?;
            }
        }

        if let Some(output) = &self.output {
            validation::validate_path("output.path", &output.path)?;
            for format in &output.formats {
                validation::validate_one_of("output.formats", format, &ExportFormat::VALUES)?;
            }
        }

        Ok(())
    }

    pub fn ranking_policy(&self) -> Result<RankingPolicy> {
        let mut policy = RankingPolicy::default();
        if let Some(ranking) = &self.ranking {
            if let Some(tie_break) = &ranking.tie_break {
                policy.tie_break = tie_break.parse()?;
            }
            if let Some(style) = &ranking.ordinal_style {
                policy.ordinal_style = style.parse()?;
            }
        }
        Ok(policy)
    }

    pub fn export_formats(&self) -> Result<Vec<ExportFormat>> {
        match &self.output {
            Some(output) => output.formats.iter().map(|f| f.parse()).collect(),
            None => Ok(Vec::new()),
        }
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output.as_ref().map(|o| o.path.as_str())
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.json)
            .unwrap_or(false)
    }

    pub fn endpoint_paths(&self) -> EndpointPaths {
        let mut paths = EndpointPaths::default();
        if let Some(endpoints) = &self.backend.endpoints {
            let overrides = [
                (&mut paths.students, &endpoints.students),
                (&mut paths.classes, &endpoints.classes),
                (&mut paths.subjects, &endpoints.subjects),
                (&mut paths.term_reports, &endpoints.term_reports),
                (&mut paths.entries, &endpoints.entries),
                (&mut paths.calculate_positions, &endpoints.calculate_positions),
            ];
            for (slot, value) in overrides {
                if let Some(path) = value {
                    *slot = path.clone();
                }
            }
        }
        paths
    }
}

impl Validate for RankConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[backend]
base_url = "https://school.example.com/api/"
timeout_seconds = 20

[backend.headers]
Authorization = "Token abc123"

[backend.endpoints]
entries = "results/entries/"

[ranking]
tie_break = "name"
ordinal_style = "english"

[output]
path = "./reports"
formats = ["csv", "json"]

[logging]
json = true
"#;

        let config = RankConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        let policy = config.ranking_policy().unwrap();
        assert_eq!(policy.tie_break, TieBreak::Name);
        assert_eq!(policy.ordinal_style, OrdinalStyle::English);
        assert_eq!(
            config.export_formats().unwrap(),
            vec![ExportFormat::Csv, ExportFormat::Json]
        );
        assert!(config.json_logs());

        let paths = config.endpoint_paths();
        assert_eq!(paths.entries, "results/entries/");
        assert_eq!(paths.students, EndpointPaths::default().students);
    }

    #[test]
    fn test_minimal_config_keeps_default_policy() {
        let config = RankConfig::from_toml_str(
            r#"
[backend]
base_url = "http://localhost:8000/api/"
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.ranking_policy().unwrap(), RankingPolicy::default());
        assert!(config.export_formats().unwrap().is_empty());
        assert!(!config.json_logs());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MERIT_RANK_TEST_TOKEN", "secret-token");

        let config = RankConfig::from_toml_str(
            r#"
[backend]
base_url = "https://school.example.com/api/"

[backend.headers]
Authorization = "Token ${MERIT_RANK_TEST_TOKEN}"
"#,
        )
        .unwrap();

        let headers = config.backend.headers.unwrap();
        assert_eq!(headers["Authorization"], "Token secret-token");

        std::env::remove_var("MERIT_RANK_TEST_TOKEN");
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let bad_url = RankConfig::for_base_url("not-a-url");
        assert!(bad_url.validate().is_err());

        let bad_tie_break = RankConfig::from_toml_str(
            r#"
[backend]
base_url = "https://school.example.com/api/"

[ranking]
tie_break = "alphabetical"
"#,
        )
        .unwrap();
        assert!(matches!(
            bad_tie_break.validate(),
            Err(RankingError::InvalidConfigValueError { ref field, .. }) if field == "ranking.tie_break"
        ));

        let bad_format = RankConfig::from_toml_str(
            r#"
[backend]
base_url = "https://school.example.com/api/"

[output]
path = "./reports"
formats = ["pdf"]
"#,
        )
        .unwrap();
        assert!(bad_format.validate().is_err());
    }

    #[test]
    fn test_option_values_accept_any_case() {
        let config = RankConfig::from_toml_str(
            r#"
[backend]
base_url = "https://school.example.com/api/"

[ranking]
tie_break = "Student_ID"
ordinal_style = "English"

[output]
path = "./reports"
formats = ["CSV", " json "]
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        let policy = config.ranking_policy().unwrap();
        assert_eq!(policy.tie_break, TieBreak::StudentId);
        assert_eq!(policy.ordinal_style, OrdinalStyle::English);
        assert_eq!(
            config.export_formats().unwrap(),
            vec![ExportFormat::Csv, ExportFormat::Json]
        );
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[backend]\nbase_url = \"https://school.example.com/api/\"\n")
            .unwrap();

        let config = RankConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.backend.base_url, "https://school.example.com/api/");
    }
}
