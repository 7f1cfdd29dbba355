use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankingError {
    #[error("Missing selection: {field} is required")]
    MissingSelection { field: String },

    #[error("No term reports found for term {term}, academic year {academic_year}")]
    NoTermReports { term: u32, academic_year: String },

    #[error("No result entries for {roster_size} enrolled students across {term_reports} term reports")]
    NoEntries {
        term_reports: usize,
        roster_size: usize,
    },

    #[error("None of {entries} result entries could be matched to an enrolled student")]
    NoScoredStudents { entries: usize },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Backend returned {status} for {endpoint}")]
    BackendStatus { endpoint: String, status: u16 },

    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Position persistence failed: {message}")]
    PersistError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Selection,
    EmptyResult,
    Transport,
    Data,
    Config,
    Io,
    Persistence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RankingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RankingError::MissingSelection { .. } => ErrorCategory::Selection,
            RankingError::NoTermReports { .. }
            | RankingError::NoEntries { .. }
            | RankingError::NoScoredStudents { .. } => ErrorCategory::EmptyResult,
            RankingError::ApiError(_) | RankingError::BackendStatus { .. } => {
                ErrorCategory::Transport
            }
            RankingError::MalformedResponse { .. }
            | RankingError::SerializationError(_)
            | RankingError::CsvError(_) => ErrorCategory::Data,
            RankingError::IoError(_) => ErrorCategory::Io,
            RankingError::ConfigError { .. }
            | RankingError::MissingConfigError { .. }
            | RankingError::InvalidConfigValueError { .. }
            | RankingError::ConfigValidationError { .. } => ErrorCategory::Config,
            RankingError::PersistError { .. } => ErrorCategory::Persistence,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Selection | ErrorCategory::EmptyResult => ErrorSeverity::Low,
            ErrorCategory::Transport | ErrorCategory::Persistence => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    /// True for the per-stage "nothing to rank" outcomes.
    pub fn is_empty_result(&self) -> bool {
        self.category() == ErrorCategory::EmptyResult
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RankingError::MissingSelection { field } => {
                format!("Select a value for {} and run again", field)
            }
            RankingError::NoTermReports { .. } => {
                "Check that term reports have been created for this term and year".to_string()
            }
            RankingError::NoEntries { .. } => {
                "Check that marks have been entered for students in this class".to_string()
            }
            RankingError::NoScoredStudents { .. } => {
                "The entries reference students outside the class roster; verify enrolments"
                    .to_string()
            }
            RankingError::ApiError(_) | RankingError::BackendStatus { .. } => {
                "Check backend availability and credentials, then run again".to_string()
            }
            RankingError::MalformedResponse { .. } | RankingError::SerializationError(_) => {
                "The backend response did not have the expected shape; check endpoint paths"
                    .to_string()
            }
            RankingError::CsvError(_) | RankingError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            RankingError::ConfigError { .. }
            | RankingError::MissingConfigError { .. }
            | RankingError::InvalidConfigValueError { .. }
            | RankingError::ConfigValidationError { .. } => {
                "Fix the configuration file or command-line arguments".to_string()
            }
            RankingError::PersistError { .. } => {
                "Positions can be recalculated from the report-card screen".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RankingError::MissingSelection { field } => {
                format!("Please select a {} before generating the merit list", field)
            }
            RankingError::NoTermReports { term, academic_year } => format!(
                "No term reports exist for term {} of {}",
                term, academic_year
            ),
            RankingError::NoEntries { .. } => {
                "No marks were found for students in this class for the selected term".to_string()
            }
            RankingError::NoScoredStudents { .. } => {
                "Marks were found, but none belong to students currently in this class".to_string()
            }
            RankingError::ApiError(_) | RankingError::BackendStatus { .. } => {
                "Could not reach the school records service".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RankingError>;
