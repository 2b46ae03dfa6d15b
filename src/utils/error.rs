use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Backend request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    BackendError { status: u16, message: String },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

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

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Backend,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DirectoryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DirectoryError::ApiError(_) | DirectoryError::Timeout { .. } => ErrorCategory::Network,
            DirectoryError::BackendError { .. } => ErrorCategory::Backend,
            DirectoryError::ConfigError { .. }
            | DirectoryError::MissingConfigError { .. }
            | DirectoryError::InvalidConfigValueError { .. }
            | DirectoryError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            DirectoryError::CsvError(_)
            | DirectoryError::SerializationError(_)
            | DirectoryError::ValidationError { .. } => ErrorCategory::Data,
            DirectoryError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Backend => match self {
                DirectoryError::BackendError { status, .. } if *status >= 500 => {
                    ErrorSeverity::Medium
                }
                _ => ErrorSeverity::High,
            },
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Timeouts, transport failures and 5xx responses are worth retrying.
    pub fn is_transient(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check connectivity to the backend or raise the request timeout",
            ErrorCategory::Backend => "Check the backend URL, API key and table permissions",
            ErrorCategory::Configuration => "Fix the configuration value named in the error and retry",
            ErrorCategory::Data => "Check the fixture or backend rows for malformed records",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DirectoryError::Timeout { operation, .. } => {
                format!("The location backend did not answer in time ({})", operation)
            }
            DirectoryError::BackendError { status, .. } => {
                format!("The location backend rejected the request (HTTP {})", status)
            }
            DirectoryError::MissingConfigError { field } => {
                format!("Required setting '{}' is missing", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
