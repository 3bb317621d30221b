use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Malformed listing '{id}': {reason}")]
    MalformedListing { id: String, reason: String },

    #[error("{kind} not found: {id}")]
    NotFoundError { kind: &'static str, id: String },

    #[error("Conflict: {message}")]
    ConflictError { message: String },

    #[error("Screen {screen} is not reachable while {state}")]
    RouteUnavailable { screen: String, state: String },

    #[error("Temporary failure: {message}")]
    TransientError { message: String },
}

/// 錯誤分類，對應 UI 層需要區分的情境
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conflict,
    Transient,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MarketError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::ConflictError {
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFoundError {
            kind,
            id: id.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::TransientError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. }
            | Self::MalformedListing { .. }
            | Self::RouteUnavailable { .. } => ErrorCategory::Validation,
            Self::NotFoundError { .. } => ErrorCategory::NotFound,
            Self::ConflictError { .. } => ErrorCategory::Conflict,
            Self::TransientError { .. } => ErrorCategory::Transient,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) | Self::CsvError(_) | Self::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::NotFound => ErrorSeverity::Low,
            ErrorCategory::Conflict | ErrorCategory::Transient => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    /// 給終端使用者看的訊息，不含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message } => format!("Invalid input: {}", message),
            Self::MalformedListing { id, .. } => {
                format!("The catalog contains an invalid listing ({})", id)
            }
            Self::NotFoundError { kind, id } => format!("{} '{}' does not exist", kind, id),
            Self::ConflictError { message } => format!("Operation not allowed: {}", message),
            Self::RouteUnavailable { screen, .. } => {
                format!("The screen '{}' is not available right now", screen)
            }
            Self::TransientError { .. } => {
                "The service is temporarily unavailable, please try again".to_string()
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            Self::IoError(_) | Self::CsvError(_) | Self::SerializationError(_) => {
                format!("Unexpected system error: {}", self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Check the values you entered and try again",
            ErrorCategory::NotFound => "Refresh the list, the record may have been removed",
            ErrorCategory::Conflict => "Resolve the conflicting state first (e.g. choose another default address)",
            ErrorCategory::Transient => "Wait a moment and retry",
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }
}

impl From<toml::de::Error> for MarketError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("TOML parsing error: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;
