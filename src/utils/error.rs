use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Remote service returned {status}: {message}")]
    RemoteError { status: u16, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Mail delivery failed: {message}")]
    MailError { message: String },

    #[error("Search failed: {message}")]
    SearchFailed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Remote,
    Data,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// CLI 的退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl DirectoryError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) => ErrorCategory::Network,
            Self::RemoteError { .. } | Self::MailError { .. } | Self::SearchFailed { .. } => {
                ErrorCategory::Remote
            }
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Data
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ValidationError { .. } | Self::NotFound { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 遠端讀取失敗 (網路、認證、配額) 與其他錯誤分開處理
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::HttpError(_)
                | Self::RemoteError { .. }
                | Self::SerializationError(_)
                | Self::SearchFailed { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(_) => "Could not reach the directory service.".to_string(),
            Self::RemoteError { status, .. } => {
                format!("The directory service rejected the request (HTTP {}).", status)
            }
            Self::ValidationError { message, .. } => message.clone(),
            Self::NotFound { entity, .. } => format!("The requested {} does not exist.", entity),
            Self::MailError { message } => format!("The email could not be sent: {}", message),
            Self::SearchFailed { .. } => "Failed to load search results.".to_string(),
            Self::MissingConfigError { field } => {
                format!("Configuration value '{}' is required.", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::HttpError(_) => "Check your network connection and the remote URL.",
            Self::RemoteError { status: 401, .. } | Self::RemoteError { status: 403, .. } => {
                "Check the anon key or access token."
            }
            Self::RemoteError { .. } | Self::SearchFailed { .. } => {
                "Try again later; the service may be over quota."
            }
            Self::CsvError(_) | Self::SerializationError(_) => {
                "The service returned data in an unexpected shape."
            }
            Self::IoError(_) => "Check file paths and permissions.",
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Fix the configuration file or the SUPABASE_* / RESEND_* environment variables."
            }
            Self::ValidationError { .. } => "Correct the highlighted field and submit again.",
            Self::NotFound { .. } => "Search again to find a valid id.",
            Self::MailError { .. } => "Check RESEND_API_KEY and the sender address.",
        }
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_is_distinct_from_input_errors() {
        let remote = DirectoryError::RemoteError {
            status: 503,
            message: "quota".to_string(),
        };
        assert!(remote.is_fetch_failure());
        assert_eq!(remote.severity(), ErrorSeverity::Medium);

        let invalid = DirectoryError::validation("title", "required");
        assert!(!invalid.is_fetch_failure());
        assert_eq!(invalid.category(), ErrorCategory::Input);
        assert_eq!(invalid.user_friendly_message(), "required");
    }

    #[test]
    fn test_failed_search_exits_with_remote_code() {
        let err = DirectoryError::SearchFailed {
            message: "HTTP 503".to_string(),
        };
        assert!(err.is_fetch_failure());
        assert_eq!(err.severity().exit_code(), 2);

        assert_eq!(DirectoryError::not_found("listing", "x").severity().exit_code(), 1);
        assert_eq!(
            DirectoryError::MissingConfigError {
                field: "remote".to_string()
            }
            .severity()
            .exit_code(),
            3
        );
    }

    #[test]
    fn test_auth_failures_suggest_credentials() {
        let err = DirectoryError::RemoteError {
            status: 401,
            message: "JWT expired".to_string(),
        };
        assert!(err.recovery_suggestion().contains("token"));
    }
}
