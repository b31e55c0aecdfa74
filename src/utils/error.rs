use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Input error: {message}")]
    InputError { message: String },

    #[error("Lookup error: {message}")]
    LookupError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 單筆記錄層級，跳過即可
    Low,
    /// 輸入資料有問題
    Medium,
    /// 設定錯誤，無法開始執行
    High,
}

impl BotError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BotError::HttpError(_) | BotError::LookupError { .. } => ErrorSeverity::Low,
            BotError::CsvError(_)
            | BotError::IoError(_)
            | BotError::SerializationError(_)
            | BotError::InputError { .. } => ErrorSeverity::Medium,
            BotError::ConfigError { .. }
            | BotError::InvalidConfigValueError { .. }
            | BotError::MissingConfigError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BotError::HttpError(_) | BotError::LookupError { .. } => {
                "Check network connectivity and the configured endpoints"
            }
            BotError::CsvError(_) | BotError::InputError { .. } => {
                "Make sure the input CSV has a 'knowledge_base_id,doi' header"
            }
            BotError::IoError(_) => "Check that the file exists and is readable",
            BotError::SerializationError(_) => "The service returned unexpected JSON",
            BotError::ConfigError { .. }
            | BotError::InvalidConfigValueError { .. }
            | BotError::MissingConfigError { .. } => {
                "Review the TOML configuration and command line flags"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
