use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::storage::{StorageError, StorageErrorKind};

#[derive(Debug, Clone)]
pub enum ShortlyError {
    NotFound(String),
    InvalidScheme(String),
    Malicious(String),
    UpstreamUnavailable(String),
    DuplicateAlias(String),
    Persistence(String),
    Unauthorized(String),
    RateLimited(String),
    Validation(String),
    Conflict(String),
    CacheConnection(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    Serialization(String),
    Internal(String),
}

impl ShortlyError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShortlyError::NotFound(_) => "E001",
            ShortlyError::InvalidScheme(_) => "E002",
            ShortlyError::Malicious(_) => "E003",
            ShortlyError::UpstreamUnavailable(_) => "E004",
            ShortlyError::DuplicateAlias(_) => "E005",
            ShortlyError::Persistence(_) => "E006",
            ShortlyError::Unauthorized(_) => "E007",
            ShortlyError::RateLimited(_) => "E008",
            ShortlyError::Validation(_) => "E009",
            ShortlyError::Conflict(_) => "E010",
            ShortlyError::CacheConnection(_) => "E011",
            ShortlyError::DatabaseConfig(_) => "E012",
            ShortlyError::DatabaseConnection(_) => "E013",
            ShortlyError::Serialization(_) => "E014",
            ShortlyError::Internal(_) => "E015",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ShortlyError::NotFound(_) => "Resource Not Found",
            ShortlyError::InvalidScheme(_) => "Invalid URL Scheme",
            ShortlyError::Malicious(_) => "Malicious URL",
            ShortlyError::UpstreamUnavailable(_) => "Upstream Unavailable",
            ShortlyError::DuplicateAlias(_) => "Duplicate Alias",
            ShortlyError::Persistence(_) => "Persistence Error",
            ShortlyError::Unauthorized(_) => "Unauthorized",
            ShortlyError::RateLimited(_) => "Rate Limited",
            ShortlyError::Validation(_) => "Validation Error",
            ShortlyError::Conflict(_) => "Conflict",
            ShortlyError::CacheConnection(_) => "Cache Connection Error",
            ShortlyError::DatabaseConfig(_) => "Database Configuration Error",
            ShortlyError::DatabaseConnection(_) => "Database Connection Error",
            ShortlyError::Serialization(_) => "Serialization Error",
            ShortlyError::Internal(_) => "Internal Error",
        }
    }

    /// Internal detail. Goes to logs, never to a response body.
    pub fn message(&self) -> &str {
        match self {
            ShortlyError::NotFound(msg)
            | ShortlyError::InvalidScheme(msg)
            | ShortlyError::Malicious(msg)
            | ShortlyError::UpstreamUnavailable(msg)
            | ShortlyError::DuplicateAlias(msg)
            | ShortlyError::Persistence(msg)
            | ShortlyError::Unauthorized(msg)
            | ShortlyError::RateLimited(msg)
            | ShortlyError::Validation(msg)
            | ShortlyError::Conflict(msg)
            | ShortlyError::CacheConnection(msg)
            | ShortlyError::DatabaseConfig(msg)
            | ShortlyError::DatabaseConnection(msg)
            | ShortlyError::Serialization(msg)
            | ShortlyError::Internal(msg) => msg,
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            ShortlyError::NotFound(_) => StatusCode::NOT_FOUND,
            ShortlyError::InvalidScheme(_)
            | ShortlyError::DuplicateAlias(_)
            | ShortlyError::Validation(_) => StatusCode::BAD_REQUEST,
            ShortlyError::Malicious(_) => StatusCode::FORBIDDEN,
            ShortlyError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ShortlyError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ShortlyError::Conflict(_) => StatusCode::CONFLICT,
            ShortlyError::UpstreamUnavailable(_)
            | ShortlyError::Persistence(_)
            | ShortlyError::CacheConnection(_)
            | ShortlyError::DatabaseConfig(_)
            | ShortlyError::DatabaseConnection(_)
            | ShortlyError::Serialization(_)
            | ShortlyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fixed text returned to clients for this kind of failure.
    ///
    /// `Validation` and `Conflict` carry messages that are written for the
    /// caller, so those are passed through as-is.
    pub fn public_message(&self) -> &str {
        match self {
            ShortlyError::NotFound(_) => "short url not found",
            ShortlyError::InvalidScheme(_) => "URL must start with https://",
            ShortlyError::Malicious(_) => "Url is malicious",
            ShortlyError::UpstreamUnavailable(_) => "External API error, try again later",
            ShortlyError::DuplicateAlias(_) => "Duplicate short link, create a new alias",
            ShortlyError::Persistence(_) => "Internal server error",
            ShortlyError::Unauthorized(_) => "Unauthorized",
            ShortlyError::RateLimited(_) => "Too many requests, please try again later.",
            ShortlyError::Validation(msg) | ShortlyError::Conflict(msg) => msg,
            ShortlyError::CacheConnection(_)
            | ShortlyError::DatabaseConfig(_)
            | ShortlyError::DatabaseConnection(_)
            | ShortlyError::Serialization(_)
            | ShortlyError::Internal(_) => "Internal server error",
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端提示）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ShortlyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShortlyError {}

// 便捷的构造函数
impl ShortlyError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortlyError::NotFound(msg.into())
    }

    pub fn invalid_scheme<T: Into<String>>(msg: T) -> Self {
        ShortlyError::InvalidScheme(msg.into())
    }

    pub fn malicious<T: Into<String>>(msg: T) -> Self {
        ShortlyError::Malicious(msg.into())
    }

    pub fn upstream_unavailable<T: Into<String>>(msg: T) -> Self {
        ShortlyError::UpstreamUnavailable(msg.into())
    }

    pub fn duplicate_alias<T: Into<String>>(msg: T) -> Self {
        ShortlyError::DuplicateAlias(msg.into())
    }

    pub fn persistence<T: Into<String>>(msg: T) -> Self {
        ShortlyError::Persistence(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        ShortlyError::Unauthorized(msg.into())
    }

    pub fn rate_limited<T: Into<String>>(msg: T) -> Self {
        ShortlyError::RateLimited(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShortlyError::Validation(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        ShortlyError::Conflict(msg.into())
    }

    pub fn cache_connection<T: Into<String>>(msg: T) -> Self {
        ShortlyError::CacheConnection(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ShortlyError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ShortlyError::DatabaseConnection(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShortlyError::Serialization(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        ShortlyError::Internal(msg.into())
    }
}

impl ResponseError for ShortlyError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.http_status())
            .json(serde_json::json!({ "error": self.public_message() }))
    }
}

// Anything that reaches a service without a more specific mapping is a
// generic persistence failure.
impl From<StorageError> for ShortlyError {
    fn from(err: StorageError) -> Self {
        match err.kind {
            StorageErrorKind::Connection => ShortlyError::DatabaseConnection(err.message),
            _ => ShortlyError::Persistence(err.message),
        }
    }
}

impl From<serde_json::Error> for ShortlyError {
    fn from(err: serde_json::Error) -> Self {
        ShortlyError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortlyError>;
