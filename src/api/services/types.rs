//! API 请求与响应结构

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
    #[serde(default)]
    pub custom_alias: Option<String>,
}

/// `url` carries the short code to delete.
#[derive(Debug, Deserialize)]
pub struct DeleteLinkRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub password: String,
}

// 字段缺失交给校验逻辑报错，而不是 JSON 解析错误
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub success: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: String,
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SuccessResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: message.to_string(),
        }
    }
}
