//! 响应构建帮助函数

use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::debug;

use crate::errors::ShortlyError;

use super::types::ErrorResponse;

pub const PARSE_ERROR_MESSAGE: &str = "Cannot parse JSON";

/// Request bodies above this size are rejected.
const MAX_JSON_BODY: usize = 64 * 1024;

pub fn json_response<T: Serialize>(status: StatusCode, body: T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(body)
}

pub fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    json_response(
        status,
        ErrorResponse {
            error: message.to_string(),
            url: None,
        },
    )
}

/// Error body that echoes the submitted URL back, used for rejected mints.
pub fn error_with_url(err: &ShortlyError, url: &str) -> HttpResponse {
    json_response(
        err.http_status(),
        ErrorResponse {
            error: err.public_message().to_string(),
            url: Some(url.to_string()),
        },
    )
}

/// JSON 解析失败统一返回 400 {"error": "Cannot parse JSON"}
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_BODY)
        .error_handler(|err, req| {
            debug!("Rejected body on {}: {}", req.path(), err);
            InternalError::from_response(
                err,
                error_response(StatusCode::BAD_REQUEST, PARSE_ERROR_MESSAGE),
            )
            .into()
        })
}
