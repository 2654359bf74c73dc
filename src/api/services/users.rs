//! 用户注册、登录与注销账户

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};

use crate::api::extractors::AuthenticatedUser;
use crate::errors::ShortlyError;
use crate::services::AuthService;

use super::helpers::json_response;
use super::types::{
    DeleteAccountRequest, LoginRequest, RegisterRequest, SuccessResponse, TokenResponse,
};

pub async fn register(
    accounts: web::Data<Arc<AuthService>>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ShortlyError> {
    let RegisterRequest {
        username,
        email,
        password,
    } = body.into_inner();
    accounts.register(&username, &email, &password).await?;

    Ok(json_response(
        StatusCode::CREATED,
        SuccessResponse::new("User Created"),
    ))
}

pub async fn delete_account(
    user: AuthenticatedUser,
    accounts: web::Data<Arc<AuthService>>,
    body: web::Json<DeleteAccountRequest>,
) -> Result<HttpResponse, ShortlyError> {
    accounts.delete_account(&user.0, &body.password).await?;
    Ok(json_response(StatusCode::OK, SuccessResponse::new("user deleted")))
}

pub async fn login(
    accounts: web::Data<Arc<AuthService>>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ShortlyError> {
    let token = accounts.login(&body.identity, &body.password).await?;
    Ok(json_response(
        StatusCode::OK,
        TokenResponse {
            success: "Authorized".to_string(),
            data: token,
        },
    ))
}

/// 用户路由 `/users`
pub fn users_routes() -> actix_web::Scope {
    web::scope("/users")
        .route("", web::post().to(register))
        .route("/", web::post().to(register))
        .route("/delete", web::delete().to(delete_account))
}

/// 登录路由 `/auth`
pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("", web::post().to(login))
        .route("/", web::post().to(login))
}
