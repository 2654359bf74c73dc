//! 链接相关 API：列表、铸造、删除

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use tracing::{info, trace};

use crate::api::extractors::{AuthenticatedUser, OptionalUser};
use crate::errors::ShortlyError;
use crate::services::{LinkMinter, MintRequest};

use super::ApiSettings;
use super::helpers::{error_with_url, json_response};
use super::types::{DeleteLinkRequest, ShortenRequest, ShortenResponse, SuccessResponse};

pub async fn list_all_links(
    minter: web::Data<Arc<LinkMinter>>,
) -> Result<HttpResponse, ShortlyError> {
    let links = minter.list_links().await?;
    trace!("Listing {} links", links.len());
    Ok(json_response(StatusCode::OK, links))
}

pub async fn list_user_links(
    user: AuthenticatedUser,
    minter: web::Data<Arc<LinkMinter>>,
) -> Result<HttpResponse, ShortlyError> {
    let links = minter.list_user_links(user.0.user_id).await?;
    trace!("Listing {} links for {}", links.len(), user.0.username);
    Ok(json_response(StatusCode::OK, links))
}

pub async fn shorten_link(
    user: OptionalUser,
    settings: web::Data<ApiSettings>,
    minter: web::Data<Arc<LinkMinter>>,
    body: web::Json<ShortenRequest>,
) -> Result<HttpResponse, ShortlyError> {
    let identity = user.0;
    if identity.is_none() && !settings.allow_anonymous_mint {
        return Err(ShortlyError::unauthorized("missing bearer token"));
    }

    let ShortenRequest { url, custom_alias } = body.into_inner();
    let request = MintRequest {
        long_url: url.clone(),
        custom_alias,
        owner: identity.map(|i| i.user_id),
    };

    let link = match minter.mint(request).await {
        Ok(link) => link,
        Err(e @ (ShortlyError::InvalidScheme(_) | ShortlyError::Malicious(_))) => {
            return Ok(error_with_url(&e, &url));
        }
        Err(e) => return Err(e),
    };

    info!("Created a shortened link: {}", link.short_code);
    Ok(json_response(
        StatusCode::OK,
        ShortenResponse {
            success: "Shortened link created".to_string(),
            url: format!("{}{}", settings.base_url, link.short_code),
        },
    ))
}

pub async fn delete_link(
    user: AuthenticatedUser,
    minter: web::Data<Arc<LinkMinter>>,
    body: web::Json<DeleteLinkRequest>,
) -> Result<HttpResponse, ShortlyError> {
    let code = body.into_inner().url;
    minter.delete_link(&code).await?;

    info!("Link '{}' deleted by {}", code, user.0.username);
    Ok(json_response(
        StatusCode::OK,
        SuccessResponse::new("Shortened link deleted"),
    ))
}

/// 链接路由 `/links`
pub fn links_routes() -> actix_web::Scope {
    web::scope("/links")
        .route("/all", web::get().to(list_all_links))
        .route("/userlinks", web::get().to(list_user_links))
        .route("/shorten", web::post().to(shorten_link))
        .route("/shorten", web::delete().to(delete_link))
}
