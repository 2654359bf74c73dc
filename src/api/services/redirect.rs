use std::sync::Arc;

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::{debug, trace};

use crate::errors::ShortlyError;
use crate::services::LinkResolver;

pub async fn ping() -> HttpResponse {
    trace!("Ping");
    HttpResponse::Ok().json(json!({ "message": "pong" }))
}

/// `GET /{code}`: 301 to the stored URL.
pub async fn resolve_link(
    path: web::Path<String>,
    resolver: web::Data<Arc<LinkResolver>>,
) -> Result<HttpResponse, ShortlyError> {
    let code = path.into_inner();
    let resolution = resolver.resolve(&code).await?;

    debug!(
        "Redirecting {} -> {} (via {:?})",
        code, resolution.long_url, resolution.source
    );
    Ok(HttpResponse::MovedPermanently()
        .insert_header((LOCATION, resolution.long_url))
        .finish())
}

/// Redirect 路由配置，必须注册在 API scope 之后
pub fn redirect_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(ping))
        .route("/{code}", web::get().to(resolve_link));
}
