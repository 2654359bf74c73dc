//! Server mode
//!
//! Builds the actix-web app around the startup context and runs it until
//! the server stops or Ctrl+C arrives.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    App, HttpServer,
    middleware::{Compress, Condition, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::RateLimit;
use crate::config::AppConfig;
use crate::runtime::lifetime::{self, StartupContext, prepare_server_startup};

/// actix-web 的 worker 数量上限
const MAX_WORKERS: usize = 32;

pub async fn run_server(config: &AppConfig) -> Result<()> {
    let StartupContext {
        storage,
        api,
        limiter,
        ..
    } = prepare_server_startup(config).await?;

    let rate_limit = config.rate_limit.clone();
    if rate_limit.enabled {
        info!(
            "Rate limiting: {} requests per {}s (skip_failed={}, skip_successful={})",
            rate_limit.max_requests,
            rate_limit.window_secs,
            rate_limit.skip_failed,
            rate_limit.skip_successful
        );
        if rate_limit.trusted_proxies.is_empty() {
            warn!("Rate limiting keys on the TCP peer; no trusted proxies configured");
        }
        limiter.spawn_purge_task();
    } else {
        warn!("Rate limiting is disabled");
    }

    let cpu_count = config.server.cpu_count.clamp(1, MAX_WORKERS);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            // 最外层：超限请求不进入业务逻辑
            .wrap(Condition::new(
                rate_limit.enabled,
                RateLimit::new(limiter.clone(), &rate_limit),
            ))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .configure(|cfg| api.configure(cfg))
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(config.server.client_request_timeout))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Starting server at http://{}", bind_address);

    tokio::select! {
        res = server => {
            res.context("HTTP server failed")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Graceful shutdown requested");
        }
    }

    lifetime::shutdown::close_storage(Arc::unwrap_or_clone(storage)).await;
    Ok(())
}
