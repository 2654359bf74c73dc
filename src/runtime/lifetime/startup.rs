use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::jwt::JwtService;
use crate::api::middleware::FixedWindowLimiter;
use crate::api::{ApiContext, ApiSettings};
use crate::cache::{CacheFactory, ObjectCache};
use crate::config::AppConfig;
use crate::services::safety::build_verifier;
use crate::services::{AuthService, LinkMinter, LinkResolver, RecentDeletes, SafetyVerifier};
use crate::storage::{LinkRepository, SeaOrmStorage, UserRepository};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub cache: Arc<dyn ObjectCache>,
    pub api: ApiContext,
    pub limiter: Arc<FixedWindowLimiter>,
}

/// Wires the services behind the HTTP handlers. Kept separate from
/// [`prepare_server_startup`] so any gateway implementation can be plugged in.
pub fn build_api_context(
    links: Arc<dyn LinkRepository>,
    users: Arc<dyn UserRepository>,
    cache: Arc<dyn ObjectCache>,
    verifier: Arc<dyn SafetyVerifier>,
    jwt: Arc<JwtService>,
    config: &AppConfig,
) -> ApiContext {
    let recent_deletes = Arc::new(RecentDeletes::default());
    let resolver = Arc::new(LinkResolver::new(
        links.clone(),
        cache.clone(),
        recent_deletes.clone(),
        &config.cache,
    ));
    let minter = Arc::new(LinkMinter::new(links, cache, verifier, recent_deletes));
    let accounts = Arc::new(AuthService::new(users, jwt.clone()));

    ApiContext {
        resolver,
        minter,
        accounts,
        jwt,
        settings: ApiSettings::from_config(config),
    }
}

/// 准备服务器启动的上下文
/// 包括存储、缓存、安全检查、JWT 和限流器
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))?;

    let storage = Arc::new(
        SeaOrmStorage::connect(&config.database)
            .await
            .context("Failed to create storage backend")?,
    );
    info!("Using storage backend: {}", storage.backend_name());

    let cache = CacheFactory::create(&config.cache).await;
    info!("Using cache: {}", cache.name());

    let verifier = build_verifier(&config.safety);
    let jwt = Arc::new(JwtService::from_config(&config.auth));

    let api = build_api_context(
        storage.clone(),
        storage.clone(),
        cache.clone(),
        verifier,
        jwt,
        config,
    );

    let limiter = Arc::new(FixedWindowLimiter::from_config(&config.rate_limit));

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        cache,
        api,
        limiter,
    })
}
