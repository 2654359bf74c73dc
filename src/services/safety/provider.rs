use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::metadefender::MetaDefenderVerifier;
use crate::config::SafetyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Safe,
    Malicious,
}

/// The lookup itself failed; says nothing about the URL.
#[derive(Debug, Clone)]
pub enum VerifierError {
    MissingApiKey,
    Request(String),
    Status(u16),
    Decode(String),
}

impl fmt::Display for VerifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "API key is required"),
            Self::Request(msg) => write!(f, "request failed: {}", msg),
            Self::Status(code) => write!(f, "API call failed with status: {}", code),
            Self::Decode(msg) => write!(f, "unreadable response: {}", msg),
        }
    }
}

impl std::error::Error for VerifierError {}

#[async_trait]
pub trait SafetyVerifier: Send + Sync {
    async fn verify(&self, url: &str) -> Result<Verdict, VerifierError>;

    /// 获取 verifier 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// Accepts every URL. Used when the safety check is switched off.
pub struct PassThroughVerifier;

#[async_trait]
impl SafetyVerifier for PassThroughVerifier {
    async fn verify(&self, _url: &str) -> Result<Verdict, VerifierError> {
        Ok(Verdict::Safe)
    }

    fn name(&self) -> &'static str {
        "pass-through"
    }
}

pub fn build_verifier(config: &SafetyConfig) -> Arc<dyn SafetyVerifier> {
    if !config.enabled {
        warn!("URL safety check disabled; every URL is accepted");
        return Arc::new(PassThroughVerifier);
    }

    if config.api_key.is_empty() {
        // Every mint will fail with an upstream error until a key is set.
        warn!("safety.api_key is empty; minting will be rejected");
    }

    info!("URL safety check: MetaDefender at {}", config.api_url);
    Arc::new(MetaDefenderVerifier::new(config))
}
