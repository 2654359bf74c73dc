//! MetaDefender URL reputation lookup
//!
//! `GET {api_url}{query-escaped url}` with the key in the `apikey` header.
//! `lookup_results.detected_by > 0` means at least one source flagged it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use ureq::Agent;

use super::provider::{SafetyVerifier, Verdict, VerifierError};
use crate::config::SafetyConfig;

#[derive(Debug, Deserialize)]
struct LookupResponse {
    lookup_results: LookupResults,
}

#[derive(Debug, Deserialize)]
struct LookupResults {
    detected_by: u64,
}

pub struct MetaDefenderVerifier {
    agent: Agent,
    api_url: String,
    api_key: String,
}

impl MetaDefenderVerifier {
    pub fn new(config: &SafetyConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        Self {
            agent,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn lookup_url(&self, url: &str) -> String {
        format!("{}{}", self.api_url, urlencoding::encode(url))
    }

    /// 同步请求，在 spawn_blocking 中调用
    fn verify_sync(
        agent: Agent,
        lookup_url: String,
        api_key: String,
    ) -> Result<Verdict, VerifierError> {
        let resp = agent
            .get(&lookup_url)
            .header("apikey", &api_key)
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => VerifierError::Status(code),
                other => VerifierError::Request(other.to_string()),
            })?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(VerifierError::Status(status));
        }

        let body: LookupResponse = resp
            .into_body()
            .read_json()
            .map_err(|e| VerifierError::Decode(e.to_string()))?;

        Ok(verdict_from(&body))
    }
}

fn verdict_from(body: &LookupResponse) -> Verdict {
    if body.lookup_results.detected_by > 0 {
        Verdict::Malicious
    } else {
        Verdict::Safe
    }
}

#[async_trait]
impl SafetyVerifier for MetaDefenderVerifier {
    async fn verify(&self, url: &str) -> Result<Verdict, VerifierError> {
        if self.api_key.is_empty() {
            return Err(VerifierError::MissingApiKey);
        }

        let agent = self.agent.clone();
        let lookup_url = self.lookup_url(url);
        let api_key = self.api_key.clone();

        let verdict =
            tokio::task::spawn_blocking(move || Self::verify_sync(agent, lookup_url, api_key))
                .await
                .map_err(|e| {
                    warn!("MetaDefender spawn_blocking failed: {}", e);
                    VerifierError::Request(e.to_string())
                })??;

        debug!("MetaDefender verdict for {}: {:?}", url, verdict);
        Ok(verdict)
    }

    fn name(&self) -> &'static str {
        "metadefender"
    }
}
