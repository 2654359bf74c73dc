//! Link minting and deletion
//!
//! Minting runs four gates in order: scheme, safety lookup, alias choice,
//! insert. Alias uniqueness is left entirely to the store's unique index.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::cache::ObjectCache;
use crate::errors::{Result, ShortlyError};
use crate::services::RecentDeletes;
use crate::services::safety::{SafetyVerifier, Verdict};
use crate::storage::{LinkRepository, NewShortLink, ShortLink, UniqueConstraint};
use crate::utils::validators::has_secure_scheme;
use crate::utils::{GENERATED_CODE_LENGTH, generate_random_code};

#[derive(Debug, Clone, Default)]
pub struct MintRequest {
    pub long_url: String,
    /// Used verbatim when non-empty.
    pub custom_alias: Option<String>,
    /// Set for authenticated callers only.
    pub owner: Option<Uuid>,
}

pub struct LinkMinter {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn ObjectCache>,
    verifier: Arc<dyn SafetyVerifier>,
    recent_deletes: Arc<RecentDeletes>,
}

impl LinkMinter {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn ObjectCache>,
        verifier: Arc<dyn SafetyVerifier>,
        recent_deletes: Arc<RecentDeletes>,
    ) -> Self {
        info!(
            "LinkMinter: created (verifier={}, cache={})",
            verifier.name(),
            cache.name()
        );
        Self {
            links,
            cache,
            verifier,
            recent_deletes,
        }
    }

    pub async fn mint(&self, req: MintRequest) -> Result<ShortLink> {
        if !has_secure_scheme(&req.long_url) {
            info!("Invalid URL scheme: {}", req.long_url);
            return Err(ShortlyError::invalid_scheme(req.long_url));
        }

        match self.verifier.verify(&req.long_url).await {
            Ok(Verdict::Safe) => {}
            Ok(Verdict::Malicious) => {
                warn!("Rejected malicious URL: {}", req.long_url);
                return Err(ShortlyError::malicious(req.long_url));
            }
            Err(e) => {
                error!("{} lookup failed: {}", self.verifier.name(), e);
                return Err(ShortlyError::upstream_unavailable(e.to_string()));
            }
        }

        let short_code = match req.custom_alias {
            Some(alias) if !alias.is_empty() => alias,
            _ => generate_random_code(GENERATED_CODE_LENGTH),
        };

        let link = self
            .links
            .create_link(NewShortLink {
                short_code: short_code.clone(),
                long_url: req.long_url,
                owner_user_id: req.owner,
            })
            .await
            .map_err(|e| match e.unique_constraint() {
                Some(UniqueConstraint::ShortCode) => {
                    info!("Short code already taken: {}", short_code);
                    ShortlyError::duplicate_alias(short_code.clone())
                }
                _ => {
                    error!("Failed to create short link {}: {}", short_code, e);
                    ShortlyError::persistence(e.to_string())
                }
            })?;

        // A cache entry for this code can only be a leftover from a link
        // deleted while the cache was unreachable.
        if let Err(e) = self.cache.remove(&link.short_code).await {
            warn!("Failed to clear cache for new code {}: {}", link.short_code, e);
        }

        info!(
            "LinkMinter: created '{}' -> {}",
            link.short_code, link.long_url
        );
        Ok(link)
    }

    pub async fn delete_link(&self, code: &str) -> Result<()> {
        let Some(existing) = self
            .links
            .get_link(code)
            .await
            .map_err(|e| ShortlyError::persistence(e.to_string()))?
        else {
            return Err(ShortlyError::not_found(format!("no link for code '{}'", code)));
        };

        let deleted = self
            .links
            .delete_link(code)
            .await
            .map_err(|e| ShortlyError::persistence(e.to_string()))?;

        // Mark before evicting: a resolve that inserts after the eviction
        // finds the mark and drops its own entry.
        self.recent_deletes.mark(existing.id);

        // Evict even when a concurrent delete got there first.
        if let Err(e) = self.cache.remove(code).await {
            error!(
                "Failed to evict {} from cache {}; it may resolve until TTL expiry: {}",
                code,
                self.cache.name(),
                e
            );
        }

        if !deleted {
            return Err(ShortlyError::not_found(format!("no link for code '{}'", code)));
        }

        info!("LinkMinter: deleted '{}'", code);
        Ok(())
    }

    pub async fn list_links(&self) -> Result<Vec<ShortLink>> {
        self.links
            .list_links()
            .await
            .map_err(|e| ShortlyError::persistence(e.to_string()))
    }

    pub async fn list_user_links(&self, owner: Uuid) -> Result<Vec<ShortLink>> {
        self.links
            .list_links_by_owner(owner)
            .await
            .map_err(|e| ShortlyError::persistence(e.to_string()))
    }
}
