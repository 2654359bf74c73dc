//! 启动时配置校验
//!
//! 只校验会让服务进入无意义状态的值，其余交给各组件自行处理。

use super::AppConfig;
use crate::utils::ip::parse_proxy_entry;

const CACHE_TYPES: &[&str] = &["memory", "redis", "null"];
const LOG_FORMATS: &[&str] = &["text", "json"];

pub fn validate_config(config: &AppConfig) -> Result<(), String> {
    if config.cache.enabled && !CACHE_TYPES.contains(&config.cache.cache_type.as_str()) {
        return Err(format!(
            "Invalid cache type: '{}'. Valid: {:?}",
            config.cache.cache_type, CACHE_TYPES
        ));
    }

    if config.cache.enabled && config.cache.default_ttl == 0 {
        return Err("cache.default_ttl must be greater than 0".to_string());
    }

    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            return Err("rate_limit.max_requests must be greater than 0".to_string());
        }
        if config.rate_limit.window_secs == 0 {
            return Err("rate_limit.window_secs must be greater than 0".to_string());
        }
        let invalid: Vec<&String> = config
            .rate_limit
            .trusted_proxies
            .iter()
            .filter(|entry| parse_proxy_entry(entry).is_none())
            .collect();
        if !invalid.is_empty() {
            return Err(format!("Invalid trusted proxies: {:?}", invalid));
        }
    }

    if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
        return Err(format!(
            "Invalid log format: '{}'. Valid: {:?}",
            config.logging.format, LOG_FORMATS
        ));
    }

    if config.server.base_url.is_empty() {
        return Err("server.base_url must not be empty".to_string());
    }

    Ok(())
}
