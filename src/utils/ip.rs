//! 客户端 IP 提取
//!
//! 限流按客户端 IP 计数。只有当 TCP 对端是配置中的可信代理时，
//! 才采信 X-Forwarded-For / X-Real-IP。

use std::net::{IpAddr, SocketAddr};

use actix_web::http::header::HeaderMap;
use tracing::debug;

/// Parses a trusted-proxy entry, either a bare IP or `ip/prefix`.
pub fn parse_proxy_entry(entry: &str) -> Option<(IpAddr, u8)> {
    match entry.split_once('/') {
        Some((network, prefix_len)) => {
            let network: IpAddr = network.parse().ok()?;
            let prefix_len: u8 = prefix_len.parse().ok()?;
            let max = if network.is_ipv4() { 32 } else { 128 };
            (prefix_len <= max).then_some((network, prefix_len))
        }
        None => {
            let ip: IpAddr = entry.parse().ok()?;
            Some((ip, if ip.is_ipv4() { 32 } else { 128 }))
        }
    }
}

/// 检查 IP 是否在可信代理列表中
pub fn is_trusted_proxy(ip: &IpAddr, trusted_proxies: &[String]) -> bool {
    trusted_proxies.iter().any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(ip, proxy)
        } else {
            proxy.parse::<IpAddr>().is_ok_and(|p| p == *ip)
        }
    })
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = parse_proxy_entry(cidr) else {
        return false;
    };

    match (ip, network) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u32::from_be_bytes(ip.octets());
            let net_bits = u32::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u128::from_be_bytes(ip.octets());
            let net_bits = u128::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        _ => false,
    }
}

/// 从请求头提取转发的 IP（X-Forwarded-For 第一个，其次 X-Real-IP）
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    let raw = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
        })?;

    raw.parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|s| s.ip()))
}

/// Resolves the address a request is attributed to.
///
/// Falls back to the peer address when the peer is not a trusted proxy or
/// the forwarded header is missing or unparsable.
pub fn resolve_client_ip(
    peer: Option<SocketAddr>,
    headers: &HeaderMap,
    trusted_proxies: &[String],
) -> Option<IpAddr> {
    let peer_ip = peer?.ip();

    if is_trusted_proxy(&peer_ip, trusted_proxies)
        && let Some(real_ip) = extract_forwarded_ip_from_headers(headers)
    {
        debug!("Trusted proxy {} -> client {}", peer_ip, real_ip);
        return Some(real_ip);
    }

    Some(peer_ip)
}
