//! 固定窗口限流
//!
//! 每个客户端 IP 一个计数器，窗口到期后整体清零。计数在请求进入时占用，
//! 下游返回后再按 `skip_failed` / `skip_successful` 决定是否退还。

use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_service::{Service, Transform};
use actix_web::{
    Error, ResponseError,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER},
};
use dashmap::DashMap;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::errors::ShortlyError;
use crate::utils::ip::resolve_client_ip;

const HEADER_LIMIT: &str = "x-ratelimit-limit";
const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_RESET: &str = "x-ratelimit-reset";

/// Key used when the peer address is unavailable.
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone)]
struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// A slot taken in the current window. Handing it back through
/// [`FixedWindowLimiter::release`] uncounts the request.
#[derive(Debug, Clone)]
pub struct Permit {
    key: String,
    window_start: Instant,
    pub remaining: u32,
    pub reset: Duration,
}

#[derive(Debug)]
pub enum Admission {
    Admitted(Permit),
    Limited { retry_after: Duration },
}

pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    entries: DashMap<String, WindowEntry>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: DashMap::new(),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window())
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn try_acquire(&self, key: &str) -> Admission {
        let now = Instant::now();
        // entry() 持有分片写锁，检查和自增是原子的
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| WindowEntry {
                count: 0,
                window_start: now,
            });

        if now.duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        let reset = self
            .window
            .saturating_sub(now.duration_since(entry.window_start));

        if entry.count >= self.max_requests {
            return Admission::Limited { retry_after: reset };
        }

        entry.count += 1;
        Admission::Admitted(Permit {
            key: key.to_string(),
            window_start: entry.window_start,
            remaining: self.max_requests - entry.count,
            reset,
        })
    }

    /// Gives a slot back. A permit from a window that has since rolled over
    /// is ignored.
    pub fn release(&self, permit: &Permit) {
        if let Some(mut entry) = self.entries.get_mut(&permit.key)
            && entry.window_start == permit.window_start
        {
            entry.count = entry.count.saturating_sub(1);
        }
    }

    /// Drops counters whose window has lapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.window_start) < self.window);
        before.saturating_sub(self.entries.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.entries.len()
    }

    /// Periodically purges lapsed counters, once per window.
    pub fn spawn_purge_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        let period = limiter.window.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = limiter.purge_expired();
                if removed > 0 {
                    debug!("Rate limiter purged {} idle clients", removed);
                }
            }
        })
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 { secs + 1 } else { secs }
}

fn set_rate_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset: Duration) {
    headers.insert(HeaderName::from_static(HEADER_LIMIT), HeaderValue::from(limit));
    headers.insert(
        HeaderName::from_static(HEADER_REMAINING),
        HeaderValue::from(remaining),
    );
    headers.insert(
        HeaderName::from_static(HEADER_RESET),
        HeaderValue::from(ceil_secs(reset)),
    );
}

/// Admission middleware. Every worker wraps the same shared limiter.
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<FixedWindowLimiter>,
    trusted_proxies: Rc<[String]>,
    skip_failed: bool,
    skip_successful: bool,
}

impl RateLimit {
    pub fn new(limiter: Arc<FixedWindowLimiter>, config: &RateLimitConfig) -> Self {
        Self {
            limiter,
            trusted_proxies: config.trusted_proxies.clone().into(),
            skip_failed: config.skip_failed,
            skip_successful: config.skip_successful,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            trusted_proxies: self.trusted_proxies.clone(),
            skip_failed: self.skip_failed,
            skip_successful: self.skip_successful,
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limiter: Arc<FixedWindowLimiter>,
    trusted_proxies: Rc<[String]>,
    skip_failed: bool,
    skip_successful: bool,
}

impl<S> RateLimitMiddleware<S> {
    fn client_key(&self, req: &ServiceRequest) -> String {
        resolve_client_ip(req.peer_addr(), req.headers(), &self.trusted_proxies)
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limiter = self.limiter.clone();
        let skip_failed = self.skip_failed;
        let skip_successful = self.skip_successful;
        let key = self.client_key(&req);

        Box::pin(async move {
            let limit = limiter.max_requests();
            let permit = match limiter.try_acquire(&key) {
                Admission::Admitted(permit) => permit,
                Admission::Limited { retry_after } => {
                    warn!("Rate limit exceeded for {} on {}", key, req.path());
                    let mut response =
                        ShortlyError::rate_limited(format!("client {}", key)).error_response();
                    let headers = response.headers_mut();
                    set_rate_headers(headers, limit, 0, retry_after);
                    headers.insert(RETRY_AFTER, HeaderValue::from(ceil_secs(retry_after).max(1)));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let mut res = match srv.call(req).await {
                Ok(res) => res,
                Err(e) => {
                    if skip_failed {
                        limiter.release(&permit);
                    }
                    return Err(e);
                }
            };

            let succeeded = res.status().is_success();
            let uncounted = (succeeded && skip_successful) || (!succeeded && skip_failed);
            let remaining = if uncounted {
                limiter.release(&permit);
                (permit.remaining + 1).min(limit)
            } else {
                permit.remaining
            };

            set_rate_headers(res.headers_mut(), limit, remaining, permit.reset);
            Ok(res.map_into_left_body())
        })
    }
}
