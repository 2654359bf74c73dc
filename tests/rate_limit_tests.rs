//! Admission middleware tests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test, web};
use shortly::api::middleware::{FixedWindowLimiter, RateLimit};
use shortly::config::RateLimitConfig;

fn rate_config(max_requests: u32, skip_failed: bool, skip_successful: bool) -> RateLimitConfig {
    RateLimitConfig {
        enabled: true,
        max_requests,
        window_secs: 60,
        skip_failed,
        skip_successful,
        trusted_proxies: vec!["10.0.0.0/8".to_string()],
    }
}

fn peer(ip: &str) -> SocketAddr {
    format!("{}:40000", ip).parse().unwrap()
}

macro_rules! limited_app {
    ($config:expr) => {{
        let config = $config;
        let limiter = Arc::new(FixedWindowLimiter::new(
            config.max_requests,
            Duration::from_secs(config.window_secs),
        ));
        test::init_service(
            App::new()
                .wrap(RateLimit::new(limiter, &config))
                .route("/ok", web::get().to(|| async { HttpResponse::Ok().body("ok") }))
                .route(
                    "/fail",
                    web::get().to(|| async { HttpResponse::NotFound().finish() }),
                ),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_two_of_three_admitted() {
    let app = limited_app!(rate_config(2, false, false));

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let req = test::TestRequest::get()
            .uri("/ok")
            .peer_addr(peer("203.0.113.7"))
            .to_request();
        statuses.push(test::call_service(&app, req).await.status());
    }

    assert_eq!(
        statuses,
        vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );
}

#[actix_web::test]
async fn test_rejection_body_and_headers() {
    let app = limited_app!(rate_config(1, false, false));

    let req = test::TestRequest::get()
        .uri("/ok")
        .peer_addr(peer("203.0.113.7"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-ratelimit-limit").unwrap(), "1");
    assert_eq!(resp.headers().get("x-ratelimit-remaining").unwrap(), "0");

    let req = test::TestRequest::get()
        .uri("/ok")
        .peer_addr(peer("203.0.113.7"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("retry-after"));

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Too many requests, please try again later.");
}

#[actix_web::test]
async fn test_clients_limited_independently() {
    let app = limited_app!(rate_config(1, false, false));

    for ip in ["203.0.113.1", "203.0.113.2"] {
        let req = test::TestRequest::get()
            .uri("/ok")
            .peer_addr(peer(ip))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}

#[actix_web::test]
async fn test_forwarded_address_used_behind_trusted_proxy() {
    let app = limited_app!(rate_config(1, false, false));

    // 同一个代理后面的两个客户端
    for client in ["198.51.100.1", "198.51.100.2"] {
        let req = test::TestRequest::get()
            .uri("/ok")
            .peer_addr(peer("10.0.0.5"))
            .insert_header(("X-Forwarded-For", client))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    // 不可信的对端伪造 X-Forwarded-For 无效
    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/ok")
            .peer_addr(peer("203.0.113.9"))
            .insert_header(("X-Forwarded-For", "198.51.100.3"))
            .to_request();
        let _ = test::call_service(&app, req).await;
    }
    let req = test::TestRequest::get()
        .uri("/ok")
        .peer_addr(peer("10.0.0.5"))
        .insert_header(("X-Forwarded-For", "198.51.100.3"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_skip_failed_does_not_count_errors() {
    let app = limited_app!(rate_config(1, true, false));

    for _ in 0..3 {
        let req = test::TestRequest::get()
            .uri("/fail")
            .peer_addr(peer("203.0.113.7"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    let req = test::TestRequest::get()
        .uri("/ok")
        .peer_addr(peer("203.0.113.7"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_skip_successful_does_not_count_successes() {
    let app = limited_app!(rate_config(1, false, true));

    for _ in 0..3 {
        let req = test::TestRequest::get()
            .uri("/ok")
            .peer_addr(peer("203.0.113.7"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/fail")
        .peer_addr(peer("203.0.113.7"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::get()
        .uri("/ok")
        .peer_addr(peer("203.0.113.7"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}
