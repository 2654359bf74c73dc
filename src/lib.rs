//! Shortly - a URL shortener service
//!
//! Short codes resolve through a read-through cache in front of a SQL store.
//! Minting is gated by a URL scheme check and an external safety lookup, and
//! writes require an HS256 bearer token. A fixed-window limiter sits in front
//! of every route.
//!
//! # Architecture
//! - `api`: HTTP handlers, token service, extractors and rate limiting
//! - `services`: link resolution, minting, accounts, URL safety
//! - `cache`: redis / memory / null cache gateways
//! - `storage`: repositories over sea-orm (SQLite, PostgreSQL, MySQL)
//! - `config`: configuration loaded once at startup
//! - `runtime`: startup wiring, server mode and shutdown
//! - `system`: logging

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
