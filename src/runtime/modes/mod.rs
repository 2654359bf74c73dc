//! Mode routing
//!
//! Only the HTTP server mode exists.

pub mod server;

pub use server::run_server;
