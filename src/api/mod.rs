pub mod extractors;
pub mod jwt;
pub mod middleware;
pub mod services;

pub use services::{ApiContext, ApiSettings};
