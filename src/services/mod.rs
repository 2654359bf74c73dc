//! Service layer
//!
//! Request handlers only translate HTTP to and from these services.

pub mod auth_service;
pub mod link_minter;
pub mod link_resolver;
pub mod recent_deletes;
pub mod safety;

pub use auth_service::AuthService;
pub use link_minter::{LinkMinter, MintRequest};
pub use link_resolver::{LinkResolver, Resolution, ResolutionSource};
pub use recent_deletes::RecentDeletes;
pub use safety::{SafetyVerifier, Verdict, VerifierError};
