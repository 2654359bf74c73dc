//! Cache gateway
//!
//! Optional key -> ShortLink snapshot store with per-entry TTL. Nothing here
//! is authoritative; callers must keep working when every call fails.

pub mod factory;
pub mod object_cache;
pub mod traits;

pub use factory::CacheFactory;
pub use object_cache::{MokaObjectCache, NullObjectCache, RedisObjectCache};
pub use traits::{CacheResult, ObjectCache};
