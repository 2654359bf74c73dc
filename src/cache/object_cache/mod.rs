mod moka;
mod null;
mod redis;

pub use moka::MokaObjectCache;
pub use null::NullObjectCache;
pub use redis::RedisObjectCache;
