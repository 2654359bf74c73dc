pub mod rate_limit;

pub use rate_limit::{Admission, FixedWindowLimiter, Permit, RateLimit};
