mod structs;
mod validators;

pub use structs::*;
pub use validators::validate_config;
