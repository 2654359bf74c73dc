pub mod shutdown;
pub mod startup;

pub use startup::{StartupContext, build_api_context, prepare_server_startup};
