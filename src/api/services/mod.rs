pub mod helpers;
pub mod links;
pub mod redirect;
pub mod types;
pub mod users;

use std::sync::Arc;

use actix_web::web;

use crate::api::jwt::JwtService;
use crate::config::AppConfig;
use crate::services::{AuthService, LinkMinter, LinkResolver};

pub use helpers::json_config;
pub use links::links_routes;
pub use redirect::redirect_routes;
pub use users::{auth_routes, users_routes};

pub const API_PREFIX: &str = "/api/v1";

/// Handler settings fixed at startup.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Prefix of the short URL returned by a mint, e.g. `https://sho.rt/`.
    pub base_url: String,
    pub allow_anonymous_mint: bool,
}

impl ApiSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.server.base_url.clone(),
            allow_anonymous_mint: config.auth.allow_anonymous_mint,
        }
    }
}

/// Everything the handlers pull out of app data.
#[derive(Clone)]
pub struct ApiContext {
    pub resolver: Arc<LinkResolver>,
    pub minter: Arc<LinkMinter>,
    pub accounts: Arc<AuthService>,
    pub jwt: Arc<JwtService>,
    pub settings: ApiSettings,
}

impl ApiContext {
    /// Registers app data and all routes. Usable with `App::configure`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.resolver.clone()))
            .app_data(web::Data::new(self.minter.clone()))
            .app_data(web::Data::new(self.accounts.clone()))
            .app_data(web::Data::new(self.jwt.clone()))
            .app_data(web::Data::new(self.settings.clone()))
            .app_data(json_config())
            .service(
                web::scope(API_PREFIX)
                    .service(links_routes())
                    .service(users_routes())
                    .service(auth_routes()),
            )
            .configure(redirect_routes);
    }
}
