//! SeaORM storage backend
//!
//! One `SeaOrmStorage` serves both repositories over SQLite, MySQL/MariaDB
//! or PostgreSQL.

mod connection;
mod converters;
mod links;
pub mod retry;
mod users;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, ShortlyError};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_shortlink, model_to_user};
pub use retry::RetryConfig;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<&'static str> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite")
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql")
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(ShortlyError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: &'static str,
    retry_config: RetryConfig,
}

impl SeaOrmStorage {
    /// Connects, applies pending migrations and returns a ready store.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if config.database_url.is_empty() {
            return Err(ShortlyError::database_config("database_url is not set"));
        }

        let backend_name = infer_backend_from_url(&config.database_url)?;
        let db = if backend_name == "sqlite" {
            connect_sqlite(&config.database_url).await?
        } else {
            connect_generic(config, backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name,
            retry_config: RetryConfig::from(config),
        };

        run_migrations(&storage.db).await?;

        info!("{} storage initialized", storage.backend_name.to_uppercase());
        Ok(storage)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Closes the connection pool.
    pub async fn close(self) -> Result<()> {
        self.db
            .close()
            .await
            .map_err(|e| ShortlyError::database_connection(format!("close failed: {}", e)))
    }
}
