//! Persistence gateway
//!
//! The services only see the repository traits below. `backend` holds the
//! sea-orm implementation used by the server.

use async_trait::async_trait;
use uuid::Uuid;

pub mod backend;
pub mod error;
pub mod models;

pub use backend::SeaOrmStorage;
pub use error::{StorageError, StorageErrorKind, UniqueConstraint};
pub use models::{NewShortLink, NewUser, ShortLink, User};

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link. A taken `short_code` yields
    /// `UniqueViolation { constraint: ShortCode }` and leaves the store untouched.
    async fn create_link(&self, link: NewShortLink) -> StorageResult<ShortLink>;

    async fn get_link(&self, short_code: &str) -> StorageResult<Option<ShortLink>>;

    /// Returns whether a row was removed.
    async fn delete_link(&self, short_code: &str) -> StorageResult<bool>;

    async fn increment_clicks(&self, short_code: &str) -> StorageResult<()>;

    /// All links, newest first.
    async fn list_links(&self) -> StorageResult<Vec<ShortLink>>;

    async fn list_links_by_owner(&self, owner: Uuid) -> StorageResult<Vec<ShortLink>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StorageResult<User>;

    async fn find_user_by_id(&self, id: Uuid) -> StorageResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>>;

    /// Owned links survive with their owner cleared.
    async fn delete_user(&self, id: Uuid) -> StorageResult<bool>;
}
