//! 集成测试共用的模拟组件

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;
use uuid::Uuid;

use shortly::cache::{CacheResult, ObjectCache};
use shortly::config::DatabaseConfig;
use shortly::errors::{Result as ShortlyResult, ShortlyError};
use shortly::services::{SafetyVerifier, Verdict, VerifierError};
use shortly::storage::{
    LinkRepository, NewShortLink, NewUser, SeaOrmStorage, ShortLink, StorageError,
    StorageResult, UniqueConstraint, User, UserRepository,
};

/// In-memory link store that counts every call.
#[derive(Default)]
pub struct CountingLinkStore {
    links: Mutex<HashMap<String, ShortLink>>,
    pub create_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub increment_calls: AtomicUsize,
    pub fail_increments: AtomicBool,
    pub fail_reads: AtomicBool,
    slow_next_read: Mutex<Option<Duration>>,
}

impl CountingLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, code: &str, long_url: &str) {
        let now = Utc::now();
        self.links.lock().unwrap().insert(
            code.to_string(),
            ShortLink {
                id: Uuid::new_v4(),
                short_code: code.to_string(),
                long_url: long_url.to_string(),
                owner_user_id: None,
                created_at: now,
                updated_at: now,
                click_count: 0,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    pub fn clicks(&self, code: &str) -> Option<i64> {
        self.links
            .lock()
            .unwrap()
            .get(code)
            .map(|l| l.click_count)
    }

    /// The next `get_link` takes its snapshot, then waits this long before
    /// returning it.
    pub fn slow_next_read(&self, delay: Duration) {
        *self.slow_next_read.lock().unwrap() = Some(delay);
    }

    pub fn gets(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkRepository for CountingLinkStore {
    async fn create_link(&self, link: NewShortLink) -> StorageResult<ShortLink> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut links = self.links.lock().unwrap();
        if links.contains_key(&link.short_code) {
            return Err(StorageError::unique_violation(
                UniqueConstraint::ShortCode,
                format!("duplicate short_code {}", link.short_code),
            ));
        }
        let now = Utc::now();
        let stored = ShortLink {
            id: Uuid::new_v4(),
            short_code: link.short_code.clone(),
            long_url: link.long_url,
            owner_user_id: link.owner_user_id,
            created_at: now,
            updated_at: now,
            click_count: 0,
        };
        links.insert(link.short_code, stored.clone());
        Ok(stored)
    }

    async fn get_link(&self, short_code: &str) -> StorageResult<Option<ShortLink>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::connection("database is down"));
        }
        let snapshot = self.links.lock().unwrap().get(short_code).cloned();
        let delay = self.slow_next_read.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(snapshot)
    }

    async fn delete_link(&self, short_code: &str) -> StorageResult<bool> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.links.lock().unwrap().remove(short_code).is_some())
    }

    async fn increment_clicks(&self, short_code: &str) -> StorageResult<()> {
        self.increment_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(StorageError::other("increment failed"));
        }
        if let Some(link) = self.links.lock().unwrap().get_mut(short_code) {
            link.click_count += 1;
        }
        Ok(())
    }

    async fn list_links(&self) -> StorageResult<Vec<ShortLink>> {
        let mut all: Vec<ShortLink> = self.links.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn list_links_by_owner(&self, owner: Uuid) -> StorageResult<Vec<ShortLink>> {
        Ok(self
            .list_links()
            .await?
            .into_iter()
            .filter(|l| l.owner_user_id == Some(owner))
            .collect())
    }
}

/// In-memory user store with the same uniqueness rules as the real schema.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.username == user.username) {
            return Err(StorageError::unique_violation(
                UniqueConstraint::Username,
                "duplicate username",
            ));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(StorageError::unique_violation(
                UniqueConstraint::Email,
                "duplicate email",
            ));
        }
        let stored = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StorageResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn delete_user(&self, id: Uuid) -> StorageResult<bool> {
        Ok(self.users.lock().unwrap().remove(&id).is_some())
    }
}

/// Verifier with a fixed answer.
pub enum StubVerifier {
    Safe,
    Malicious,
    Unavailable,
}

#[async_trait]
impl SafetyVerifier for StubVerifier {
    async fn verify(&self, _url: &str) -> Result<Verdict, VerifierError> {
        match self {
            StubVerifier::Safe => Ok(Verdict::Safe),
            StubVerifier::Malicious => Ok(Verdict::Malicious),
            StubVerifier::Unavailable => Err(VerifierError::Status(503)),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Cache whose every call fails.
pub struct FailingCache;

#[async_trait]
impl ObjectCache for FailingCache {
    async fn get(&self, _key: &str) -> ShortlyResult<CacheResult> {
        Err(ShortlyError::cache_connection("cache down"))
    }

    async fn insert(&self, _key: &str, _link: &ShortLink, _ttl: Duration) -> ShortlyResult<()> {
        Err(ShortlyError::cache_connection("cache down"))
    }

    async fn remove(&self, _key: &str) -> ShortlyResult<()> {
        Err(ShortlyError::cache_connection("cache down"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// SeaOrmStorage over a fresh SQLite file. Keep the `TempDir` alive.
pub async fn temp_storage() -> (SeaOrmStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };

    let storage = SeaOrmStorage::connect(&config)
        .await
        .expect("Failed to create storage");
    (storage, temp_dir)
}
