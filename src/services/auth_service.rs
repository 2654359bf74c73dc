//! Accounts: login, registration and self-deletion

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::jwt::{Identity, JwtService};
use crate::errors::{Result, ShortlyError};
use crate::storage::{NewUser, UniqueConstraint, User, UserRepository};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validators::{looks_like_email, validate_registration};

/// Hashed once and verified against on the unknown-user path, so both
/// login failures cost one Argon2 verification.
const DUMMY_PASSWORD: &str = "shortly-unknown-user-placeholder";

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
    dummy_hash: Option<String>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        let dummy_hash = hash_password(DUMMY_PASSWORD)
            .inspect_err(|e| error!("Failed to prepare placeholder hash: {}", e))
            .ok();
        Self {
            users,
            jwt,
            dummy_hash,
        }
    }

    /// Returns a signed token for valid credentials. Unknown users and wrong
    /// passwords produce the same error.
    pub async fn login(&self, identity: &str, password: &str) -> Result<String> {
        let user = self.find_by_identity(identity).await?;

        let Some(user) = user else {
            if let Some(dummy) = &self.dummy_hash {
                let _ = verify_password(password, dummy);
            }
            info!("Login failed: no user for identity '{}'", identity);
            return Err(ShortlyError::unauthorized("unknown user"));
        };

        if !self.password_matches(&user, password) {
            info!("Login failed: wrong password for '{}'", user.username);
            return Err(ShortlyError::unauthorized("wrong password"));
        }

        let token = self.jwt.issue(user.id, &user.username)?;
        info!("User '{}' logged in", user.username);
        Ok(token)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User> {
        validate_registration(username, email, password).map_err(ShortlyError::validation)?;

        let password_hash = hash_password(password).map_err(|e| {
            error!("Failed to hash password: {}", e);
            ShortlyError::internal(e.to_string())
        })?;

        let user = self
            .users
            .create_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e.unique_constraint() {
                Some(UniqueConstraint::Username) => {
                    ShortlyError::conflict("A user with this username already exists")
                }
                Some(UniqueConstraint::Email) => {
                    ShortlyError::conflict("A user with this email already exists")
                }
                _ => {
                    error!("Failed to create user '{}': {}", username, e);
                    ShortlyError::persistence(e.to_string())
                }
            })?;

        info!("User registered: {}", user.username);
        Ok(user)
    }

    /// Deletes the caller's own account after re-checking the password.
    /// Links the user minted stay, with no owner.
    pub async fn delete_account(&self, caller: &Identity, password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(ShortlyError::validation("password required"));
        }

        let user = self
            .users
            .find_user_by_id(caller.user_id)
            .await
            .map_err(|e| ShortlyError::persistence(e.to_string()))?
            .ok_or_else(|| {
                warn!("Token for missing user {} used to delete account", caller.user_id);
                ShortlyError::unauthorized("unknown user")
            })?;

        if !self.password_matches(&user, password) {
            info!("Account deletion refused: wrong password for '{}'", user.username);
            return Err(ShortlyError::unauthorized("wrong password"));
        }

        let deleted = self
            .users
            .delete_user(user.id)
            .await
            .map_err(|e| ShortlyError::persistence(e.to_string()))?;
        if !deleted {
            return Err(ShortlyError::unauthorized("unknown user"));
        }

        info!("User '{}' deleted their account", user.username);
        Ok(())
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<User>> {
        if identity.is_empty() {
            return Ok(None);
        }

        let lookup = if looks_like_email(identity) {
            self.users.find_user_by_email(identity).await
        } else {
            self.users.find_user_by_username(identity).await
        };

        lookup.map_err(|e| {
            error!("User lookup failed: {}", e);
            ShortlyError::persistence(e.to_string())
        })
    }

    fn password_matches(&self, user: &User, password: &str) -> bool {
        match verify_password(password, &user.password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                error!("Stored hash for '{}' is unusable: {}", user.username, e);
                false
            }
        }
    }
}
