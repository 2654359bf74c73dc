//! UserRepository over the `users` table

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use tracing::{info, warn};
use uuid::Uuid;

use super::converters::{model_to_user, new_user_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::storage::{
    NewUser, StorageError, StorageResult, UniqueConstraint, User, UserRepository,
};

use migration::entities::user;

impl SeaOrmStorage {
    async fn find_user_where(
        &self,
        operation: &str,
        filter: sea_orm::Condition,
    ) -> StorageResult<Option<User>> {
        let db = &self.db;
        let model = retry::with_retry(operation, self.retry_config, || async {
            user::Entity::find().filter(filter.clone()).one(db).await
        })
        .await?;

        model.map(model_to_user).transpose()
    }
}

#[async_trait]
impl UserRepository for SeaOrmStorage {
    async fn create_user(&self, new_user: NewUser) -> StorageResult<User> {
        match new_user_to_active_model(&new_user).insert(&self.db).await {
            Ok(model) => {
                info!("User created: {}", model.username);
                model_to_user(model)
            }
            Err(e) => {
                let err = StorageError::from_db_err(e, UniqueConstraint::Username);
                if err.unique_constraint().is_none() {
                    return Err(err);
                }
                // Two unique indexes; whichever value is already taken decides.
                let constraint = match self.find_user_by_username(&new_user.username).await {
                    Ok(Some(_)) => UniqueConstraint::Username,
                    Ok(None) => UniqueConstraint::Email,
                    Err(lookup_err) => {
                        warn!(
                            "Could not attribute unique violation for {}: {}",
                            new_user.username, lookup_err
                        );
                        UniqueConstraint::Username
                    }
                };
                Err(StorageError::unique_violation(constraint, err.message))
            }
        }
    }

    async fn find_user_by_id(&self, id: Uuid) -> StorageResult<Option<User>> {
        self.find_user_where(
            &format!("find_user_by_id({})", id),
            sea_orm::Condition::all().add(user::Column::Id.eq(id.to_string())),
        )
        .await
    }

    async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        self.find_user_where(
            "find_user_by_username",
            sea_orm::Condition::all().add(user::Column::Username.eq(username)),
        )
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        self.find_user_where(
            "find_user_by_email",
            sea_orm::Condition::all().add(user::Column::Email.eq(email)),
        )
        .await
    }

    async fn delete_user(&self, id: Uuid) -> StorageResult<bool> {
        let db = &self.db;
        let id = id.to_string();
        let result = retry::with_retry("delete_user", self.retry_config, || async {
            user::Entity::delete_by_id(id.clone()).exec(db).await
        })
        .await?;

        if result.rows_affected > 0 {
            info!("User deleted: {}", id);
        }
        Ok(result.rows_affected > 0)
    }
}
