//! LinkRepository over the `shortly` table

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ExprTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::converters::{model_to_shortlink, new_shortlink_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::storage::{
    LinkRepository, NewShortLink, ShortLink, StorageError, StorageResult, UniqueConstraint,
};

use migration::entities::short_link;

fn models_to_links(models: Vec<short_link::Model>) -> StorageResult<Vec<ShortLink>> {
    models.into_iter().map(model_to_shortlink).collect()
}

#[async_trait]
impl LinkRepository for SeaOrmStorage {
    async fn create_link(&self, link: NewShortLink) -> StorageResult<ShortLink> {
        // Single attempt: the unique index on short_code is the collision check.
        let model = new_shortlink_to_active_model(&link)
            .insert(&self.db)
            .await
            .map_err(|e| StorageError::from_db_err(e, UniqueConstraint::ShortCode))?;

        info!("Short link created: {}", model.short_code);
        model_to_shortlink(model)
    }

    async fn get_link(&self, short_code: &str) -> StorageResult<Option<ShortLink>> {
        let db = &self.db;
        let model = retry::with_retry(
            &format!("get_link({})", short_code),
            self.retry_config,
            || async {
                short_link::Entity::find()
                    .filter(short_link::Column::ShortCode.eq(short_code))
                    .one(db)
                    .await
            },
        )
        .await?;

        model.map(model_to_shortlink).transpose()
    }

    async fn delete_link(&self, short_code: &str) -> StorageResult<bool> {
        let db = &self.db;
        let result = retry::with_retry(
            &format!("delete_link({})", short_code),
            self.retry_config,
            || async {
                short_link::Entity::delete_many()
                    .filter(short_link::Column::ShortCode.eq(short_code))
                    .exec(db)
                    .await
            },
        )
        .await?;

        if result.rows_affected > 0 {
            info!("Short link deleted: {}", short_code);
        }
        Ok(result.rows_affected > 0)
    }

    async fn increment_clicks(&self, short_code: &str) -> StorageResult<()> {
        let db = &self.db;
        let now = Utc::now();
        let result = retry::with_retry(
            &format!("increment_clicks({})", short_code),
            self.retry_config,
            || async {
                short_link::Entity::update_many()
                    .col_expr(
                        short_link::Column::ClickCount,
                        Expr::col(short_link::Column::ClickCount).add(Expr::val(1i64)),
                    )
                    .col_expr(short_link::Column::UpdatedAt, Expr::val(now))
                    .filter(short_link::Column::ShortCode.eq(short_code))
                    .exec(db)
                    .await
            },
        )
        .await?;

        debug!(
            "Click recorded for {} ({} rows)",
            short_code, result.rows_affected
        );
        Ok(())
    }

    async fn list_links(&self) -> StorageResult<Vec<ShortLink>> {
        let db = &self.db;
        let models = retry::with_retry("list_links", self.retry_config, || async {
            short_link::Entity::find()
                .order_by_desc(short_link::Column::CreatedAt)
                .all(db)
                .await
        })
        .await?;

        models_to_links(models)
    }

    async fn list_links_by_owner(&self, owner: Uuid) -> StorageResult<Vec<ShortLink>> {
        let db = &self.db;
        let owner = owner.to_string();
        let models = retry::with_retry(
            &format!("list_links_by_owner({})", owner),
            self.retry_config,
            || async {
                short_link::Entity::find()
                    .filter(short_link::Column::OwnerUserId.eq(owner.as_str()))
                    .order_by_desc(short_link::Column::CreatedAt)
                    .all(db)
                    .await
            },
        )
        .await?;

        models_to_links(models)
    }
}
