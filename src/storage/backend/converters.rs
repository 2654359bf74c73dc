use sea_orm::ActiveValue::Set;
use uuid::Uuid;

use crate::storage::{NewShortLink, NewUser, ShortLink, StorageError, StorageResult, User};
use migration::entities::{short_link, user};

fn parse_id(column: &str, raw: &str) -> StorageResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| StorageError::other(format!("corrupt {} '{}': {}", column, raw, e)))
}

pub fn model_to_shortlink(model: short_link::Model) -> StorageResult<ShortLink> {
    Ok(ShortLink {
        id: parse_id("shortly.id", &model.id)?,
        owner_user_id: model
            .owner_user_id
            .as_deref()
            .map(|raw| parse_id("shortly.owner_user_id", raw))
            .transpose()?,
        short_code: model.short_code,
        long_url: model.long_url,
        created_at: model.created_at,
        updated_at: model.updated_at,
        click_count: model.click_count.max(0),
    })
}

/// ActiveModel for a fresh insert; the counter starts at zero.
pub fn new_shortlink_to_active_model(link: &NewShortLink) -> short_link::ActiveModel {
    let now = chrono::Utc::now();
    short_link::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        short_code: Set(link.short_code.clone()),
        long_url: Set(link.long_url.clone()),
        owner_user_id: Set(link.owner_user_id.map(|id| id.to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        click_count: Set(0),
    }
}

pub fn model_to_user(model: user::Model) -> StorageResult<User> {
    Ok(User {
        id: parse_id("users.id", &model.id)?,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        created_at: model.created_at,
    })
}

pub fn new_user_to_active_model(new_user: &NewUser) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        username: Set(new_user.username.clone()),
        email: Set(new_user.email.clone()),
        password_hash: Set(new_user.password_hash.clone()),
        created_at: Set(chrono::Utc::now()),
    }
}
