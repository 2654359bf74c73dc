pub mod short_link;
pub mod user;

pub use short_link::Entity as ShortLinkEntity;
pub use user::Entity as UserEntity;
