use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub username: String,
    pub fullname: String,
    /// Avatar image URL.
    pub avatar: Option<String>,
    /// Argon2 PHC string.
    pub password: String,

    #[sea_orm(has_many)]
    pub tweets: HasMany<super::tweet::Entity>,

    #[sea_orm(has_many)]
    pub videos: HasMany<super::video::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
