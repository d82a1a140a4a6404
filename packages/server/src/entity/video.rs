use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Public URL of the stored video object.
    pub video_file: String,
    /// Public URL of the stored thumbnail object.
    pub thumbnail: String,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Seconds. NULL when the storage layer could not read the upload's duration.
    pub duration: Option<f64>,
    pub is_published: bool,

    pub owner_id: Uuid,
    #[sea_orm(belongs_to, from = "owner_id", to = "id")]
    pub owner: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
