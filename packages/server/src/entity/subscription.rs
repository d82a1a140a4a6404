use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Directed "subscriber follows channel" edge. The composite key makes each
/// edge unique; a second insert of the same pair fails with a unique
/// constraint violation. Both ends reference `user`, so an edge cannot
/// outlive either account.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub subscriber_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub channel_id: Uuid,
    #[sea_orm(
        belongs_to,
        relation_enum = "Subscriber",
        from = "subscriber_id",
        to = "id",
        on_delete = "Cascade"
    )]
    pub subscriber: HasOne<super::user::Entity>,
    #[sea_orm(
        belongs_to,
        relation_enum = "Channel",
        from = "channel_id",
        to = "id",
        on_delete = "Cascade"
    )]
    pub channel: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
