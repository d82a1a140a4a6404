use serde::Serialize;
use uuid::Uuid;

use crate::entity::user;

/// Public projection of a user, attached to tweets and videos as their owner.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserSummary {
    #[schema(example = "0192f0c1-9e2b-7c3d-8e4f-5a6b7c8d9e0f")]
    pub id: Uuid,
    #[schema(example = "alice_wonder")]
    pub username: String,
    #[schema(example = "Alice Wonder")]
    pub fullname: String,
    pub avatar: Option<String>,
}

impl From<user::Model> for UserSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            fullname: user.fullname,
            avatar: user.avatar,
        }
    }
}
