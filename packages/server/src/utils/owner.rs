use std::collections::HashMap;

use sea_orm::*;
use uuid::Uuid;

use crate::entity::user;
use crate::error::AppError;
use crate::models::user::UserSummary;

/// Load the owner projection for a single record.
///
/// A missing owner row means a dangling foreign key, which is an internal
/// error rather than a client one.
pub async fn load_owner<C: ConnectionTrait>(db: &C, owner_id: Uuid) -> Result<UserSummary, AppError> {
    user::Entity::find_by_id(owner_id)
        .one(db)
        .await?
        .map(UserSummary::from)
        .ok_or_else(|| AppError::Internal(format!("Owner {owner_id} missing")))
}

/// Batch-load owner projections for a page of records.
pub async fn load_owners<C: ConnectionTrait>(
    db: &C,
    owner_ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, UserSummary>, AppError> {
    let mut ids: Vec<Uuid> = owner_ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(users
        .into_iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect())
}

/// Pair each record with its owner, failing if any owner is missing.
pub fn attach_owners<T, R>(
    records: Vec<T>,
    owners: &HashMap<Uuid, UserSummary>,
    owner_of: impl Fn(&T) -> Uuid,
    build: impl Fn(T, UserSummary) -> R,
) -> Result<Vec<R>, AppError> {
    records
        .into_iter()
        .map(|record| {
            let owner_id = owner_of(&record);
            let owner = owners
                .get(&owner_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("Owner {owner_id} missing")))?;
            Ok(build(record, owner))
        })
        .collect()
}
