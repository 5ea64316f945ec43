use super::error::Error;
use entity::integrations::{ActiveModel, Column, Entity, Model};
use entity::provider::Provider;
use log::debug;
use sea_orm::{
    entity::prelude::*, sea_query::OnConflict, ActiveValue::Set, DatabaseConnection, QueryOrder,
};

/// Inserts the record, or replaces the existing record for the same
/// (user_id, provider). The existing row keeps its id and created_at.
pub async fn upsert(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    debug!(
        "Upserting integration for user_id: {}, provider: {}, status: {}",
        model.user_id, model.provider, model.status
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(model.id),
        user_id: Set(model.user_id),
        provider: Set(model.provider),
        status: Set(model.status),
        credentials: Set(model.credentials),
        encrypted: Set(model.encrypted),
        connected_at: Set(model.connected_at),
        last_activity: Set(model.last_activity),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(Entity::insert(active_model)
        .on_conflict(
            OnConflict::columns([Column::UserId, Column::Provider])
                .update_columns([
                    Column::Status,
                    Column::Credentials,
                    Column::Encrypted,
                    Column::ConnectedAt,
                    Column::LastActivity,
                    Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(db)
        .await?)
}

/// Finds the integration for a user and provider (unique pair)
pub async fn find_by_user_and_provider(
    db: &DatabaseConnection,
    user_id: &str,
    provider: Provider,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Provider.eq(provider))
        .one(db)
        .await?)
}

/// Finds every integration a user has, oldest first
pub async fn find_by_user(db: &DatabaseConnection, user_id: &str) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Deletes the integration for a user and provider. Returns whether a row existed.
pub async fn delete_by_user_and_provider(
    db: &DatabaseConnection,
    user_id: &str,
    provider: Provider,
) -> Result<bool, Error> {
    debug!("Deleting integration for user_id: {user_id}, provider: {provider}");

    let result = Entity::delete_many()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Provider.eq(provider))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}
