use chrono::{DateTime, Utc};
use contracts::domain::common::Record;
use contracts::shared::collection_key::CollectionKey;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub collection: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Запись целиком, JSON в camelCase
    pub payload: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn decode<T: Record>(m: Model) -> Option<T> {
    match serde_json::from_str::<T>(&m.payload) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!("skipping unreadable {}/{}: {}", m.collection, m.id, e);
            None
        }
    }
}

fn active_model<T: Record>(record: &T) -> anyhow::Result<ActiveModel> {
    let meta = record.metadata();
    Ok(ActiveModel {
        collection: Set(T::collection().resource().to_string()),
        id: Set(record.id().to_string()),
        payload: Set(serde_json::to_string(record)?),
        created_at: Set(meta.created_at),
        updated_at: Set(meta.updated_at),
    })
}

/// Коллекция целиком, новые записи первыми
pub async fn list_all<T: Record>(conn: &DatabaseConnection) -> anyhow::Result<Vec<T>> {
    let rows = Entity::find()
        .filter(Column::Collection.eq(T::collection().resource()))
        .order_by_desc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(conn)
        .await?;
    Ok(rows.into_iter().filter_map(decode::<T>).collect())
}

pub async fn get_by_id<T: Record>(conn: &DatabaseConnection, id: &str) -> anyhow::Result<Option<T>> {
    let row = Entity::find_by_id((T::collection().resource().to_string(), id.to_string()))
        .one(conn)
        .await?;
    Ok(row.and_then(decode::<T>))
}

pub async fn exists(conn: &DatabaseConnection, collection: CollectionKey, id: &str) -> anyhow::Result<bool> {
    let count = Entity::find()
        .filter(Column::Collection.eq(collection.resource()))
        .filter(Column::Id.eq(id))
        .count(conn)
        .await?;
    Ok(count > 0)
}

pub async fn insert<T: Record>(conn: &DatabaseConnection, record: &T) -> anyhow::Result<()> {
    active_model(record)?.insert(conn).await?;
    Ok(())
}

pub async fn update<T: Record>(conn: &DatabaseConnection, record: &T) -> anyhow::Result<()> {
    let mut active = active_model(record)?;
    // created_at не переписываем
    active.created_at = NotSet;
    active.update(conn).await?;
    Ok(())
}

pub async fn delete(conn: &DatabaseConnection, collection: CollectionKey, id: &str) -> anyhow::Result<bool> {
    let result = Entity::delete_many()
        .filter(Column::Collection.eq(collection.resource()))
        .filter(Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}
