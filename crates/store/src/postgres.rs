use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    AggregateId, EventEnvelope, EventId, EventQuery, Result, StoreError,
    repository::{
        Entity, EventLog, Filter, HealthCheck, Repository, record_write,
    },
};

const EVENT_COLUMNS: &str =
    "id, event_type, aggregate_id, aggregate_type, occurred_on, payload, metadata";

/// PostgreSQL-backed store.
///
/// Each entity kind lives in its own table of JSONB documents; domain events
/// go to the shared `domain_events` table. Every write runs in a single
/// database transaction covering the document and its events.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_entity<E: Entity>(row: PgRow) -> Result<E> {
        let data: serde_json::Value = row.try_get("data")?;
        Ok(serde_json::from_value(data)?)
    }

    fn row_to_event(row: PgRow) -> Result<EventEnvelope> {
        let metadata_json: serde_json::Value = row.try_get("metadata")?;
        let metadata: HashMap<String, serde_json::Value> = serde_json::from_value(metadata_json)?;

        Ok(EventEnvelope {
            event_id: EventId::from_uuid(row.try_get::<Uuid, _>("id")?),
            event_type: row.try_get("event_type")?,
            aggregate_id: AggregateId::from_uuid(row.try_get::<Uuid, _>("aggregate_id")?),
            aggregate_type: row.try_get("aggregate_type")?,
            occurred_on: row.try_get("occurred_on")?,
            payload: row.try_get("payload")?,
            metadata,
        })
    }

    async fn append_events(
        tx: &mut Transaction<'_, Postgres>,
        events: &[EventEnvelope],
    ) -> Result<()> {
        for event in events {
            let metadata_json = serde_json::to_value(&event.metadata)?;

            sqlx::query(
                r#"
                INSERT INTO domain_events (id, event_type, aggregate_id, aggregate_type, occurred_on, payload, metadata)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(event.event_id.as_uuid())
            .bind(&event.event_type)
            .bind(event.aggregate_id.as_uuid())
            .bind(&event.aggregate_type)
            .bind(event.occurred_on)
            .bind(&event.payload)
            .bind(metadata_json)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for PostgresStore {
    async fn get_by_id(&self, id: AggregateId) -> Result<Option<E>> {
        let sql = format!("SELECT data FROM {} WHERE id = $1", E::TABLE);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_entity).transpose()
    }

    async fn list(&self) -> Result<Vec<E>> {
        let sql = format!("SELECT data FROM {} ORDER BY created_at ASC, id ASC", E::TABLE);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_entity).collect()
    }

    async fn find_by(&self, filter: Filter) -> Result<Vec<E>> {
        if filter.is_empty() {
            return Repository::<E>::list(self).await;
        }

        let sql = format!(
            "SELECT data FROM {} WHERE data @> $1 ORDER BY created_at ASC, id ASC",
            E::TABLE
        );
        let rows = sqlx::query(&sql)
            .bind(filter.to_json())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_entity).collect()
    }

    async fn add(&self, entity: &mut E) -> Result<()> {
        let id = entity.entity_id();
        let data = serde_json::to_value(&*entity)?;
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO {} (id, data) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
            E::TABLE
        );
        let inserted = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(data)
            .execute(&mut *tx)
            .await?;
        if inserted.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists { kind: E::KIND, id });
        }

        let events = entity.take_events()?;
        Self::append_events(&mut tx, &events).await?;
        tx.commit().await?;

        record_write(E::KIND, "add", events.len());
        Ok(())
    }

    async fn update(&self, entity: &mut E) -> Result<()> {
        let id = entity.entity_id();
        let data = serde_json::to_value(&*entity)?;
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE {} SET data = $2, updated_at = NOW() WHERE id = $1",
            E::TABLE
        );
        let updated = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(data)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound { kind: E::KIND, id });
        }

        let events = entity.take_events()?;
        Self::append_events(&mut tx, &events).await?;
        tx.commit().await?;

        record_write(E::KIND, "update", events.len());
        Ok(())
    }

    async fn save(&self, entity: &mut E) -> Result<()> {
        let id = entity.entity_id();
        let data = serde_json::to_value(&*entity)?;
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO {} (id, data) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET
                data = EXCLUDED.data,
                updated_at = NOW()
            "#,
            E::TABLE
        );
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(data)
            .execute(&mut *tx)
            .await?;

        let events = entity.take_events()?;
        Self::append_events(&mut tx, &events).await?;
        tx.commit().await?;

        record_write(E::KIND, "save", events.len());
        Ok(())
    }

    async fn delete(&self, entity: &mut E) -> Result<()> {
        let id = entity.entity_id();
        let mut tx = self.pool.begin().await?;

        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let deleted = sqlx::query(&sql)
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound { kind: E::KIND, id });
        }

        let events = entity.take_events()?;
        Self::append_events(&mut tx, &events).await?;
        tx.commit().await?;

        record_write(E::KIND, "delete", events.len());
        Ok(())
    }
}

#[async_trait]
impl EventLog for PostgresStore {
    async fn events_for(&self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM domain_events WHERE aggregate_id = $1 ORDER BY position ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(aggregate_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>> {
        let mut sql = format!("SELECT {EVENT_COLUMNS} FROM domain_events WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.aggregate_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND aggregate_id = ${param_count}"));
        }
        if query.aggregate_type.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND aggregate_type = ${param_count}"));
        }
        if query.event_types.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND event_type = ANY(${param_count})"));
        }
        if query.from_timestamp.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND occurred_on >= ${param_count}"));
        }
        if query.to_timestamp.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND occurred_on <= ${param_count}"));
        }

        sql.push_str(" ORDER BY occurred_on ASC, position ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(id) = query.aggregate_id {
            sqlx_query = sqlx_query.bind(id.as_uuid());
        }
        if let Some(aggregate_type) = query.aggregate_type {
            sqlx_query = sqlx_query.bind(aggregate_type);
        }
        if let Some(event_types) = query.event_types {
            sqlx_query = sqlx_query.bind(event_types);
        }
        if let Some(from_ts) = query.from_timestamp {
            sqlx_query = sqlx_query.bind(from_ts);
        }
        if let Some(to_ts) = query.to_timestamp {
            sqlx_query = sqlx_query.bind(to_ts);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_event).collect()
    }
}

#[async_trait]
impl HealthCheck for PostgresStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
