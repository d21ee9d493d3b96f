use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    AggregateId, EventEnvelope, EventId, EventMetadata, EventStoreError, Result, Version,
    store::{AppendOptions, EventStore, validate_append_batch},
};

const SELECT_COLUMNS: &str = "id, event_type, aggregate_id, aggregate_type, version, \
     occurred_at, correlation_id, causation_id, issued_by, payload";

/// PostgreSQL-backed event store.
///
/// Appends run inside a transaction: the stream head is read once, the
/// expected-version and continuity checks run against it, and the
/// `(aggregate_id, version)` unique constraint backstops both so two
/// racing writers can never commit the same version. A global `sequence`
/// column preserves append order across streams.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Creates a new PostgreSQL event store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the events table if it does not exist.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::raw_sql(include_str!("../../../migrations/001_create_events_table.sql"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn row_to_event(row: PgRow) -> Result<EventEnvelope> {
        Ok(EventEnvelope {
            event_id: EventId::from_uuid(row.try_get::<Uuid, _>("id")?),
            event_type: row.try_get("event_type")?,
            aggregate_id: AggregateId::from_uuid(row.try_get::<Uuid, _>("aggregate_id")?),
            aggregate_type: row.try_get("aggregate_type")?,
            version: Version::new(row.try_get("version")?),
            payload: row.try_get("payload")?,
            metadata: EventMetadata {
                occurred_at: row.try_get::<DateTime<Utc>, _>("occurred_at")?,
                correlation_id: row.try_get("correlation_id")?,
                causation_id: row.try_get("causation_id")?,
                issued_by: row.try_get("issued_by")?,
            },
        })
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    #[tracing::instrument(skip(self, events), fields(count = events.len()))]
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        validate_append_batch(&events)?;

        let aggregate_id = events[0].aggregate_id;

        let mut tx = self.pool.begin().await?;

        let head: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM events WHERE aggregate_id = $1")
                .bind(aggregate_id.as_uuid())
                .fetch_one(&mut *tx)
                .await?;
        let current = Version::new(head.unwrap_or(0));

        if let Some(expected) = options.expected_version
            && current != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current,
            });
        }

        if events[0].version != current.next() {
            return Err(EventStoreError::InvalidBatch(format!(
                "first event version {} does not continue stream at {}",
                events[0].version, current
            )));
        }

        let mut last_version = Version::initial();
        for event in &events {
            sqlx::query(
                r#"
                INSERT INTO events
                    (id, event_type, aggregate_id, aggregate_type, version,
                     occurred_at, correlation_id, causation_id, issued_by, payload)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(event.event_id.as_uuid())
            .bind(&event.event_type)
            .bind(event.aggregate_id.as_uuid())
            .bind(&event.aggregate_type)
            .bind(event.version.as_i64())
            .bind(event.metadata.occurred_at)
            .bind(event.metadata.correlation_id)
            .bind(event.metadata.causation_id)
            .bind(&event.metadata.issued_by)
            .bind(&event.payload)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                // A racing writer that committed between our MAX read and
                // this insert trips the unique constraint.
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some("unique_aggregate_version")
                {
                    return EventStoreError::ConcurrencyConflict {
                        aggregate_id,
                        expected: options.expected_version.unwrap_or(current),
                        actual: event.version,
                    };
                }
                EventStoreError::Unavailable(e)
            })?;

            last_version = event.version;
        }

        tx.commit().await?;
        Ok(last_version)
    }

    async fn read_stream(&self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>> {
        let sql =
            format!("SELECT {SELECT_COLUMNS} FROM events WHERE aggregate_id = $1 ORDER BY version ASC");
        let rows = sqlx::query(&sql)
            .bind(aggregate_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn current_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM events WHERE aggregate_id = $1")
                .bind(aggregate_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        Ok(version.map(Version::new))
    }

    async fn all_events(&self) -> Result<Vec<EventEnvelope>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM events ORDER BY sequence ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }
}
