use async_trait::async_trait;
use sqlx::SqlitePool;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{error, instrument};
use warden_dns_application::ports::ReputationRepository;
use warden_dns_domain::{
    BlockOutcome, DeleteOutcome, DomainError, SortField, SourceRecord, UnblockOutcome,
};

/// Row shape shared by every SELECT over the sources table.
type SourceRow = (i64, String, Option<String>, Option<String>, i64, String, bool);

pub struct SqliteReputationRepository {
    pool: SqlitePool,
    server_label: Arc<str>,
}

impl SqliteReputationRepository {
    pub fn new(pool: SqlitePool, server_label: &str) -> Self {
        Self {
            pool,
            server_label: Arc::from(server_label),
        }
    }

    fn row_to_record(row: SourceRow) -> Option<SourceRecord> {
        let (id, ip, memo, server, hit_count, last_seen, blocked) = row;

        Some(SourceRecord {
            id: Some(id),
            ip: ip.parse().ok()?,
            memo: memo.map(|s| Arc::from(s.as_str())),
            server: server.map(|s| Arc::from(s.as_str())),
            hit_count: hit_count as u64,
            last_seen: Some(last_seen),
            blocked,
        })
    }
}

#[async_trait]
impl ReputationRepository for SqliteReputationRepository {
    #[instrument(skip(self))]
    async fn record_and_check(&self, ip: IpAddr) -> Result<bool, DomainError> {
        let ip_str = ip.to_string();

        // Single statement: the upsert never touches `blocked`, so the value
        // RETURNING hands back is the pre-call state even under concurrent
        // writers. New rows come back unblocked.
        let (blocked,): (bool,) = sqlx::query_as(
            "INSERT INTO sources (ip, server, hit_count, last_seen)
             VALUES (?, ?, 1, CURRENT_TIMESTAMP)
             ON CONFLICT(ip) DO UPDATE SET
                 hit_count = hit_count + 1,
                 last_seen = CURRENT_TIMESTAMP,
                 server = excluded.server
             RETURNING blocked",
        )
        .bind(&ip_str)
        .bind(self.server_label.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, ip = %ip, "Failed to record observation");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(blocked)
    }

    #[instrument(skip(self))]
    async fn block(
        &self,
        ip: IpAddr,
        reason: Option<String>,
    ) -> Result<BlockOutcome, DomainError> {
        let ip_str = ip.to_string();

        // Conditional upsert: an already-blocked row fails the WHERE and is
        // left untouched, reported via rows_affected. A new row starts its
        // hit count at 1; an existing row keeps its counter.
        let result = sqlx::query(
            "INSERT INTO sources (ip, memo, server, hit_count, last_seen, blocked)
             VALUES (?, ?, ?, 1, CURRENT_TIMESTAMP, 1)
             ON CONFLICT(ip) DO UPDATE SET
                 memo = excluded.memo,
                 server = excluded.server,
                 last_seen = CURRENT_TIMESTAMP,
                 blocked = 1
             WHERE sources.blocked = 0",
        )
        .bind(&ip_str)
        .bind(&reason)
        .bind(self.server_label.as_ref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, ip = %ip, "Failed to block source");
            DomainError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            let existing: Option<(Option<String>,)> =
                sqlx::query_as("SELECT memo FROM sources WHERE ip = ?")
                    .bind(&ip_str)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| {
                        error!(error = %e, ip = %ip, "Failed to read existing block reason");
                        DomainError::DatabaseError(e.to_string())
                    })?;

            return Ok(BlockOutcome::AlreadyBlocked {
                reason: existing.and_then(|r| r.0),
            });
        }

        Ok(BlockOutcome::Blocked)
    }

    #[instrument(skip(self))]
    async fn unblock(&self, ip: IpAddr) -> Result<UnblockOutcome, DomainError> {
        let ip_str = ip.to_string();

        let previous: Option<(Option<String>,)> =
            sqlx::query_as("SELECT memo FROM sources WHERE ip = ? AND blocked = 1")
                .bind(&ip_str)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    error!(error = %e, ip = %ip, "Failed to read block reason");
                    DomainError::DatabaseError(e.to_string())
                })?;

        let result = sqlx::query(
            "UPDATE sources SET blocked = 0, memo = NULL, last_seen = CURRENT_TIMESTAMP
             WHERE ip = ? AND blocked = 1",
        )
        .bind(&ip_str)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, ip = %ip, "Failed to unblock source");
            DomainError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Ok(UnblockOutcome::NotBlocked);
        }

        Ok(UnblockOutcome::Unblocked {
            previous_reason: previous.and_then(|r| r.0),
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, ip: IpAddr) -> Result<DeleteOutcome, DomainError> {
        let ip_str = ip.to_string();

        let existing: Option<(Option<String>,)> =
            sqlx::query_as("SELECT memo FROM sources WHERE ip = ?")
                .bind(&ip_str)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    error!(error = %e, ip = %ip, "Failed to read source record");
                    DomainError::DatabaseError(e.to_string())
                })?;

        let result = sqlx::query("DELETE FROM sources WHERE ip = ?")
            .bind(&ip_str)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, ip = %ip, "Failed to delete source record");
                DomainError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Ok(DeleteOutcome::NotFound);
        }

        Ok(DeleteOutcome::Deleted {
            memo: existing.and_then(|r| r.0),
        })
    }

    #[instrument(skip(self))]
    async fn get(&self, ip: IpAddr) -> Result<Option<SourceRecord>, DomainError> {
        let row: Option<SourceRow> = sqlx::query_as(
            "SELECT id, ip, memo, server, hit_count,
                    datetime(last_seen) as last_seen,
                    blocked
             FROM sources WHERE ip = ?",
        )
        .bind(ip.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, ip = %ip, "Failed to fetch source record");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.and_then(Self::row_to_record))
    }

    #[instrument(skip(self))]
    async fn list_recent(
        &self,
        sort: SortField,
        limit: u32,
    ) -> Result<Vec<SourceRecord>, DomainError> {
        // `as_column` comes from the closed SortField enumeration; operator
        // input never reaches the query text.
        let sql = format!(
            "SELECT id, ip, memo, server, hit_count,
                    datetime(last_seen) as last_seen,
                    blocked
             FROM sources ORDER BY {} DESC LIMIT ?",
            sort.as_column(),
        );

        let rows: Vec<SourceRow> = sqlx::query_as(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list source records");
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(rows.into_iter().filter_map(Self::row_to_record).collect())
    }
}
