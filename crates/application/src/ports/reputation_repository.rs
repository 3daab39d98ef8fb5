use async_trait::async_trait;
use std::net::IpAddr;
use warden_dns_domain::{
    BlockOutcome, DeleteOutcome, DomainError, SortField, SourceRecord, UnblockOutcome,
};

#[async_trait]
pub trait ReputationRepository: Send + Sync {
    /// Report whether `ip` was blocked *before* this call, and record the
    /// observation (hit count, last seen, server label) in the same store
    /// round trip. Creates the record on first sight.
    async fn record_and_check(&self, ip: IpAddr) -> Result<bool, DomainError>;

    /// Block a source. Idempotent: an already-blocked record is left
    /// untouched and its existing reason reported back.
    async fn block(
        &self,
        ip: IpAddr,
        reason: Option<String>,
    ) -> Result<BlockOutcome, DomainError>;

    /// Lift a block. Only affects records currently blocked; clears the memo.
    async fn unblock(&self, ip: IpAddr) -> Result<UnblockOutcome, DomainError>;

    /// Remove a record entirely.
    async fn delete(&self, ip: IpAddr) -> Result<DeleteOutcome, DomainError>;

    /// Point lookup.
    async fn get(&self, ip: IpAddr) -> Result<Option<SourceRecord>, DomainError>;

    /// Records ordered descending by `sort`, at most `limit` of them.
    async fn list_recent(
        &self,
        sort: SortField,
        limit: u32,
    ) -> Result<Vec<SourceRecord>, DomainError>;
}
