use crate::ports::ReputationRepository;
use std::sync::Arc;
use warden_dns_domain::{DomainError, SortField, SourceRecord};

/// Use case: list source records, most recent first by a chosen field.
pub struct RecentSourcesUseCase {
    repo: Arc<dyn ReputationRepository>,
}

impl RecentSourcesUseCase {
    pub fn new(repo: Arc<dyn ReputationRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        sort: SortField,
        limit: u32,
    ) -> Result<Vec<SourceRecord>, DomainError> {
        self.repo.list_recent(sort, limit).await
    }
}
