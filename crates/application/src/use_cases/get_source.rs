use crate::ports::ReputationRepository;
use std::net::IpAddr;
use std::sync::Arc;
use warden_dns_domain::{DomainError, SourceRecord};

/// Use case: look up the record for one source address.
pub struct GetSourceUseCase {
    repo: Arc<dyn ReputationRepository>,
}

impl GetSourceUseCase {
    pub fn new(repo: Arc<dyn ReputationRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, ip: IpAddr) -> Result<Option<SourceRecord>, DomainError> {
        self.repo.get(ip).await
    }
}
