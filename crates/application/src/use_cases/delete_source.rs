use crate::ports::ReputationRepository;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;
use warden_dns_domain::{DeleteOutcome, DomainError};

/// Use case: remove a source record entirely.
pub struct DeleteSourceUseCase {
    repo: Arc<dyn ReputationRepository>,
}

impl DeleteSourceUseCase {
    pub fn new(repo: Arc<dyn ReputationRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, ip: IpAddr) -> Result<DeleteOutcome, DomainError> {
        debug!(ip = %ip, "Deleting source record");
        self.repo.delete(ip).await
    }
}
