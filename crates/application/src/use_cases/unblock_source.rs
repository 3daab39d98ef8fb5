use crate::ports::ReputationRepository;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;
use warden_dns_domain::{DomainError, UnblockOutcome};

/// Use case: lift the block on a source address.
pub struct UnblockSourceUseCase {
    repo: Arc<dyn ReputationRepository>,
}

impl UnblockSourceUseCase {
    pub fn new(repo: Arc<dyn ReputationRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, ip: IpAddr) -> Result<UnblockOutcome, DomainError> {
        debug!(ip = %ip, "Unblocking source");
        self.repo.unblock(ip).await
    }
}
