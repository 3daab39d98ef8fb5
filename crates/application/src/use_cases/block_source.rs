use crate::ports::ReputationRepository;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;
use warden_dns_domain::{BlockOutcome, DomainError};

/// Use case: block a source address, optionally with a reason.
pub struct BlockSourceUseCase {
    repo: Arc<dyn ReputationRepository>,
}

impl BlockSourceUseCase {
    pub fn new(repo: Arc<dyn ReputationRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        ip: IpAddr,
        reason: Option<String>,
    ) -> Result<BlockOutcome, DomainError> {
        debug!(ip = %ip, "Blocking source");
        self.repo.block(ip, reason).await
    }
}
