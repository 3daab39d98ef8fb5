use crate::ports::ReputationRepository;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::error;

/// Use case: admission decision for one connection or datagram.
///
/// Every packet performs one store round trip; the observation is recorded
/// even when the verdict is "blocked".
pub struct CheckAdmissionUseCase {
    repo: Arc<dyn ReputationRepository>,
}

impl CheckAdmissionUseCase {
    pub fn new(repo: Arc<dyn ReputationRepository>) -> Self {
        Self { repo }
    }

    /// Returns true when the source is blocked. A store failure is logged
    /// and admission fails open, so forwarding keeps working through a
    /// database outage.
    pub async fn execute(&self, ip: IpAddr) -> bool {
        match self.repo.record_and_check(ip).await {
            Ok(blocked) => blocked,
            Err(e) => {
                error!(ip = %ip, error = %e, "Admission check failed, allowing source");
                false
            }
        }
    }
}
