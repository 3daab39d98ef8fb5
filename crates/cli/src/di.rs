use std::sync::Arc;
use warden_dns_application::ports::ReputationRepository;
use warden_dns_application::{
    BlockSourceUseCase, DeleteSourceUseCase, GetSourceUseCase, RecentSourcesUseCase,
    UnblockSourceUseCase,
};
use warden_dns_domain::Config;
use warden_dns_infrastructure::repositories::SqliteReputationRepository;

use crate::bootstrap;

/// Operator-facing use cases wired to the SQLite store.
pub struct UseCases {
    pub block: BlockSourceUseCase,
    pub unblock: UnblockSourceUseCase,
    pub delete: DeleteSourceUseCase,
    pub get: GetSourceUseCase,
    pub recent: RecentSourcesUseCase,
}

impl UseCases {
    pub async fn init(config: &Config) -> anyhow::Result<Self> {
        let database_url = format!("sqlite:{}", config.database.path);
        let pool =
            bootstrap::init_database(&database_url, config.database.max_connections).await?;

        let repo: Arc<dyn ReputationRepository> =
            Arc::new(SqliteReputationRepository::new(pool, &config.server.label));

        Ok(Self {
            block: BlockSourceUseCase::new(repo.clone()),
            unblock: UnblockSourceUseCase::new(repo.clone()),
            delete: DeleteSourceUseCase::new(repo.clone()),
            get: GetSourceUseCase::new(repo.clone()),
            recent: RecentSourcesUseCase::new(repo),
        })
    }
}
