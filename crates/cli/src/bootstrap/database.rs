use sqlx::SqlitePool;
use tracing::{error, info};
use warden_dns_infrastructure::database::create_pool;

pub async fn init_database(
    database_url: &str,
    max_connections: u32,
) -> anyhow::Result<SqlitePool> {
    info!("Initializing reputation database: {}", database_url);

    let pool = create_pool(database_url, max_connections)
        .await
        .map_err(|e| {
            error!("Failed to initialize database pool: {}", e);
            anyhow::anyhow!(e)
        })?;

    Ok(pool)
}
