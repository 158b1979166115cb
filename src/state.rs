use std::sync::Arc;

use sqlx::PgPool;

use caseflow_config::{CorsConfig, JwtConfig, ServerConfig, TenantConfig};
use caseflow_db::init_db_pool;
use caseflow_rbac::RoleTable;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub server_config: ServerConfig,
    pub tenant_config: TenantConfig,
    pub roles: Arc<RoleTable>,
}

impl AppState {
    /// State around an existing pool, with every other setting read from the
    /// environment.
    pub fn from_env(db: PgPool) -> anyhow::Result<Self> {
        Ok(Self {
            db,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            server_config: ServerConfig::from_env(),
            tenant_config: TenantConfig::from_env()?,
            roles: Arc::new(RoleTable::standard()),
        })
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let db = init_db_pool(&database_url).await?;

    AppState::from_env(db)
}
