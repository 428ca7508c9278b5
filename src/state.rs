use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn, create_pool},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = create_pool(&config.database_url, config.max_connections).await?;
        let orm = create_orm_conn(&config.database_url, config.max_connections).await?;
        Ok(Self {
            pool,
            orm,
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
        })
    }
}
