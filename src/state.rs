use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, orm_from_pool},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub auth: Arc<AuthSettings>,
}

#[derive(Debug)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
}

impl AppState {
    pub fn new(pool: DbPool, config: &AppConfig) -> Self {
        Self {
            orm: orm_from_pool(&pool),
            pool,
            auth: Arc::new(AuthSettings {
                jwt_secret: config.jwt_secret.clone(),
                jwt_ttl_hours: config.jwt_ttl_hours,
            }),
        }
    }
}
