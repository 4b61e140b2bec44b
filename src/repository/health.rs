//! Database connectivity probe

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::HealthRepository;
use crate::error::AppResult;

#[derive(Clone)]
pub struct PgHealthRepository {
    pool: Pool<Postgres>,
}

impl PgHealthRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthRepository for PgHealthRepository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
