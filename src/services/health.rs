//! Service readiness

use crate::{
    error::{AppError, AppResult},
    repository::Repository,
};

#[derive(Clone)]
pub struct HealthService {
    repository: Repository,
}

impl HealthService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Fails with `Unavailable` when the database cannot be reached
    pub async fn check_database(&self) -> AppResult<()> {
        self.repository.health.ping().await.map_err(|e| {
            tracing::warn!("Readiness check failed: {}", e);
            AppError::Unavailable("Database unavailable".to_string())
        })
    }
}
