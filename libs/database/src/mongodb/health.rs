use mongodb::Database;
use mongodb::bson::doc;
use std::time::Instant;

use crate::common::{DatabaseError, DatabaseResult};

/// Outcome of a readiness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

/// `ping` the database, failing with [`DatabaseError::HealthCheckFailed`]
pub async fn ping(db: &Database) -> DatabaseResult<()> {
    db.run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))
}

/// Timed `ping` for readiness endpoints
pub async fn check_health(db: &Database) -> HealthStatus {
    let start = Instant::now();
    let outcome = ping(db).await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(()) => HealthStatus {
            healthy: true,
            message: None,
            response_time_ms,
        },
        Err(e) => HealthStatus {
            healthy: false,
            message: Some(e.to_string()),
            response_time_ms,
        },
    }
}
