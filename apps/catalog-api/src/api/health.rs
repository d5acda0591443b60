//! Readiness endpoint

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use axum_helpers::{run_health_checks, HealthCheckFuture};
use mongodb::Database;
use serde_json::Value;

/// `GET /ready`: 200 when MongoDB answers a ping, 503 otherwise
async fn ready(State(db): State<Database>) -> (StatusCode, Json<Value>) {
    let mongo: HealthCheckFuture<'_> = Box::pin(async {
        database::mongodb::ping(&db)
            .await
            .map_err(|e| e.to_string())
    });

    run_health_checks(vec![("mongodb", mongo)]).await
}

pub fn router(db: Database) -> Router {
    Router::new().route("/ready", get(ready)).with_state(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use mongodb::Client;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_ready_reports_unreachable_mongodb() {
        // Nothing listens on port 1; server selection gives up quickly
        let client = Client::with_uri_str("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200")
            .await
            .unwrap();
        let app = router(client.database("catalog"));

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "not ready");
        assert_eq!(body["mongodb"], "disconnected");
    }
}
