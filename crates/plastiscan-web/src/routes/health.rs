//! Health route handler.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub model: String,
    pub structured_output: bool,
}

/// GET /api/health - Process liveness and model settings.
///
/// Does not contact the vision model.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        model: state.analyzer.model_name().to_string(),
        structured_output: state.analyzer.structured_output(),
    })
}

#[cfg(test)]
mod tests {
    use crate::testing::*;
    use axum::{body::Body, http::Request};
    use serde_json::json;

    #[tokio::test]
    async fn test_health_report() {
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let (status, json) = send(router(Ok("{}"), false), request).await;
        assert_eq!(status, 200);
        assert_eq!(json, json!({ "status": "ok", "model": "stub-model", "structuredOutput": false }));
    }
}
