//! Image analysis route handlers.

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use plastiscan_core::analysis::model::{AnalysisRequest, AnalysisResult, ANALYSIS_ERROR_MESSAGE};
use serde::Serialize;

use crate::state::AppState;

/// Response of the free-text description route.
#[derive(Serialize)]
#[serde(untagged)]
pub enum DescribeResponse {
    Results { results: String },
    Error { error: String },
}

/// POST /api/analyze-image - Detect microplastics in an image.
///
/// Always answers with an `AnalysisResult`; failures use the fallback
/// payload and a 500.
pub async fn analyze_image(
    State(state): State<AppState>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> (StatusCode, Json<AnalysisResult>) {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::error!(error = %rejection.body_text(), "Error analyzing image: unreadable request body");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AnalysisResult::fallback(ANALYSIS_ERROR_MESSAGE)),
            );
        }
    };

    let (ok, result) = state.analyzer.analyze_or_fallback(&req).await;
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(result))
}

/// POST /api/analyze - Describe the objects in an image as free text.
pub async fn describe_image(
    State(state): State<AppState>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> (StatusCode, Json<DescribeResponse>) {
    let outcome = match body {
        Ok(Json(req)) => state.analyzer.describe(&req).await.map_err(|e| e.to_string()),
        Err(rejection) => Err(rejection.body_text()),
    };

    match outcome {
        Ok(results) => (StatusCode::OK, Json(DescribeResponse::Results { results })),
        Err(e) => {
            tracing::error!(error = %e, "Error describing image");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DescribeResponse::Error {
                    error: "Error analyzing image".to_string(),
                }),
            )
        }
    }
}
