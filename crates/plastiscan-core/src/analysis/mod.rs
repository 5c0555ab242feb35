//! Microplastic analysis.
//!
//! Forwards a sample image to a [`VisionModel`], parses the JSON reply and
//! turns every failure into the fallback result at the boundary.

pub mod model;
pub mod normalize;

use std::sync::Arc;

use tracing::{debug, error, info_span, Instrument};

use crate::error::PlastiscanResult;
use crate::image::DataUrl;
use crate::vision::{self, ImageInput, VisionModel};

use model::{AnalysisRequest, AnalysisResult, ANALYSIS_ERROR_MESSAGE};

/// Runs detection requests against a vision model.
#[derive(Clone)]
pub struct Analyzer {
    model: Arc<dyn VisionModel>,
    structured_output: bool,
}

impl Analyzer {
    pub fn new(model: Arc<dyn VisionModel>, structured_output: bool) -> Self {
        Self {
            model,
            structured_output,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn structured_output(&self) -> bool {
        self.structured_output
    }

    /// Analyze one image and echo it back as `imageUrl`.
    pub async fn analyze(&self, request: &AnalysisRequest) -> PlastiscanResult<AnalysisResult> {
        let url = DataUrl::parse(&request.image)?;

        let text = if self.structured_output {
            let schema = vision::response_schema();
            self.model
                .generate(vision::DETECTION_PROMPT, ImageInput::from(&url), Some(&schema))
                .await?
        } else {
            let prompt = format!("{}\n\n{}", vision::DETECTION_PROMPT, vision::JSON_SHAPE_HINT);
            self.model
                .generate(&prompt, ImageInput::from(&url), None)
                .await?
        };

        // Fences are stripped for structured replies too.
        let analysis = normalize::parse_analysis(vision::extract_json(&text))?;
        debug!(
            detections = analysis.microplastics.len(),
            fragments = analysis.summary.fragment_count,
            fibers = analysis.summary.fiber_count,
            pellets = analysis.summary.pellet_count,
            "Analysis parsed"
        );

        Ok(AnalysisResult::success(request.image.clone(), analysis))
    }

    /// Analyze one image, converting any failure into the fallback result.
    ///
    /// Returns `(ok, result)`; `ok` is false when the fallback was used.
    pub async fn analyze_or_fallback(&self, request: &AnalysisRequest) -> (bool, AnalysisResult) {
        let span = info_span!("analyze", request_id = %uuid::Uuid::new_v4());
        async {
            match self.analyze(request).await {
                Ok(result) => (true, result),
                Err(e) => {
                    error!(error = %e, "Error analyzing image");
                    (false, AnalysisResult::fallback(ANALYSIS_ERROR_MESSAGE))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Ask the model for a free-text description of the image.
    pub async fn describe(&self, request: &AnalysisRequest) -> PlastiscanResult<String> {
        let url = DataUrl::parse(&request.image)?;
        self.model
            .generate(vision::DESCRIBE_PROMPT, ImageInput::from(&url), None)
            .await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;
    use crate::vision::DESCRIBE_PROMPT;

    const IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg==";

    const REPLY: &str = r#"{
        "microplastics": [
            {"label": "Fragment", "box_2d": [0.1, 0.2, 0.3, 0.4]},
            {"label": "Fiber", "box_2d": [0.5, 0.1, 0.7, 0.2]},
            {"label": "Fiber", "box_2d": [0.6, 0.6, 0.8, 0.9]}
        ],
        "summary": {"fragment_count": 1, "fiber_count": 2, "pellet_count": 0}
    }"#;

    fn analyzer(model: Arc<ScriptedModel>, structured: bool) -> Analyzer {
        Analyzer::new(model, structured)
    }

    #[tokio::test]
    async fn test_success_echoes_image() {
        let model = Arc::new(ScriptedModel::replying(REPLY));
        let result = analyzer(model.clone(), true)
            .analyze(&AnalysisRequest::new(IMAGE))
            .await
            .unwrap();

        assert_eq!(result.image_url, IMAGE);
        assert!(result.error.is_none());
        assert_eq!(result.analysis.microplastics.len(), 3);
        assert_eq!(result.analysis.summary.fragment_count, 1);
        assert_eq!(result.analysis.summary.fiber_count, 2);
        assert_eq!(result.analysis.summary.pellet_count, 0);
    }

    #[tokio::test]
    async fn test_structured_call_sends_schema_and_payload() {
        let model = Arc::new(ScriptedModel::replying(REPLY));
        analyzer(model.clone(), true)
            .analyze(&AnalysisRequest::new(IMAGE))
            .await
            .unwrap();

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, vision::DETECTION_PROMPT);
        assert_eq!(calls[0].mime_type, "image/png");
        assert_eq!(calls[0].data, "iVBORw0KGgoAAAANSUhEUg==");
        assert_eq!(calls[0].schema, Some(vision::response_schema()));
    }

    #[tokio::test]
    async fn test_unstructured_call_omits_schema_and_strips_fences() {
        let fenced = format!("```json\n{}\n```", REPLY);
        let model = Arc::new(ScriptedModel::replying(&fenced));
        let result = analyzer(model.clone(), false)
            .analyze(&AnalysisRequest::new(IMAGE))
            .await
            .unwrap();

        assert_eq!(result.analysis.microplastics.len(), 3);
        let calls = model.calls.lock().unwrap();
        assert!(calls[0].schema.is_none());
        assert!(calls[0].prompt.contains("Return ONLY a valid JSON object"));
    }

    #[tokio::test]
    async fn test_uppercase_fence_tag_is_parsed() {
        let fenced = format!("```JSON\n{}\n```", REPLY);
        let model = Arc::new(ScriptedModel::replying(&fenced));
        let (ok, result) = analyzer(model, false)
            .analyze_or_fallback(&AnalysisRequest::new(IMAGE))
            .await;

        assert!(ok);
        assert_eq!(result.analysis.microplastics.len(), 3);
    }

    #[tokio::test]
    async fn test_upstream_failure_falls_back() {
        let model = Arc::new(ScriptedModel::failing(403, "API key not valid"));
        let (ok, result) = analyzer(model, true)
            .analyze_or_fallback(&AnalysisRequest::new(IMAGE))
            .await;

        assert!(!ok);
        assert!(result.analysis.microplastics.is_empty());
        assert_eq!(result.analysis.summary.total(), 0);
        assert_eq!(result.image_url, "");
        assert!(!result.error.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let model = Arc::new(ScriptedModel::replying("```json\nI could not see anything\n```"));
        let (ok, result) = analyzer(model, false)
            .analyze_or_fallback(&AnalysisRequest::new(IMAGE))
            .await;

        assert!(!ok);
        assert!(result.analysis.microplastics.is_empty());
        assert_eq!(result.error.as_deref(), Some(ANALYSIS_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_missing_comma_never_reaches_model() {
        let model = Arc::new(ScriptedModel::replying(REPLY));
        let (ok, result) = analyzer(model.clone(), true)
            .analyze_or_fallback(&AnalysisRequest::new("not-a-data-url"))
            .await;

        assert!(!ok);
        assert!(result.is_error());
        assert!(model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_describe_returns_raw_text() {
        let model = Arc::new(ScriptedModel::replying("A petri dish with blue fibers."));
        let text = analyzer(model.clone(), true)
            .describe(&AnalysisRequest::new(IMAGE))
            .await
            .unwrap();

        assert_eq!(text, "A petri dish with blue fibers.");
        let calls = model.calls.lock().unwrap();
        assert_eq!(calls[0].prompt, DESCRIBE_PROMPT);
        assert!(calls[0].schema.is_none());
    }
}
