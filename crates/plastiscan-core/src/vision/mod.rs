//! Vision model integration.
//!
//! Holds the fixed detection prompt, the structured-output schema sent
//! alongside it, and the [`VisionModel`] seam the analyzer talks to.

pub mod gemini;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::PlastiscanResult;
use crate::image::DataUrl;

pub use gemini::GeminiClient;

/// Instruction sent with every detection request.
pub const DETECTION_PROMPT: &str = "You are an expert in microplastic detection. Analyze the provided image of a water sample and identify any microplastics present.
Return an array of all detected microplastics, including their label and bounding box.
Each bounding box is [xmin, ymin, xmax, ymax], normalized to the range 0 to 1 relative to the image width and height.
Also, provide a summary with the total count for each type of microplastic: 'Fragment', 'Fiber', and 'Pellet'.
If no microplastics are detected, return an empty array for the \"microplastics\" key and a count of 0 for each summary field.";

/// Appended to [`DETECTION_PROMPT`] when the provider gets no schema.
pub const JSON_SHAPE_HINT: &str = r#"Return ONLY a valid JSON object (no markdown, no explanation) matching this exact structure:
{"microplastics": [{"label": "Fragment", "box_2d": [0.1, 0.2, 0.3, 0.4]}], "summary": {"fragment_count": 1, "fiber_count": 0, "pellet_count": 0}}"#;

/// Instruction for the free-text description route.
pub const DESCRIBE_PROMPT: &str = "What are the objects in this image?";

/// An image ready to be sent to a vision model.
#[derive(Debug, Clone, Copy)]
pub struct ImageInput<'a> {
    pub mime_type: &'a str,
    /// Base64 payload without the data-URL prefix.
    pub data: &'a str,
}

impl<'a> From<&'a DataUrl<'a>> for ImageInput<'a> {
    fn from(url: &'a DataUrl<'a>) -> Self {
        Self {
            mime_type: &url.mime_type,
            data: url.data,
        }
    }
}

/// A generative model that can answer a prompt about an image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Send `prompt` and `image`; constrain the reply with `schema` when given.
    ///
    /// Returns the model's text reply.
    async fn generate(
        &self,
        prompt: &str,
        image: ImageInput<'_>,
        schema: Option<&Value>,
    ) -> PlastiscanResult<String>;

    /// Model identifier, for logs and health output.
    fn model_name(&self) -> &str;
}

/// Structured-output schema for the detection reply.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "microplastics": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "label": {
                            "type": "STRING",
                            "description": "The type of microplastic (e.g., 'Fragment', 'Fiber', 'Pellet')."
                        },
                        "box_2d": {
                            "type": "ARRAY",
                            "items": { "type": "NUMBER" },
                            "description": "Normalized bounding box coordinates [xmin, ymin, xmax, ymax]."
                        }
                    },
                    "required": ["label", "box_2d"]
                }
            },
            "summary": {
                "type": "OBJECT",
                "properties": {
                    "fragment_count": {
                        "type": "NUMBER",
                        "description": "Total number of 'Fragment' type microplastics detected."
                    },
                    "fiber_count": {
                        "type": "NUMBER",
                        "description": "Total number of 'Fiber' type microplastics detected."
                    },
                    "pellet_count": {
                        "type": "NUMBER",
                        "description": "Total number of 'Pellet' type microplastics detected."
                    }
                },
                "required": ["fragment_count", "fiber_count", "pellet_count"]
            }
        },
        "required": ["microplastics", "summary"]
    })
}

/// Extract JSON from a string that might be wrapped in markdown code blocks.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    // ``` ... ``` with an optional language tag on the opening line
    if let Some(start) = trimmed.find("```") {
        let after_marker = &trimmed[start + 3..];
        if let Some(end) = after_marker.find("```") {
            let block = &after_marker[..end];
            let body = match block.find('\n') {
                Some(nl) if !block[..nl].contains(|c: char| c == '{' || c == '[') => &block[nl + 1..],
                _ => block,
            };
            let body = body.trim();
            if body.starts_with('{') || body.starts_with('[') || !body.contains('{') {
                return body;
            }
        }
    }

    // Outermost object
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            return &trimmed[start..=end];
        }
    }

    trimmed
}
