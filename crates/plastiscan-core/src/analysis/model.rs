//! Microplastic analysis domain model.
//!
//! Everything here is request-scoped: built for one call and dropped once
//! the response has been rendered.

use serde::{Deserialize, Serialize};

/// Message returned to clients whenever an analysis fails.
pub const ANALYSIS_ERROR_MESSAGE: &str = "Error analyzing image.  Internal Server Error";

/// Body of `POST /api/analyze-image`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Base64 data URL, `data:<mime>;base64,<payload>`.
    pub image: String,
}

impl AnalysisRequest {
    pub fn new(image: impl Into<String>) -> Self {
        Self { image: image.into() }
    }
}

/// Known microplastic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Fragment,
    Fiber,
    Pellet,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Fragment, Category::Fiber, Category::Pellet];

    /// Match a model label against the known categories.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "fragment" | "fragments" => Some(Self::Fragment),
            "fiber" | "fibers" | "fibre" | "fibres" => Some(Self::Fiber),
            "pellet" | "pellets" | "bead" | "beads" => Some(Self::Pellet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fragment => "Fragment",
            Self::Fiber => "Fiber",
            Self::Pellet => "Pellet",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One identified particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Category label as reported by the model. The set is open.
    pub label: String,
    /// Normalized `[xmin, ymin, xmax, ymax]`, each in `[0, 1]`.
    pub box_2d: [f64; 4],
}

impl Detection {
    pub fn category(&self) -> Option<Category> {
        Category::parse(&self.label)
    }

    pub fn xmin(&self) -> f64 {
        self.box_2d[0]
    }

    pub fn ymin(&self) -> f64 {
        self.box_2d[1]
    }

    pub fn xmax(&self) -> f64 {
        self.box_2d[2]
    }

    pub fn ymax(&self) -> f64 {
        self.box_2d[3]
    }
}

/// Per-category particle counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub fragment_count: u32,
    pub fiber_count: u32,
    pub pellet_count: u32,
}

impl AnalysisSummary {
    /// Count detections per known category. Unknown labels are not counted.
    pub fn from_detections(detections: &[Detection]) -> Self {
        let mut summary = Self::default();
        for category in detections.iter().filter_map(Detection::category) {
            *summary.count_mut(category) += 1;
        }
        summary
    }

    pub fn count(&self, category: Category) -> u32 {
        match category {
            Category::Fragment => self.fragment_count,
            Category::Fiber => self.fiber_count,
            Category::Pellet => self.pellet_count,
        }
    }

    fn count_mut(&mut self, category: Category) -> &mut u32 {
        match category {
            Category::Fragment => &mut self.fragment_count,
            Category::Fiber => &mut self.fiber_count,
            Category::Pellet => &mut self.pellet_count,
        }
    }

    pub fn total(&self) -> u32 {
        self.fragment_count + self.fiber_count + self.pellet_count
    }
}

/// Detections plus their summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub microplastics: Vec<Detection>,
    #[serde(default)]
    pub summary: AnalysisSummary,
}

impl Analysis {
    /// Build an analysis whose summary matches the detections.
    pub fn from_detections(microplastics: Vec<Detection>) -> Self {
        let summary = AnalysisSummary::from_detections(&microplastics);
        Self { microplastics, summary }
    }
}

/// Response body of `POST /api/analyze-image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub analysis: Analysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Successful result echoing the input image.
    pub fn success(image_url: impl Into<String>, analysis: Analysis) -> Self {
        Self {
            image_url: image_url.into(),
            analysis,
            error: None,
        }
    }

    /// Empty detections, zero counts and an error message.
    pub fn fallback(message: impl Into<String>) -> Self {
        Self {
            image_url: String::new(),
            analysis: Analysis::default(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
