//! Overlay geometry: scale normalized boxes to a rendered image.

use serde::Serialize;

use crate::analysis::model::{Analysis, Detection};

/// Pixel size of the image as it is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSize {
    pub width: f64,
    pub height: f64,
}

impl RenderSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A box positioned in rendered-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl OverlayBox {
    pub fn from_detection(detection: &Detection, size: RenderSize) -> Self {
        let [xmin, ymin, xmax, ymax] = detection.box_2d;
        Self {
            left: xmin * size.width,
            top: ymin * size.height,
            width: (xmax - xmin) * size.width,
            height: (ymax - ymin) * size.height,
        }
    }
}

/// An overlay box with the label it should display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelledOverlay {
    pub label: String,
    #[serde(flatten)]
    pub rect: OverlayBox,
}

/// Position every detection of an analysis on the rendered image.
pub fn layout(analysis: &Analysis, size: RenderSize) -> Vec<LabelledOverlay> {
    analysis
        .microplastics
        .iter()
        .map(|d| LabelledOverlay {
            label: d.label.clone(),
            rect: OverlayBox::from_detection(d, size),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn test_scales_to_rendered_size() {
        let detection = Detection {
            label: "Fragment".to_string(),
            box_2d: [0.1, 0.2, 0.3, 0.4],
        };
        let rect = OverlayBox::from_detection(&detection, RenderSize::new(800.0, 600.0));
        assert_close(rect.left, 80.0);
        assert_close(rect.top, 120.0);
        assert_close(rect.width, 160.0);
        assert_close(rect.height, 120.0);
    }

    #[test]
    fn test_full_frame_box() {
        let detection = Detection {
            label: "Pellet".to_string(),
            box_2d: [0.0, 0.0, 1.0, 1.0],
        };
        let rect = OverlayBox::from_detection(&detection, RenderSize::new(320.0, 240.0));
        assert_eq!(rect, OverlayBox { left: 0.0, top: 0.0, width: 320.0, height: 240.0 });
    }

    #[test]
    fn test_layout_keeps_labels_and_order() {
        let analysis = Analysis::from_detections(vec![
            Detection { label: "Fiber".to_string(), box_2d: [0.5, 0.5, 0.75, 1.0] },
            Detection { label: "Film".to_string(), box_2d: [0.0, 0.0, 0.25, 0.5] },
        ]);
        let overlays = layout(&analysis, RenderSize::new(400.0, 200.0));
        assert_eq!(overlays.len(), 2);
        assert_eq!(overlays[0].label, "Fiber");
        assert_close(overlays[0].rect.left, 200.0);
        assert_close(overlays[0].rect.height, 100.0);
        assert_eq!(overlays[1].label, "Film");
        assert_close(overlays[1].rect.width, 100.0);
    }

    #[test]
    fn test_serializes_flat() {
        let overlay = LabelledOverlay {
            label: "Fiber".to_string(),
            rect: OverlayBox { left: 1.0, top: 2.0, width: 3.0, height: 4.0 },
        };
        let json = serde_json::to_value(&overlay).unwrap();
        assert_eq!(json, serde_json::json!({"label": "Fiber", "left": 1.0, "top": 2.0, "width": 3.0, "height": 4.0}));
    }
}
