//! Lenient parsing of the model's JSON reply.
//!
//! The schema keeps well-behaved providers in line, but replies still
//! arrive with 0-1000 coordinates, swapped corners or float counts.
//! Everything is folded into an [`Analysis`] whose boxes satisfy
//! `0 <= min < max <= 1` and whose summary matches the boxes.

use serde::Deserialize;
use serde_json::Value;

use super::model::{Analysis, Detection};
use crate::error::PlastiscanResult;

/// Scale some models use for box coordinates instead of `[0, 1]`.
const PER_MILLE_SCALE: f64 = 1000.0;

/// A box whose largest value is at or below this is on the `[0, 1]` scale,
/// even if it overshoots 1 and needs clamping.
const PER_MILLE_THRESHOLD: f64 = 2.0;

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    microplastics: Vec<RawDetection>,
}

#[derive(Debug, Deserialize)]
struct RawDetection {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    box_2d: Vec<Value>,
}

/// Parse the model's JSON text into a normalized analysis.
///
/// The reported summary is ignored and recomputed from the kept
/// detections.
pub fn parse_analysis(json: &str) -> PlastiscanResult<Analysis> {
    let raw: RawAnalysis = serde_json::from_str(json)?;
    let detections = raw
        .microplastics
        .into_iter()
        .filter_map(normalize_detection)
        .collect();
    Ok(Analysis::from_detections(detections))
}

fn normalize_detection(raw: RawDetection) -> Option<Detection> {
    let label = raw.label?.trim().to_string();
    if label.is_empty() {
        return None;
    }
    let box_2d = normalize_box(&raw.box_2d)?;
    Some(Detection { label, box_2d })
}

/// Normalize a raw `[xmin, ymin, xmax, ymax]` box.
///
/// Returns `None` for anything that is not four finite numbers or that
/// collapses to zero area.
pub fn normalize_box(values: &[Value]) -> Option<[f64; 4]> {
    if values.len() != 4 {
        return None;
    }

    let mut coords = [0.0f64; 4];
    for (slot, value) in coords.iter_mut().zip(values) {
        let v = value.as_f64()?;
        if !v.is_finite() {
            return None;
        }
        *slot = v;
    }

    let max = coords.iter().cloned().fold(f64::MIN, f64::max);
    if max > PER_MILLE_THRESHOLD && max <= PER_MILLE_SCALE {
        for c in coords.iter_mut() {
            *c /= PER_MILLE_SCALE;
        }
    }

    let [x0, y0, x1, y1] = coords.map(|c| c.clamp(0.0, 1.0));
    let (xmin, xmax) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
    let (ymin, ymax) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };

    if xmin >= xmax || ymin >= ymax {
        return None;
    }

    Some([xmin, ymin, xmax, ymax])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_well_formed_reply() {
        let reply = json!({
            "microplastics": [
                {"label": "Fragment", "box_2d": [0.1, 0.2, 0.3, 0.4]},
                {"label": "Fiber", "box_2d": [0.5, 0.5, 0.6, 0.9]}
            ],
            "summary": {"fragment_count": 1, "fiber_count": 1, "pellet_count": 0}
        })
        .to_string();

        let analysis = parse_analysis(&reply).unwrap();
        assert_eq!(analysis.microplastics.len(), 2);
        assert_eq!(analysis.microplastics[0].box_2d, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(analysis.summary.fragment_count, 1);
        assert_eq!(analysis.summary.fiber_count, 1);
        assert_eq!(analysis.summary.pellet_count, 0);
    }

    #[test]
    fn test_summary_recomputed_from_detections() {
        let reply = json!({
            "microplastics": [{"label": "Pellet", "box_2d": [0.1, 0.1, 0.2, 0.2]}],
            "summary": {"fragment_count": -3, "fiber_count": 2.5, "pellet_count": 9}
        })
        .to_string();

        let analysis = parse_analysis(&reply).unwrap();
        assert_eq!(analysis.summary.fragment_count, 0);
        assert_eq!(analysis.summary.fiber_count, 0);
        assert_eq!(analysis.summary.pellet_count, 1);
    }

    #[test]
    fn test_missing_keys_yield_empty_analysis() {
        let analysis = parse_analysis("{}").unwrap();
        assert!(analysis.microplastics.is_empty());
        assert_eq!(analysis.summary.total(), 0);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(parse_analysis("not json").is_err());
        assert!(parse_analysis("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_drops_bad_detections() {
        let reply = json!({
            "microplastics": [
                {"label": "Fragment", "box_2d": [0.1, 0.2, 0.3]},
                {"label": "Fragment", "box_2d": [0.1, "a", 0.3, 0.4]},
                {"label": "", "box_2d": [0.1, 0.2, 0.3, 0.4]},
                {"box_2d": [0.1, 0.2, 0.3, 0.4]},
                {"label": "Fiber", "box_2d": [0.3, 0.3, 0.3, 0.5]},
                {"label": " Fiber ", "box_2d": [0.3, 0.3, 0.4, 0.5]}
            ]
        })
        .to_string();

        let analysis = parse_analysis(&reply).unwrap();
        assert_eq!(analysis.microplastics.len(), 1);
        assert_eq!(analysis.microplastics[0].label, "Fiber");
    }

    #[test]
    fn test_per_mille_coordinates_are_rescaled() {
        let values = vec![json!(100), json!(200), json!(300), json!(400)];
        assert_eq!(normalize_box(&values), Some([0.1, 0.2, 0.3, 0.4]));
    }

    #[test]
    fn test_swapped_corners_are_reordered() {
        let values = vec![json!(0.3), json!(0.4), json!(0.1), json!(0.2)];
        assert_eq!(normalize_box(&values), Some([0.1, 0.2, 0.3, 0.4]));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let values = vec![json!(-0.2), json!(0.5), json!(0.5), json!(1.0)];
        assert_eq!(normalize_box(&values), Some([0.0, 0.5, 0.5, 1.0]));

        let values = vec![json!(0.0), json!(0.0), json!(2000), json!(0.5)];
        let b = normalize_box(&values).unwrap();
        assert_eq!(b, [0.0, 0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_slight_overshoot_is_clamped_not_rescaled() {
        let values = vec![json!(0.5), json!(0.5), json!(1.02), json!(0.9)];
        assert_eq!(normalize_box(&values), Some([0.5, 0.5, 1.0, 0.9]));

        let values = vec![json!(0.0), json!(0.0), json!(1.0000001), json!(1.0)];
        assert_eq!(normalize_box(&values), Some([0.0, 0.0, 1.0, 1.0]));
    }

    #[test]
    fn test_small_per_mille_box_is_rescaled() {
        let values = vec![json!(1), json!(1), json!(3), json!(3)];
        assert_eq!(normalize_box(&values), Some([0.001, 0.001, 0.003, 0.003]));
    }
}
