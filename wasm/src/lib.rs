//! WebAssembly module for the Coffee Roast Tracker
//!
//! Provides the live calculations behind the roast form:
//! - Time field normalization and MM:SS conversion
//! - Cooling start, development time and DTR
//! - Weight loss
//! - Blend validation and batch allocation

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use shared::{BlendComponent, RoastCheckpoints, RoastMetrics};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&"Coffee roast tracker calculators loaded".into());
}

// ============================================================================
// Time fields
// ============================================================================

/// Clean a time field on every keystroke
#[wasm_bindgen]
pub fn normalize_time_input(raw: &str) -> String {
    shared::normalize_time_input(raw)
}

/// Zero-pad a time field when it loses focus
#[wasm_bindgen]
pub fn finalize_time_input(raw: &str) -> String {
    shared::finalize_time_input(raw)
}

#[wasm_bindgen]
pub fn parse_time(input: &str) -> u32 {
    shared::parse_time(input)
}

#[wasm_bindgen]
pub fn format_time(seconds: u32) -> String {
    shared::format_time(seconds)
}

/// Cooling start for a Final time, or an empty string when Final is unset
#[wasm_bindgen]
pub fn cooling_start_time(final_time: &str) -> String {
    shared::derive_cooling_start(shared::parse_checkpoint_time(final_time))
        .map(shared::format_time)
        .unwrap_or_default()
}

// ============================================================================
// Roast metrics
// ============================================================================

/// Weight loss percentage, rounded to 2 decimals
#[wasm_bindgen]
pub fn calculate_roast_weight_loss(green_weight: f64, roasted_weight: f64) -> Option<f64> {
    shared::derive_weight_loss(to_decimal(green_weight), to_decimal(roasted_weight))
        .and_then(|loss| loss.to_f64())
}

/// Times as typed into the roast form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetricsRequest {
    final_time: Option<String>,
    fcs_time: Option<String>,
    cooling_start_time: Option<String>,
    cooling_tp_time: Option<String>,
    green_weight: Option<Decimal>,
    roasted_weight: Option<Decimal>,
}

/// Derive every roast metric from a JSON form snapshot
#[wasm_bindgen]
pub fn calculate_roast_metrics(request_json: &str) -> Result<String, JsValue> {
    roast_metrics_json(request_json).map_err(|e| JsValue::from_str(&e))
}

fn roast_metrics_json(request_json: &str) -> Result<String, String> {
    let request: MetricsRequest = serde_json::from_str(request_json)
        .map_err(|e| format!("Invalid metrics JSON: {}", e))?;

    let time = |field: &Option<String>| field.as_deref().and_then(shared::parse_checkpoint_time);

    let mut checkpoints = RoastCheckpoints::default();
    checkpoints.final_point.time_seconds = time(&request.final_time);
    checkpoints.first_crack_start.time_seconds = time(&request.fcs_time);
    checkpoints.cooling_start.time_seconds = time(&request.cooling_start_time);
    checkpoints.cooling_turning_point.time_seconds = time(&request.cooling_tp_time);

    let metrics =
        RoastMetrics::derive(&checkpoints, request.green_weight, request.roasted_weight);
    serde_json::to_string(&metrics).map_err(|e| e.to_string())
}

// ============================================================================
// Blends
// ============================================================================

#[derive(Debug, Serialize)]
struct BlendCheck {
    valid: bool,
    total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Check that blend components total exactly 100%
#[wasm_bindgen]
pub fn validate_blend(components_json: &str) -> Result<String, JsValue> {
    blend_check_json(components_json).map_err(|e| JsValue::from_str(&e))
}

fn blend_check_json(components_json: &str) -> Result<String, String> {
    let components = parse_components(components_json)?;
    let percentages: Vec<Decimal> = components.iter().map(|c| c.percentage).collect();

    let check = match shared::validate_blend_percentages(&percentages) {
        Ok(()) => BlendCheck {
            valid: true,
            total: percentages.iter().sum(),
            error: None,
        },
        Err(message) => BlendCheck {
            valid: false,
            total: percentages.iter().sum(),
            error: Some(message.to_string()),
        },
    };
    serde_json::to_string(&check).map_err(|e| e.to_string())
}

/// Split a batch weight across blend components
#[wasm_bindgen]
pub fn allocate_blend(components_json: &str, total_grams: f64) -> Result<String, JsValue> {
    allocation_json(components_json, total_grams).map_err(|e| JsValue::from_str(&e))
}

fn allocation_json(components_json: &str, total_grams: f64) -> Result<String, String> {
    let components = parse_components(components_json)?;
    let total = to_decimal(total_grams).ok_or("Batch weight must be a number")?;

    let allocation = shared::allocate(&components, total)?;
    serde_json::to_string(&allocation).map_err(|e| e.to_string())
}

fn parse_components(components_json: &str) -> Result<Vec<BlendComponent>, String> {
    serde_json::from_str(components_json).map_err(|e| format!("Invalid components JSON: {}", e))
}

// ============================================================================
// Records
// ============================================================================

/// Id for a new record from the browser clock
#[wasm_bindgen]
pub fn next_record_id(last_issued: Option<f64>) -> f64 {
    let now = js_sys::Date::now() as i64;
    shared::next_record_id(now, last_issued.map(|id| id as i64)) as f64
}

/// Exact decimal for a JS number, using its shortest decimal spelling
fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_time_fields() {
        assert_eq!(normalize_time_input("123"), "99:");
        assert_eq!(finalize_time_input("9:5"), "09:05");
        assert_eq!(parse_time("10:00"), 600);
        assert_eq!(format_time(0), "-");
        assert_eq!(cooling_start_time("10:00"), "13:00");
        assert_eq!(cooling_start_time(""), "");
    }

    #[test]
    fn test_weight_loss() {
        assert_eq!(calculate_roast_weight_loss(100.0, 85.0), Some(15.0));
        assert_eq!(calculate_roast_weight_loss(0.0, 85.0), None);
        assert_eq!(calculate_roast_weight_loss(100.0, 0.0), None);
        assert_eq!(calculate_roast_weight_loss(0.001, 1e27), None);
    }

    #[test]
    fn test_roast_metrics() {
        let json = roast_metrics_json(
            r#"{"final_time":"10:00","fcs_time":"09:00","cooling_tp_time":"11:00"}"#,
        )
        .unwrap();
        let metrics: RoastMetrics = serde_json::from_str(&json).unwrap();

        assert_eq!(metrics.total_time_cs, Some(780));
        assert_eq!(metrics.dev_time_ctp, Some(120));
        assert_eq!(metrics.dtr_ctp, Some(Decimal::from_str("18.2").unwrap()));
        assert_eq!(metrics.loss_percent, None);

        assert!(roast_metrics_json("not json").is_err());
    }

    #[test]
    fn test_blend_validation() {
        let valid: Value = serde_json::from_str(
            &blend_check_json(
                r#"[{"bean_name":"A","percentage":"33.3"},{"bean_name":"B","percentage":"33.3"},{"bean_name":"C","percentage":"33.4"}]"#,
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(valid["valid"], true);

        let invalid: Value = serde_json::from_str(
            &blend_check_json(
                r#"[{"bean_name":"A","percentage":"60"},{"bean_name":"B","percentage":"39"}]"#,
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(invalid["valid"], false);
        assert_eq!(invalid["total"], "99");
    }

    #[test]
    fn test_blend_allocation() {
        let json = allocation_json(
            r#"[{"bean_name":"A","percentage":"60"},{"bean_name":"B","percentage":"40"}]"#,
            500.0,
        )
        .unwrap();
        let allocation: shared::BlendAllocation = serde_json::from_str(&json).unwrap();

        assert_eq!(allocation.allocated_grams, Decimal::from(500));
        assert_eq!(allocation.components[0].amount_grams, Decimal::from(300));
        assert!(allocation_json("[]", 0.0).is_err());
        assert_eq!(
            allocation_json(r#"[{"bean_name":"A","percentage":"100"}]"#, 1e27),
            Err("Batch weight is too large".to_string())
        );
    }
}
