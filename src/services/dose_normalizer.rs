//! 农药用量归一化
//!
//! 把模型返回的标签用量 JSON 转换为"每 10 升一泵"的用量。
//! 单条记录不合格时静默丢弃；整体 JSON 无法解析时整步失败。

use serde_json::Value;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{PesticideRecord, PUMP_VOLUME_LITRES};

/// 计算每泵用量：`round(formulation / water * 10, 2)`
///
/// 保留两位小数，恰好一半时取偶数（0.125 → 0.12）。
/// 水量为 0 或结果不是有限数时返回 `None`。
pub fn pump_dose(formulation: f64, water: f64) -> Option<f64> {
    if water == 0.0 {
        return None;
    }
    let dose = formulation / water * PUMP_VOLUME_LITRES;
    if !dose.is_finite() {
        return None;
    }

    // 数值过大时放大 100 倍会溢出，此时本身已没有小数位可舍入
    let scaled = dose * 100.0;
    if scaled.is_finite() {
        Some(scaled.round_ties_even() / 100.0)
    } else {
        Some(dose)
    }
}

/// 解析模型返回的 JSON 并归一化
///
/// 接受 JSON 数组，或把记录数组包在某个字段里的对象。
/// 对象中有多个数组字段时（如 `records` 和 `errors`），取有效记录最多的那个。
pub fn parse_label_claims(raw: &str) -> AppResult<Vec<PesticideRecord>> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body).map_err(AppError::malformed)?;

    match value {
        Value::Array(items) => Ok(normalize(&items)),
        Value::Object(map) => {
            let candidates: Vec<Vec<Value>> = map
                .into_iter()
                .filter_map(|(_, v)| match v {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .collect();
            if candidates.is_empty() {
                return Err(AppError::malformed("expected a JSON array of records"));
            }

            let mut best: Vec<PesticideRecord> = Vec::new();
            for items in &candidates {
                let records = normalize(items);
                if records.len() > best.len() {
                    best = records;
                }
            }
            Ok(best)
        }
        _ => Err(AppError::malformed("expected a JSON array of records")),
    }
}

/// 逐条校验并计算每泵用量，保持原顺序
pub fn normalize(items: &[Value]) -> Vec<PesticideRecord> {
    let records: Vec<PesticideRecord> = items.iter().filter_map(normalize_one).collect();
    let dropped = items.len() - records.len();
    if dropped > 0 {
        debug!("丢弃 {} 条无效的用量记录", dropped);
    }
    records
}

fn normalize_one(item: &Value) -> Option<PesticideRecord> {
    let obj = item.as_object()?;
    let text = |key: &str| obj.get(key)?.as_str().map(|s| s.trim().to_string());

    let formulation_dose = coerce_number(obj.get("formulation_dose")?)?;
    let water_volume = coerce_number(obj.get("water_volume")?)?;
    let pump_dose = pump_dose(formulation_dose, water_volume)?;

    Some(PesticideRecord {
        chemical_name: text("chemical_name")?,
        crop: text("crop")?,
        pest: text("pest")?,
        formulation_dose,
        water_volume,
        pump_dose,
    })
}

/// 数字或可以解析为数字的字符串
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// 去掉 ```json ... ``` 代码块标记
fn strip_code_fence(raw: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(.*?)\n?\s*```\s*$").expect("valid fence regex")
    });

    match fence.captures(raw).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pump_dose_boundary_values() {
        assert_eq!(pump_dose(550.0, 750.0), Some(7.33));
        assert_eq!(pump_dose(0.0, 100.0), Some(0.0));
        assert_eq!(pump_dose(500.0, 500.0), Some(10.0));
    }

    #[test]
    fn test_pump_dose_rounds_half_to_even() {
        assert_eq!(pump_dose(1.0, 80.0), Some(0.12));
    }

    #[test]
    fn test_pump_dose_keeps_huge_finite_values() {
        let dose = pump_dose(1e306, 1.0).unwrap();
        assert!(dose.is_finite());
        assert_eq!(dose, 1e306 / 1.0 * 10.0);

        assert_eq!(pump_dose(1e308, 1e-10), None);
    }

    #[test]
    fn test_zero_water_is_dropped() {
        assert_eq!(pump_dose(100.0, 0.0), None);

        let records = normalize(&[json!({
            "chemical_name": "Abamectin 1.9 EC",
            "crop": "Chilli",
            "pest": "Mite",
            "formulation_dose": 300,
            "water_volume": 0
        })]);
        assert!(records.is_empty());
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let records = normalize(&[json!({
            "chemical_name": "Fenazaquin 10 EC",
            "crop": "Okra",
            "pest": "Red spider mite",
            "formulation_dose": " 550 ",
            "water_volume": "750"
        })]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].formulation_dose, 550.0);
        assert_eq!(records[0].pump_dose, 7.33);
    }

    #[test]
    fn test_bad_records_are_dropped_silently() {
        let items = vec![
            json!({"chemical_name": "A", "crop": "Cotton", "pest": "Mite", "formulation_dose": "two", "water_volume": 500}),
            json!({"chemical_name": "B", "crop": "Cotton", "pest": "Mite", "formulation_dose": 200, "water_volume": 500}),
            json!({"chemical_name": "C", "crop": "Cotton", "formulation_dose": 200, "water_volume": 500}),
            json!("not an object"),
            json!({"chemical_name": "D", "crop": "Cotton", "pest": "Mite", "formulation_dose": null, "water_volume": 500}),
        ];

        let records = normalize(&items);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chemical_name, "B");
        assert_eq!(records[0].pump_dose, 4.0);
    }

    #[test]
    fn test_normalize_is_idempotent_on_its_output() {
        let records = parse_label_claims(
            r#"[{"chemical_name": "Propargite 57 EC", "crop": "Tea", "pest": "Mite", "formulation_dose": 550, "water_volume": 750}]"#,
        )
        .unwrap();

        let again: Vec<Value> = records
            .iter()
            .map(|r| serde_json::to_value(r).unwrap())
            .collect();
        let rerun = normalize(&again);

        assert_eq!(rerun, records);
        assert_eq!(rerun[0].pump_dose, 7.33);
    }

    #[test]
    fn test_parse_accepts_fenced_and_wrapped_arrays() {
        let fenced = "```json\n[{\"chemical_name\": \"X\", \"crop\": \"Mango\", \"pest\": \"Hopper\", \"formulation_dose\": 100, \"water_volume\": 1000}]\n```";
        assert_eq!(parse_label_claims(fenced).unwrap().len(), 1);

        let wrapped = r#"{"records": [{"chemical_name": "X", "crop": "Mango", "pest": "Hopper", "formulation_dose": 100, "water_volume": 1000}]}"#;
        let records = parse_label_claims(wrapped).unwrap();
        assert_eq!(records[0].pump_dose, 1.0);
    }

    #[test]
    fn test_wrapped_records_win_over_other_arrays() {
        let wrapped = r#"{"records": [{"chemical_name": "Spiromesifen 22.9 SC", "crop": "Brinjal", "pest": "Mite", "formulation_dose": 400, "water_volume": 500}], "errors": []}"#;
        let records = parse_label_claims(wrapped).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chemical_name, "Spiromesifen 22.9 SC");
        assert_eq!(records[0].pump_dose, 8.0);

        let with_notes = r#"{"notes": ["label page 2"], "data": [{"chemical_name": "X", "crop": "Okra", "pest": "Mite", "formulation_dose": 100, "water_volume": 1000}]}"#;
        assert_eq!(parse_label_claims(with_notes).unwrap().len(), 1);

        let empty = r#"{"records": []}"#;
        assert!(parse_label_claims(empty).unwrap().is_empty());
    }

    #[test]
    fn test_huge_dose_survives_json_round_trip() {
        let records = normalize(&[json!({
            "chemical_name": "Y",
            "crop": "Okra",
            "pest": "Mite",
            "formulation_dose": 1e306,
            "water_volume": 1
        })]);
        assert_eq!(records.len(), 1);

        let again: Vec<Value> = records
            .iter()
            .map(|r| serde_json::to_value(r).unwrap())
            .collect();
        assert_eq!(normalize(&again), records);
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let err = parse_label_claims("[{\"chemical_name\": ").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse { .. }));

        let err = parse_label_claims("{\"note\": \"nothing\"}").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse { .. }));
    }
}
