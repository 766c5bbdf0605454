//! 将各phase输出合并为按section组织的公司档案

use serde_json::{Map, Value};

use crate::generator::research::phases::section_for;
use crate::types::profile::ConsolidatedProfile;
use crate::utils::flatten::strip_metadata;

/// 合并phase输出，去掉 `_` 开头的元数据字段；未知编号的phase被忽略
pub fn consolidate(outputs: &[(u8, Map<String, Value>)]) -> ConsolidatedProfile {
    let mut consolidated = ConsolidatedProfile::new();
    for (phase, data) in outputs {
        match section_for(*phase) {
            Ok(section) => {
                consolidated.insert(section.to_string(), Value::Object(strip_metadata(data)));
            }
            Err(e) => tracing::warn!("⚠️ 跳过无法归档的输出: {}", e),
        }
    }
    consolidated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_consolidate_maps_sections_and_strips_metadata() {
        let outputs = vec![
            (
                1,
                object(json!({
                    "companyName": "Acme",
                    "_validation_metadata": { "validation_passed": true }
                })),
            ),
            (5, object(json!({ "primaryCurrency": "USD", "_note": "x" }))),
        ];

        let consolidated = consolidate(&outputs);

        assert_eq!(consolidated.len(), 2);
        assert_eq!(consolidated["companyProfile"], json!({ "companyName": "Acme" }));
        assert_eq!(
            consolidated["currencyLocalization"],
            json!({ "primaryCurrency": "USD" })
        );
    }

    #[test]
    fn test_consolidate_ignores_unknown_phase() {
        let outputs = vec![(12, object(json!({ "a": 1 })))];
        assert!(consolidate(&outputs).is_empty());
    }
}
