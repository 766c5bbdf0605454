//! 嵌套JSON扁平化

use serde_json::{Map, Value};

/// 缺失值的统一占位
pub const NOT_AVAILABLE: &str = "Not Available";

/// 将嵌套JSON对象扁平化为单层的字段表
///
/// - `_` 开头的键视为元数据，直接跳过
/// - 嵌套对象的键用 `_` 连接
/// - 字符串列表用 `", "` 拼接，空列表记为 `Not Available`
/// - 对象列表展开为 `key_0_...`、`key_1_...`
/// - 其他列表保留其JSON文本
/// - `null` 记为 `Not Available`
pub fn flatten(data: &Map<String, Value>) -> Map<String, Value> {
    let mut flattened = Map::new();
    flatten_into(data, "", &mut flattened);
    flattened
}

fn flatten_into(data: &Map<String, Value>, parent_key: &str, out: &mut Map<String, Value>) {
    for (key, value) in data {
        if key.starts_with('_') {
            continue;
        }

        let new_key = if parent_key.is_empty() {
            key.clone()
        } else {
            format!("{}_{}", parent_key, key)
        };

        match value {
            Value::Object(nested) => flatten_into(nested, &new_key, out),
            Value::Array(items) => flatten_list(items, new_key, out),
            Value::Null => {
                out.insert(new_key, Value::String(NOT_AVAILABLE.to_string()));
            }
            other => {
                out.insert(new_key, other.clone());
            }
        }
    }
}

fn flatten_list(items: &[Value], key: String, out: &mut Map<String, Value>) {
    if items.is_empty() {
        out.insert(key, Value::String(NOT_AVAILABLE.to_string()));
        return;
    }

    if items.iter().all(Value::is_string) {
        let joined = items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        out.insert(key, Value::String(joined));
    } else if items.iter().all(Value::is_object) {
        for (i, item) in items.iter().enumerate() {
            if let Value::Object(nested) = item {
                flatten_into(nested, &format!("{}_{}", key, i), out);
            }
        }
    } else {
        out.insert(key, Value::String(Value::Array(items.to_vec()).to_string()));
    }
}

/// 去掉 `_` 开头的元数据键
pub fn strip_metadata(data: &Map<String, Value>) -> Map<String, Value> {
    data.iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_flatten_nested_objects() {
        let data = as_map(json!({
            "company": {
                "name": "Acme",
                "hq": { "city": "Austin", "state": "TX" }
            },
            "employees": 500
        }));

        let flat = flatten(&data);

        assert_eq!(flat.get("company_name"), Some(&json!("Acme")));
        assert_eq!(flat.get("company_hq_city"), Some(&json!("Austin")));
        assert_eq!(flat.get("company_hq_state"), Some(&json!("TX")));
        assert_eq!(flat.get("employees"), Some(&json!(500)));
    }

    #[test]
    fn test_flatten_lists_and_nulls() {
        let data = as_map(json!({
            "locations": ["Austin", "Berlin"],
            "subsidiaries": [],
            "executives": [
                { "name": "Jane", "title": "CEO" },
                { "name": "Raj", "title": "CFO" }
            ],
            "mixed": [1, "two"],
            "website": null,
            "public": false
        }));

        let flat = flatten(&data);

        assert_eq!(flat.get("locations"), Some(&json!("Austin, Berlin")));
        assert_eq!(flat.get("subsidiaries"), Some(&json!(NOT_AVAILABLE)));
        assert_eq!(flat.get("executives_0_name"), Some(&json!("Jane")));
        assert_eq!(flat.get("executives_1_title"), Some(&json!("CFO")));
        assert_eq!(flat.get("mixed"), Some(&json!("[1,\"two\"]")));
        assert_eq!(flat.get("website"), Some(&json!(NOT_AVAILABLE)));
        assert_eq!(flat.get("public"), Some(&json!(false)));
    }

    #[test]
    fn test_flatten_skips_metadata_keys() {
        let data = as_map(json!({
            "_extraction_metadata": { "phase": 1 },
            "details": { "_internal": "x", "value": "kept" }
        }));

        let flat = flatten(&data);

        assert_eq!(flat.len(), 1);
        assert_eq!(flat.get("details_value"), Some(&json!("kept")));
    }

    #[test]
    fn test_strip_metadata() {
        let data = as_map(json!({
            "_validation_metadata": { "completeness_score": 100.0 },
            "companyName": "Acme"
        }));

        let clean = strip_metadata(&data);
        assert_eq!(clean.len(), 1);
        assert!(clean.contains_key("companyName"));
    }
}
