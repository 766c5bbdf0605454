//! 模型响应的JSON清洗与修复
//!
//! 模型经常在JSON外面包一层markdown代码块，或者因为max_tokens被截断而输出半截JSON。
//! 这里的函数按顺序尝试：去掉代码块、截断修复、去除尾逗号，最后再做一次更激进的修复。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::types::error::CopilotError;

static TRAILING_COMMA_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\}").expect("trailing comma pattern is valid"));
static TRAILING_COMMA_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\]").expect("trailing comma pattern is valid"));

/// 去掉首尾的 ```json / ``` 代码块标记
pub fn strip_code_fences(response: &str) -> &str {
    let mut text = response.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// 取出第一个代码块中的内容；没有代码块时原样返回
pub fn extract_fenced_block(response: &str) -> &str {
    if let Some((_, after)) = response.split_once("```json") {
        return after.split("```").next().unwrap_or(after).trim();
    }
    let parts: Vec<&str> = response.split("```").collect();
    if parts.len() >= 3 {
        return parts[1].trim();
    }
    response
}

/// 截断修复：回退到最后一个以 `},` / `}` / `,` 结尾的行并补上右括号
pub fn repair_truncated(response: &str) -> String {
    let trimmed = response.trim();
    if trimmed.ends_with('}') || trimmed.ends_with(']') {
        return trimmed.to_string();
    }

    tracing::warn!("⚠️ 响应未以 }} 或 ] 结尾，尝试修复截断的JSON");
    let lines: Vec<&str> = trimmed.lines().collect();
    for i in (0..lines.len()).rev() {
        let line = lines[i].trim_end();
        if line.ends_with("},") || line.ends_with('}') || line.ends_with(',') {
            let kept = lines[..=i].join("\n");
            if kept.trim_end().ends_with('}') {
                return kept;
            }
            return format!("{}\n}}", kept.trim_end().trim_end_matches(','));
        }
    }
    trimmed.to_string()
}

/// 去除对象和数组中的尾逗号
pub fn remove_trailing_commas(response: &str) -> String {
    let without_object_commas = TRAILING_COMMA_OBJECT.replace_all(response, "}");
    TRAILING_COMMA_ARRAY
        .replace_all(&without_object_commas, "]")
        .into_owned()
}

/// 激进修复：只保留到最后一个以 `,` 或 `}` 结尾的非空行，然后闭合
fn aggressive_repair(response: &str) -> Option<String> {
    let lines: Vec<&str> = response.lines().filter(|l| !l.trim().is_empty()).collect();
    for i in (0..lines.len()).rev() {
        let line = lines[i].trim();
        if line.ends_with(',') || line.ends_with('}') {
            let repaired = lines[..=i].join("\n");
            let repaired = repaired.trim_end_matches(',');
            if repaired.ends_with('}') {
                return Some(repaired.to_string());
            }
            return Some(format!("{}\n}}", repaired));
        }
    }
    None
}

/// 将模型响应解析为JSON对象，必要时进行修复
pub fn parse_object_response(response: &str) -> Result<Map<String, Value>, CopilotError> {
    let block = extract_fenced_block(response);
    let repaired = repair_truncated(block);
    let cleaned = remove_trailing_commas(&repaired);

    let parse_err = match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(map)) => return Ok(map),
        Ok(other) => {
            return Err(CopilotError::UnparseableResponse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )));
        }
        Err(e) => e,
    };

    tracing::debug!(
        "JSON解析失败: {}，响应内容: {}",
        parse_err,
        crate::utils::text::truncate_chars(&cleaned, 500)
    );

    if let Some(repaired) = aggressive_repair(&cleaned)
        && let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&repaired)
    {
        tracing::info!("🔧 激进修复后JSON解析成功");
        return Ok(map);
    }

    Err(CopilotError::UnparseableResponse(parse_err.to_string()))
}

/// 将模型响应解析为JSON数组；直接解析失败时在全文中寻找最外层的 `[...]`
pub fn parse_array_response(response: &str) -> Result<Vec<Value>, CopilotError> {
    let stripped = strip_code_fences(response);
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(stripped) {
        return Ok(items);
    }

    let start = stripped.find('[');
    let end = stripped.rfind(']');
    if let (Some(start), Some(end)) = (start, end)
        && start < end
    {
        let candidate = remove_trailing_commas(&stripped[start..=end]);
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&candidate) {
            return Ok(items);
        }
    }

    Err(CopilotError::UnparseableResponse(format!(
        "no JSON array found in: {}",
        crate::utils::text::truncate_chars(stripped, 200)
    )))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_fenced_block_with_prose() {
        let response = "Here is the data:\n```json\n{\"companyName\": \"Acme\"}\n```\nDone.";
        assert_eq!(extract_fenced_block(response), "{\"companyName\": \"Acme\"}");

        let plain = "Result:\n```\n{\"x\": 1}\n```";
        assert_eq!(extract_fenced_block(plain), "{\"x\": 1}");

        assert_eq!(extract_fenced_block("{\"x\": 1}"), "{\"x\": 1}");
    }

    #[test]
    fn test_remove_trailing_commas() {
        assert_eq!(
            remove_trailing_commas("{\"a\": [1, 2, ], \"b\": 2, }"),
            "{\"a\": [1, 2], \"b\": 2}"
        );
    }

    #[test]
    fn test_parse_truncated_object() {
        let response = "{\n  \"companyName\": \"Acme\",\n  \"hqCity\": \"Austin\",\n  \"hqState\": \"TX";
        let parsed = parse_object_response(response).unwrap();

        assert_eq!(parsed.get("companyName"), Some(&json!("Acme")));
        assert_eq!(parsed.get("hqCity"), Some(&json!("Austin")));
        assert!(parsed.get("hqState").is_none());
    }

    #[test]
    fn test_parse_truncated_nested_object() {
        let response = "```json\n{\n  \"profile\": {\n    \"name\": \"Acme\"\n  },\n  \"revenue\": \"12";
        let parsed = parse_object_response(response).unwrap();

        assert_eq!(parsed.get("profile"), Some(&json!({"name": "Acme"})));
    }

    #[test]
    fn test_parse_object_rejects_garbage() {
        assert!(parse_object_response("I could not find anything.").is_err());
        assert!(parse_object_response("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_parse_array_response() {
        let fenced = "```json\n[{\"id\": \"payroll_1\", \"answer\": \"Yes\"}]\n```";
        assert_eq!(parse_array_response(fenced).unwrap().len(), 1);

        let embedded = "Sure! Here are the answers: [{\"id\": \"a\"}, {\"id\": \"b\"},] hope it helps";
        let items = parse_array_response(embedded).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["id"], json!("b"));

        assert!(parse_array_response("no array here").is_err());
    }
}
