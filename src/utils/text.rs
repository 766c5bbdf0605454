//! 文本处理的小工具

/// 公司目录名：空格替换为下划线并转小写
pub fn company_slug(company: &str) -> String {
    company.replace(' ', "_").to_lowercase()
}

/// 按字符截断（不会切断多字节字符）
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 截断并在超长时追加省略号
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", truncate_chars(text, max_chars))
    } else {
        text.to_string()
    }
}

/// 将JSON值渲染为展示用的文本，字符串不带引号
pub fn value_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
