/// 判断JSON响应是否完整：去掉首尾空白后以 `}` 或 `]` 结尾
pub fn looks_complete(response: &str) -> bool {
    let trimmed = response.trim_end();
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed).trim_end();
    trimmed.ends_with('}') || trimmed.ends_with(']')
}
