use serde::{Deserialize, Serialize};

use crate::types::null_as_default;

/// 意图分析结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IntentResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reasoning: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub focus_areas: Vec<String>,
}

impl IntentResult {
    /// 解析失败时的默认意图
    pub fn parsing_fallback() -> Self {
        Self {
            tags: vec!["core hr".to_string(), "payroll".to_string()],
            reasoning: "Default HR modules due to parsing error".to_string(),
            focus_areas: vec!["Human Resources".to_string()],
        }
    }

    /// 模型调用失败时的默认意图
    pub fn error_fallback() -> Self {
        Self {
            tags: vec!["core hr".to_string()],
            reasoning: "Error in intent extraction".to_string(),
            focus_areas: vec!["General".to_string()],
        }
    }
}
