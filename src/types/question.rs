use serde::{Deserialize, Serialize};

use crate::utils::flatten::NOT_AVAILABLE;

/// 预填答案的置信度
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            _ => Err(format!("Unknown confidence: {}", s)),
        }
    }
}

/// 问卷中的一个问题
///
/// 字段名与问卷导出格式保持一致（`categoryID`、`mandatoryField`、`isrequired`）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Question {
    pub id: String,

    #[serde(rename = "categoryID")]
    pub category_id: String,

    /// 问题文本
    #[serde(rename = "questions")]
    pub text: String,

    #[serde(rename = "mandatoryField")]
    pub mandatory_field: String,

    #[serde(rename = "isrequired", default)]
    pub is_required: bool,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub pillar: String,

    #[serde(default)]
    pub facet: String,

    #[serde(default)]
    pub composite_tag: String,

    #[serde(default)]
    pub score: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub updated_from_conversation: bool,
}

impl Question {
    /// 分类名，缺失时归入 `General`
    pub fn category(&self) -> &str {
        if self.category_id.trim().is_empty() {
            "General"
        } else {
            &self.category_id
        }
    }

    /// 答案为空、缺失或为 `Not Available` 时视为未回答
    pub fn has_open_answer(&self) -> bool {
        match self.answer.as_deref().map(str::trim) {
            None => true,
            Some(answer) => answer.is_empty() || answer == NOT_AVAILABLE,
        }
    }
}
