use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::null_as_default;

/// 对话角色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 对话历史中的一条消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<MessageAnalysis>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            questions_count: None,
            tags: Vec::new(),
            analysis: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            ..Self::user(content)
        }
    }

    pub fn with_questions(mut self, count: usize, tags: &[String]) -> Self {
        self.questions_count = Some(count);
        self.tags = tags.to_vec();
        self
    }

    pub fn with_analysis(mut self, analysis: MessageAnalysis) -> Self {
        self.analysis = Some(analysis);
        self
    }
}

/// 对用户消息的分析结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MessageAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub needs_new_questions: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub new_tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub extracted_info: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggested_followup: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reasoning: String,
}

impl MessageAnalysis {
    /// 分析失败时的默认结果
    pub fn fallback() -> Self {
        Self {
            suggested_followup: "Could you tell me more about your requirements?".to_string(),
            reasoning: "Error in analysis".to_string(),
            ..Default::default()
        }
    }
}

/// 对话Agent所处阶段
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentPhase {
    #[default]
    NotStarted,
    Generating,
    Prerequisites,
    Ready,
    Conversing,
    Error,
}

impl std::fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentPhase::NotStarted => write!(f, "not_started"),
            AgentPhase::Generating => write!(f, "generating"),
            AgentPhase::Prerequisites => write!(f, "prerequisites"),
            AgentPhase::Ready => write!(f, "ready"),
            AgentPhase::Conversing => write!(f, "conversing"),
            AgentPhase::Error => write!(f, "error"),
        }
    }
}
