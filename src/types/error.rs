use thiserror::Error;

/// 领域错误
#[derive(Debug, Error)]
pub enum CopilotError {
    #[error("phase template not found: {0}")]
    TemplateMissing(String),

    #[error("phase template is not valid JSON ({path}): {reason}")]
    TemplateInvalid { path: String, reason: String },

    #[error("model response could not be parsed as JSON: {0}")]
    UnparseableResponse(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("unknown research phase: {0}")]
    UnknownPhase(u8),
}
