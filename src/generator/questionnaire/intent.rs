//! 意图分析：从用户诉求中抽取Oracle HCM领域标签

use crate::llm::client::{CompletionRequest, LanguageModel};
use crate::types::intent::IntentResult;
use crate::types::profile::CompanyProfile;
use crate::utils::json_repair::strip_code_fences;
use crate::utils::text::truncate_chars;

const INTENT_SYSTEM_PROMPT: &str = r#"You are an Oracle Fusion ERP configuration expert.

Available Oracle HCM domains (use LOWERCASE in your response):
- core hr: Employee records, workforce management, organizational structures, jobs, positions, grades, employee data
- payroll: Salary processing, tax calculations, payment cycles, payroll elements, wage calculations
- benefits: Health insurance, retirement plans, benefits administration, enrollment, benefits eligibility
- compensation: Salary structures, pay rates, compensation plans, wage progression, salary administration
- absence management: Leave management, time off, absence tracking, vacation, sick leave
- time and labor: Time tracking, attendance, scheduling, timecards, time entry, overtime
- talent management: Performance reviews, talent processes, employee development, career management
- recruiting: Talent acquisition, job postings, candidate management, hiring process, requisitions
- onboarding: New hire onboarding, orientation, employee onboarding process, joining formalities
- learning: Training programs, course management, learning paths, employee training, skill development

Analyze the user's intent and return ONLY a JSON object with this structure:
{
    "tags": ["core hr", "payroll"],
    "reasoning": "Brief explanation of why these tags were selected",
    "focus_areas": ["Area 1", "Area 2"]
}

CRITICAL RULES:
- Return ONLY the JSON, no markdown, no explanations outside JSON
- Select 1-5 most relevant tags from the list above
- Use EXACT tag names as shown above (LOWERCASE with spaces)
- Tags must be lowercase: "core hr" not "Core HR", "time and labor" not "Time and Labor"
- Be specific based on the prompt
- Consider the company's industry and needs
- If multiple related areas are mentioned, include all relevant domains"#;

/// 分析用户诉求，返回相关的领域标签
pub async fn extract_intent(
    llm: &dyn LanguageModel,
    prompt: &str,
    profile: &CompanyProfile,
) -> IntentResult {
    let user_message = format!(
        "Company: {}\nIndustry: {}\nCountry: {}\n\nUser Request: {}\n\nWhat Oracle modules/tags are relevant for this configuration? Remember to use LOWERCASE tags.",
        profile.company, profile.industry, profile.country, prompt
    );

    tracing::info!("🤔 分析用户意图: {}...", truncate_chars(prompt, 100));

    let request = CompletionRequest::new(user_message)
        .with_system(INTENT_SYSTEM_PROMPT)
        .temperature(0.3);

    let response = match llm.complete(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("❌ 意图分析失败: {:#}", e);
            return IntentResult::error_fallback();
        }
    };

    match serde_json::from_str::<IntentResult>(strip_code_fences(&response)) {
        Ok(mut intent) => {
            intent.tags = intent.tags.iter().map(|t| t.to_lowercase()).collect();
            tracing::info!("✅ 意图标签: {:?}", intent.tags);
            tracing::debug!("   理由: {}", intent.reasoning);
            intent
        }
        Err(e) => {
            tracing::error!("❌ 意图结果解析失败: {}; 原始响应: {}", e, response);
            IntentResult::parsing_fallback()
        }
    }
}

/// 只保留可用的标签（保持顺序、去重）；一个都没有时回退到 core hr + payroll
pub fn validate_tags(tags: &[String], available: &[String]) -> Vec<String> {
    let available: Vec<String> = available.iter().map(|t| t.to_lowercase()).collect();

    let mut valid: Vec<String> = Vec::new();
    for tag in tags.iter().map(|t| t.to_lowercase()) {
        if available.contains(&tag) && !valid.contains(&tag) {
            valid.push(tag);
        }
    }

    if valid.is_empty() {
        tracing::warn!("⚠️ 没有有效标签: {:?}，使用默认标签", tags);
        return vec!["core hr".to_string(), "payroll".to_string()];
    }

    tracing::info!("✅ 有效标签: {:?}", valid);
    valid
}
