//! 基于公司合并档案预填问卷答案

use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::generator::research::phase::is_missing;
use crate::llm::client::{CompletionRequest, LanguageModel};
use crate::types::profile::{CompanyProfile, ConsolidatedProfile};
use crate::types::question::{Confidence, Question};
use crate::utils::json_repair::parse_array_response;
use crate::utils::text::{truncate_chars, value_to_text};
use crate::workspace::CompanyWorkspace;

const BATCH_SIZE: usize = 20;
const SUMMARY_FIELDS_PER_SECTION: usize = 5;

/// 分批（每批20个，顺序执行）预填问题答案
pub async fn prefill(
    llm: &dyn LanguageModel,
    questions: Vec<Question>,
    consolidated: &ConsolidatedProfile,
    profile: &CompanyProfile,
) -> Vec<Question> {
    if questions.is_empty() {
        tracing::warn!("⚠️ 没有需要预填的问题");
        return questions;
    }

    println!("📝 正在根据公司档案预填 {} 个问题...", questions.len());
    let summary = context_summary(consolidated);
    let batch_count = questions.len().div_ceil(BATCH_SIZE);

    let mut filled = Vec::with_capacity(questions.len());
    for (index, batch) in questions.chunks(BATCH_SIZE).enumerate() {
        tracing::info!("   处理第 {}/{} 批", index + 1, batch_count);
        filled.extend(fill_batch(llm, batch, &summary, consolidated, profile).await);
    }

    println!("✅ 已预填 {} 个问题", filled.len());
    filled
}

/// 档案摘要：每个非空section列出前5个有值的字段，值截断到100字符
pub fn context_summary(consolidated: &ConsolidatedProfile) -> String {
    let mut parts = Vec::new();
    for (section, data) in consolidated {
        let Some(fields) = data.as_object().filter(|f| !f.is_empty()) else {
            continue;
        };
        parts.push(format!("\n{}:", section));
        fields
            .iter()
            .filter(|(key, value)| !key.starts_with('_') && !is_missing(Some(value)))
            .take(SUMMARY_FIELDS_PER_SECTION)
            .for_each(|(key, value)| {
                parts.push(format!("  - {}: {}", key, truncate_chars(&value_to_text(value), 100)));
            });
    }
    parts.join("\n")
}

fn build_system_prompt(profile: &CompanyProfile, summary: &str) -> String {
    format!(
        r#"You are an Oracle Fusion ERP configuration expert filling out a questionnaire.

Company Context:
- Name: {company}
- Industry: {industry}
- Country: {country}

Available Data Summary:
{summary}

Instructions:
1. Answer each question based on the consolidated data provided
2. If data is not available, use reasonable defaults based on industry and country
3. Keep answers concise and specific
4. For yes/no questions, answer "Yes" or "No"
5. For numeric fields, provide numbers only
6. Return answers in JSON format

Return a JSON array with this structure:
[
    {{
        "id": "question_id",
        "answer": "your answer here",
        "confidence": "high/medium/low",
        "source": "which section of data was used"
    }}
]

Return ONLY the JSON array, no markdown, no explanations."#,
        company = profile.company,
        industry = profile.industry,
        country = profile.country,
        summary = summary,
    )
}

fn build_user_prompt(batch: &[Question], consolidated: &ConsolidatedProfile) -> Result<String> {
    let questions: String = batch
        .iter()
        .enumerate()
        .map(|(index, q)| {
            format!(
                "\nQuestion {}:\nID: {}\nCategory: {}\nField: {}\nQuestion: {}\nRequired: {}\n",
                index + 1,
                q.id,
                q.category_id,
                q.mandatory_field,
                q.text,
                q.is_required
            )
        })
        .collect();

    Ok(format!(
        "Here are the questions to answer:\n\n{}\n\nFull consolidated data available:\n{}\n\nPlease provide answers for all {} questions.",
        questions,
        serde_json::to_string_pretty(consolidated)?,
        batch.len()
    ))
}

async fn fill_batch(
    llm: &dyn LanguageModel,
    batch: &[Question],
    summary: &str,
    consolidated: &ConsolidatedProfile,
    profile: &CompanyProfile,
) -> Vec<Question> {
    match try_fill_batch(llm, batch, summary, consolidated, profile).await {
        Ok(filled) => filled,
        Err(e) => {
            tracing::error!("❌ 预填批次失败: {:#}", e);
            batch.to_vec()
        }
    }
}

async fn try_fill_batch(
    llm: &dyn LanguageModel,
    batch: &[Question],
    summary: &str,
    consolidated: &ConsolidatedProfile,
    profile: &CompanyProfile,
) -> Result<Vec<Question>> {
    let request = CompletionRequest::new(build_user_prompt(batch, consolidated)?)
        .with_system(build_system_prompt(profile, summary))
        .temperature(0.2)
        .expect_json();

    let response = llm.complete(request).await?;
    let answers = parse_array_response(&response)?;

    let by_id: HashMap<String, &Value> = answers
        .iter()
        .filter_map(|answer| Some((value_to_text(answer.get("id")?), answer)))
        .collect();

    Ok(batch
        .iter()
        .map(|question| apply_answer(question.clone(), by_id.get(&question.id).copied()))
        .collect())
}

/// 将模型返回的答案写回问题；找不到时标记为 low / not_found
fn apply_answer(mut question: Question, answer: Option<&Value>) -> Question {
    match answer {
        Some(answer) => {
            let text = |key: &str| answer.get(key).map(value_to_text).unwrap_or_default();
            question.answer = Some(text("answer"));
            question.confidence = Some(text("confidence").parse().unwrap_or_default());
            question.source = Some(text("source"));
        }
        None => {
            question.answer = Some(String::new());
            question.confidence = Some(Confidence::Low);
            question.source = Some("not_found".to_string());
        }
    }
    question
}

/// 导出预填后的问卷到 `output/{slug}/filled_questionnaire.json`
pub async fn export(workspace: &CompanyWorkspace, questions: &[Question]) -> Result<PathBuf> {
    let path = workspace.questionnaire_path();
    workspace.write_json(&path, questions).await?;
    println!("💾 问卷已导出到: {}", path.display());
    Ok(path)
}
