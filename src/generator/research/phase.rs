//! Phase抽取器的通用流程：模板加载、搜索、prompt构建、解析、校验与默认值填充

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::path::Path;

use crate::generator::context::GeneratorContext;
use crate::generator::research::search::collect_search_results;
use crate::types::error::CopilotError;
use crate::types::profile::CompanyProfile;
use crate::utils::flatten::{NOT_AVAILABLE, flatten, strip_metadata};
use crate::utils::json_repair::parse_object_response;

const VALIDATION_METADATA: &str = "_validation_metadata";

/// 一个调研phase的抽取器
#[async_trait]
pub trait PhaseExtractor: Send + Sync {
    /// phase编号（1-9）
    fn number(&self) -> u8;

    /// phase名称
    fn name(&self) -> &'static str;

    /// 模板文件名 `phase{N}-{stem}.json` 中的stem
    fn template_stem(&self) -> &'static str;

    /// 内置的字段模板
    fn builtin_template(&self) -> &'static str;

    /// phase专属的关注点说明
    fn focus(&self, profile: &CompanyProfile) -> String;

    /// 必填字段
    fn required_fields(&self) -> &'static [&'static str];

    /// phase专属的默认值规则
    fn apply_defaults(&self, fields: &mut FieldDefaults<'_>, profile: &CompanyProfile);

    /// 没有查询文件时使用的默认查询
    fn default_queries(&self) -> Vec<String> {
        vec![
            "{company_name} company information".to_string(),
            "{company_name} business model industry".to_string(),
            "{company_name} financial information revenue".to_string(),
        ]
    }

    /// 默认实现的execute方法：搜索 -> 抽取 -> 扁平化 -> 校验 -> 默认值 -> 保存
    async fn execute(
        &self,
        context: &GeneratorContext,
        profile: &CompanyProfile,
    ) -> Result<Map<String, Value>> {
        let phase = self.number();
        tracing::info!("🔍 Phase {}: 开始为 {} 抽取字段", phase, profile.company);

        let template = load_template(self, &context.config.research.phases_data_dir).await?;
        let search_data = load_search_data(self, context, profile).await?;

        let prompt = build_extraction_prompt(self, profile, &search_data, &template)?;

        tracing::info!("🤖 Phase {}: 调用模型抽取字段...", phase);
        let response = context
            .llm
            .complete(crate::llm::client::CompletionRequest::new(prompt).expect_json())
            .await
            .with_context(|| format!("Phase {} 模型调用失败", phase))?;

        if response.trim().is_empty() {
            return Err(CopilotError::EmptyResponse.into());
        }

        let extracted = parse_object_response(&response)?;
        let mut data = flatten(&extracted);

        let missing = validate_required(&mut data, self.required_fields());
        if !missing.is_empty() {
            tracing::warn!("⚠️ Phase {} 缺少必填字段: {:?}", phase, missing);
        }

        self.apply_defaults(&mut FieldDefaults::new(&mut data), profile);

        context
            .workspace
            .write_json(
                &context.workspace.extracted_data_path(phase),
                &strip_metadata(&data),
            )
            .await?;

        println!("✅ Phase {} [{}] 完成，共 {} 个字段", phase, self.name(), data.len());
        Ok(data)
    }
}

/// 加载字段模板：优先读取数据目录中的文件，否则使用内置模板
pub async fn load_template<P: PhaseExtractor + ?Sized>(
    phase: &P,
    phases_data_dir: &Path,
) -> Result<Value> {
    let file_name = format!("phase{}-{}.json", phase.number(), phase.template_stem());
    let path = phases_data_dir.join(&file_name);

    let (content, origin) = match tokio::fs::read_to_string(&path).await {
        Ok(content) => (content, path.display().to_string()),
        Err(_) => {
            tracing::debug!("使用内置模板 {}", file_name);
            (phase.builtin_template().to_string(), file_name)
        }
    };

    if content.trim().is_empty() {
        return Err(CopilotError::TemplateMissing(origin).into());
    }

    serde_json::from_str(&content).map_err(|e| {
        CopilotError::TemplateInvalid {
            path: origin,
            reason: e.to_string(),
        }
        .into()
    })
}

/// 加载phase的搜索结果，不存在时执行搜索并缓存
async fn load_search_data<P: PhaseExtractor + ?Sized>(
    phase: &P,
    context: &GeneratorContext,
    profile: &CompanyProfile,
) -> Result<Value> {
    let number = phase.number();
    let path = context.workspace.search_results_path(number);

    if let Some(cached) = context.workspace.read_json::<Value>(&path).await? {
        tracing::debug!("Phase {}: 使用缓存的搜索结果", number);
        return Ok(cached);
    }

    tracing::info!("🔍 Phase {}: 未找到搜索结果，开始调研 {}", number, profile.company);
    let queries = load_queries(phase, &context.config.research.phases_data_dir).await;
    let results = collect_search_results(
        context.search.as_ref(),
        &context.config.search,
        &queries,
        profile,
    )
    .await;

    let results = Value::Array(results);
    context.workspace.write_json(&path, &results).await?;
    tracing::info!("💾 Phase {}: 搜索结果已保存到 {}", number, path.display());
    Ok(results)
}

async fn load_queries<P: PhaseExtractor + ?Sized>(phase: &P, phases_data_dir: &Path) -> Vec<String> {
    let path = phases_data_dir.join(format!("phase{}_queries.json", phase.number()));
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
            Ok(queries) if !queries.is_empty() => queries,
            Ok(_) => phase.default_queries(),
            Err(e) => {
                tracing::warn!("⚠️ 查询文件 {} 解析失败: {}", path.display(), e);
                phase.default_queries()
            }
        },
        Err(_) => phase.default_queries(),
    }
}

/// 公共prompt头部
pub fn prompt_header(phase_number: u8, phase_name: &str, profile: &CompanyProfile) -> String {
    format!(
        r#"You are an expert Oracle Fusion ERP implementation consultant specializing in {name}.

**COMPANY**: {company}
**INDUSTRY**: {industry}
**COUNTRY**: {country}

**PHASE {number}**: {name}

Your task is to extract structured data fields from search results to populate Oracle ERP configuration fields."#,
        name = phase_name,
        company = profile.company,
        industry = profile.industry,
        country = profile.country,
        number = phase_number,
    )
}

/// 公共prompt尾部
pub const PROMPT_FOOTER: &str = r#"
**EXTRACTION INSTRUCTIONS**:
1. Replace ALL {{PLACEHOLDER}} values with actual data extracted from the search results
2. Use "Not Available" for data that cannot be found in the search results
3. Use reasonable business defaults based on industry/country when specific data is missing
4. Ensure all values are realistic and appropriate for Oracle Fusion ERP configuration
5. Maintain the exact JSON structure - only replace the placeholder values
6. Return ONLY the completed JSON structure with no additional text or explanations
7. If multiple values are possible, choose the most appropriate one for the business context
8. For boolean fields, use true/false (not "TRUE"/"FALSE")
9. For date fields, use YYYY-MM-DD format
10. For numeric fields, use actual numbers (not strings)

**CRITICAL**: Every field must have a meaningful value. No placeholder should remain unfilled.

Extracted JSON:"#;

/// 构建完整的抽取prompt
pub fn build_extraction_prompt<P: PhaseExtractor + ?Sized>(
    phase: &P,
    profile: &CompanyProfile,
    search_data: &Value,
    template: &Value,
) -> Result<String> {
    Ok(format!(
        "{}\n\n{}\n\n**SEARCH RESULTS TO ANALYZE**:\n{}\n\n**FIELD TEMPLATE TO POPULATE**:\n{}\n\n{}",
        prompt_header(phase.number(), phase.name(), profile),
        phase.focus(profile),
        serde_json::to_string_pretty(search_data)?,
        serde_json::to_string_pretty(template)?,
        PROMPT_FOOTER
    ))
}

/// 判断字段值是否缺失：不存在、null、false、0、空字符串/列表/对象或 `Not Available`
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64().is_none_or(|v| v == 0.0),
        Some(Value::String(s)) => s.is_empty() || s == NOT_AVAILABLE,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
    }
}

/// 校验必填字段并写入 `_validation_metadata`，返回缺失的字段
pub fn validate_required(data: &mut Map<String, Value>, required: &[&str]) -> Vec<String> {
    let missing: Vec<String> = required
        .iter()
        .filter(|field| is_missing(data.get(**field)))
        .map(|field| field.to_string())
        .collect();

    let total = required.len().max(1) as f64;
    let completeness = (required.len() - missing.len()) as f64 / total * 100.0;

    data.insert(
        VALIDATION_METADATA.to_string(),
        json!({
            "required_fields_missing": missing,
            "completeness_score": completeness,
            "validation_passed": missing.is_empty(),
        }),
    );
    missing
}

/// 默认值填充器：只填充缺失的字段
pub struct FieldDefaults<'a> {
    data: &'a mut Map<String, Value>,
}

impl<'a> FieldDefaults<'a> {
    pub fn new(data: &'a mut Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn is_missing(&self, key: &str) -> bool {
        is_missing(self.data.get(key))
    }

    /// 字段的文本值，缺失时为空字符串
    pub fn text(&self, key: &str) -> String {
        match self.data.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// 字段等于给定文本
    pub fn is(&self, key: &str, expected: &str) -> bool {
        matches!(self.data.get(key), Some(Value::String(s)) if s == expected)
    }

    /// 字段缺失时填充，返回是否填充
    pub fn fill(&mut self, key: &str, value: impl Into<Value>) -> bool {
        if self.is_missing(key) {
            self.data.insert(key.to_string(), value.into());
            true
        } else {
            false
        }
    }

    /// 触发字段缺失时填充一组关联字段（已有值的关联字段保持不变）
    pub fn fill_group(&mut self, trigger: &str, values: &[(&str, &str)]) -> bool {
        if !self.is_missing(trigger) {
            return false;
        }
        for (key, value) in values {
            self.fill(key, *value);
        }
        true
    }
}

/// 文本中包含任一关键词
pub fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| text.contains(term))
}

/// 是否为美国
pub fn is_us(country_upper: &str) -> bool {
    matches!(country_upper, "US" | "USA" | "UNITED STATES")
}

/// 国家（大写）到本位币的映射
pub fn currency_for_country(country_upper: &str) -> Option<&'static str> {
    let currency = match country_upper {
        "US" | "USA" | "UNITED STATES" => "USD",
        "UK" | "UNITED KINGDOM" | "BRITAIN" => "GBP",
        "CANADA" | "CA" => "CAD",
        "AUSTRALIA" | "AU" => "AUD",
        "GERMANY" | "DE" | "FRANCE" | "FR" | "SPAIN" | "ES" | "ITALY" | "IT" | "NETHERLANDS"
        | "NL" => "EUR",
        "JAPAN" | "JP" => "JPY",
        "CHINA" | "CN" => "CNY",
        "INDIA" | "IN" => "INR",
        "BRAZIL" | "BR" => "BRL",
        "MEXICO" | "MX" => "MXN",
        _ => return None,
    };
    Some(currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_missing_follows_falsy_rules() {
        assert!(is_missing(None));
        assert!(is_missing(Some(&Value::Null)));
        assert!(is_missing(Some(&json!(false))));
        assert!(is_missing(Some(&json!(0))));
        assert!(is_missing(Some(&json!(""))));
        assert!(is_missing(Some(&json!([]))));
        assert!(is_missing(Some(&json!({}))));
        assert!(is_missing(Some(&json!("Not Available"))));

        assert!(!is_missing(Some(&json!(true))));
        assert!(!is_missing(Some(&json!(12))));
        assert!(!is_missing(Some(&json!("USD"))));
    }

    #[test]
    fn test_validate_required_metadata() {
        let mut data = Map::new();
        data.insert("a".to_string(), json!("x"));
        data.insert("b".to_string(), json!("Not Available"));

        let missing = validate_required(&mut data, &["a", "b", "c", "d"]);

        assert_eq!(missing, vec!["b", "c", "d"]);
        let meta = &data[VALIDATION_METADATA];
        assert_eq!(meta["completeness_score"], json!(25.0));
        assert_eq!(meta["validation_passed"], json!(false));
    }

    #[test]
    fn test_fill_and_fill_group_only_touch_missing_fields() {
        let mut data = Map::new();
        data.insert("kept".to_string(), json!("LLM value"));
        data.insert("sibling".to_string(), json!("from search"));

        let mut fields = FieldDefaults::new(&mut data);
        assert!(!fields.fill("kept", "default"));
        assert!(fields.fill("empty", "default"));
        assert!(fields.fill_group("trigger", &[("trigger", "T"), ("sibling", "S"), ("other", "O")]));
        assert!(!fields.fill_group("kept", &[("never", "N")]));

        assert_eq!(data["kept"], json!("LLM value"));
        assert_eq!(data["empty"], json!("default"));
        assert_eq!(data["trigger"], json!("T"));
        assert_eq!(data["sibling"], json!("from search"));
        assert_eq!(data["other"], json!("O"));
        assert!(!data.contains_key("never"));
    }

    #[test]
    fn test_prompt_header_and_footer() {
        let profile = CompanyProfile::new("Acme", "Retail", "Canada");
        let header = prompt_header(5, "Currency & Localization", &profile);

        assert!(header.contains("specializing in Currency & Localization"));
        assert!(header.contains("**COMPANY**: Acme"));
        assert!(header.contains("**PHASE 5**: Currency & Localization"));
        assert!(PROMPT_FOOTER.contains("10. For numeric fields"));
        assert!(PROMPT_FOOTER.trim_end().ends_with("Extracted JSON:"));
    }

    #[tokio::test]
    async fn test_template_keeps_field_order_in_prompt() {
        use crate::generator::research::phases::phase1::CompanyDiscovery;

        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("phase1-company-discovery.json"),
            r#"{"companyName": "", "address": "", "ceo": ""}"#,
        )
        .unwrap();

        let template = load_template(&CompanyDiscovery, dir.path()).await.unwrap();
        let keys: Vec<&str> = template.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["companyName", "address", "ceo"]);

        let profile = CompanyProfile::new("Acme", "Retail", "Canada");
        let prompt = build_extraction_prompt(&CompanyDiscovery, &profile, &json!({}), &template).unwrap();
        let section = &prompt[prompt.find("**FIELD TEMPLATE TO POPULATE**").unwrap()..];
        let company = section.find("\"companyName\"").unwrap();
        let address = section.find("\"address\"").unwrap();
        let ceo = section.find("\"ceo\"").unwrap();
        assert!(company < address && address < ceo);
    }

    #[test]
    fn test_currency_for_country() {
        assert_eq!(currency_for_country("UNITED STATES"), Some("USD"));
        assert_eq!(currency_for_country("GERMANY"), Some("EUR"));
        assert_eq!(currency_for_country("JP"), Some("JPY"));
        assert_eq!(currency_for_country("ATLANTIS"), None);
    }
}
