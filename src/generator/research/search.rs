//! 联网搜索（Tavily）

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;

use crate::config::SearchConfig;
use crate::types::profile::CompanyProfile;
use crate::utils::text::truncate_chars;

/// 搜索接口
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// 是否配置了可用的搜索服务
    fn is_available(&self) -> bool;

    /// 执行一次搜索，返回服务端的原始JSON
    async fn search(&self, query: &str) -> Result<Value>;
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
}

/// Tavily搜索客户端
pub struct TavilyClient {
    http: reqwest::Client,
    config: SearchConfig,
}

impl TavilyClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn search(&self, query: &str) -> Result<Value> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("TAVILY_API_KEY 未配置"))?;

        let url = format!("{}/search", self.config.api_base_url.trim_end_matches('/'));
        let request = TavilyRequest {
            api_key,
            query,
            search_depth: &self.config.search_depth,
            max_results: self.config.max_results,
        };

        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}

/// 替换查询模板中的占位符
pub fn format_query(template: &str, profile: &CompanyProfile) -> String {
    template
        .replace("{company_name}", &profile.company)
        .replace("{industry}", profile.industry_or("business"))
        .replace("{country}", profile.country_or("global"))
}

/// 依次执行查询并记录每条结果，单条失败记为error
pub async fn collect_search_results(
    search: &dyn WebSearch,
    config: &SearchConfig,
    queries: &[String],
    profile: &CompanyProfile,
) -> Vec<Value> {
    let timestamp = || chrono::Utc::now().to_rfc3339();

    if !search.is_available() {
        tracing::warn!("⚠️ 未配置搜索服务，记录空的mock搜索结果");
        return vec![json!({
            "query": format!("{} business information", profile.company),
            "status": "mock",
            "result": { "results": [] },
            "timestamp": timestamp(),
        })];
    }

    let mut results = Vec::new();
    for template in queries.iter().take(config.max_queries) {
        let query = format_query(template, profile);
        tracing::info!("🔍 搜索 '{}...'", truncate_chars(&query, 60));

        match search.search(&query).await {
            Ok(result) => results.push(json!({
                "query": query,
                "status": "success",
                "result": result,
                "timestamp": timestamp(),
            })),
            Err(e) => {
                tracing::warn!("⚠️ 搜索失败: {}", e);
                results.push(json!({
                    "query": query,
                    "status": "error",
                    "error": e.to_string(),
                    "timestamp": timestamp(),
                }));
            }
        }
    }
    results
}
