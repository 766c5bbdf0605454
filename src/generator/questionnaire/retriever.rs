//! 问卷检索服务客户端：按HCM领域标签拉取问题

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::RetrievalConfig;
use crate::types::question::Question;
use crate::utils::text::ellipsize;

/// 检索服务支持的十个HCM领域（小写，与库中一致）
pub const AVAILABLE_TAGS: [&str; 10] = [
    "core hr",
    "payroll",
    "benefits",
    "compensation",
    "absence management",
    "time and labor",
    "talent management",
    "recruiting",
    "onboarding",
    "learning",
];

/// 问题来源
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// 按标签拉取问题；单个标签失败时跳过
    async fn fetch_by_tags(&self, tags: &[String]) -> Vec<Question>;

    /// 可用的领域标签
    fn available_tags(&self) -> Vec<String> {
        AVAILABLE_TAGS.iter().map(|t| t.to_string()).collect()
    }

    /// 检查服务是否可达
    async fn check_connection(&self) -> bool;
}

#[derive(Serialize)]
struct MetadataFilters<'a> {
    domain: &'a str,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    domain_name: &'a str,
    limit: u32,
    threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata_filters: Option<MetadataFilters<'a>>,
    vector_name: &'a str,
}

#[derive(Deserialize, Default)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
    #[serde(default)]
    total_results: u64,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    text: String,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    score: f64,
    #[serde(default)]
    metadata: HitMetadata,
}

#[derive(Deserialize, Default)]
struct HitMetadata {
    #[serde(default)]
    pillar: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    facet: Option<String>,
    #[serde(default)]
    composite_tag: Option<String>,
}

/// 基于HTTP检索接口的问题来源
pub struct QuestionRetriever {
    http: reqwest::Client,
    config: RetrievalConfig,
}

impl QuestionRetriever {
    pub fn new(config: &RetrievalConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        tracing::info!("✅ 问卷检索服务: {}", config.api_url);
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    async fn search(&self, request: &SearchRequest<'_>, timeout: Duration) -> Result<SearchResponse> {
        let response = self
            .http
            .post(&self.config.api_url)
            .timeout(timeout)
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<SearchResponse>().await?)
    }

    async fn fetch_tag(&self, tag: &str) -> Result<Vec<SearchHit>> {
        let request = SearchRequest {
            query: "a",
            domain_name: &self.config.collection,
            limit: self.config.limit,
            threshold: self.config.threshold,
            metadata_filters: Some(MetadataFilters { domain: tag }),
            vector_name: "tag_vector",
        };
        let timeout = Duration::from_secs(self.config.timeout_seconds);
        Ok(self.search(&request, timeout).await?.results)
    }
}

/// 将检索结果转换为问题记录
fn to_question(hit: SearchHit, tag: &str, id: String) -> Question {
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let metadata = hit.metadata;
    let pillar = metadata.pillar.unwrap_or_default();

    Question {
        id,
        category_id: non_empty(Some(pillar.clone())).unwrap_or_else(|| tag.to_string()),
        mandatory_field: ellipsize(&hit.text, 50),
        text: hit.text,
        is_required: false,
        tags: vec![tag.to_string()],
        domain: non_empty(metadata.domain).unwrap_or_else(|| tag.to_string()),
        pillar,
        facet: metadata.facet.unwrap_or_default(),
        composite_tag: metadata.composite_tag.unwrap_or_default(),
        score: hit.score,
        ..Default::default()
    }
}

#[async_trait]
impl QuestionSource for QuestionRetriever {
    async fn fetch_by_tags(&self, tags: &[String]) -> Vec<Question> {
        tracing::info!("🔍 按标签检索问题: {:?}", tags);

        let mut questions: Vec<Question> = Vec::new();
        let mut seen = HashSet::new();

        for tag in tags {
            let tag = tag.to_lowercase();
            let hits = match self.fetch_tag(&tag).await {
                Ok(hits) => hits,
                Err(e) => {
                    tracing::error!("❌ 标签 '{}' 检索失败: {}", tag, e);
                    continue;
                }
            };
            tracing::info!("   标签 '{}' 返回 {} 个问题", tag, hits.len());

            for hit in hits {
                if !seen.insert(hit.text.clone()) {
                    continue;
                }
                let id = format!("{}_{}", tag.replace(' ', "_"), questions.len() + 1);
                questions.push(to_question(hit, &tag, id));
            }
        }

        tracing::info!("✅ 共检索到 {} 个不重复的问题", questions.len());
        questions
    }

    async fn check_connection(&self) -> bool {
        let request = SearchRequest {
            query: "test",
            domain_name: &self.config.collection,
            limit: 1,
            threshold: self.config.threshold,
            metadata_filters: None,
            vector_name: "tag_vector",
        };
        match self.search(&request, Duration::from_secs(10)).await {
            Ok(response) => {
                tracing::info!("✅ 检索服务连接成功，共 {} 条结果", response.total_results);
                true
            }
            Err(e) => {
                tracing::error!("❌ 检索服务连接失败: {}", e);
                false
            }
        }
    }
}
