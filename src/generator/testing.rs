//! 生成器单元测试共用的替身服务

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::config::Config;
use crate::generator::context::GeneratorContext;
use crate::generator::questionnaire::retriever::QuestionSource;
use crate::generator::research::search::WebSearch;
use crate::llm::client::LanguageModel;
use crate::types::question::Question;

/// 按标签返回固定问题的问题来源
#[derive(Default)]
pub struct StaticQuestions {
    by_tag: HashMap<String, Vec<Question>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl StaticQuestions {
    pub fn with_tag(mut self, tag: &str, texts: &[&str]) -> Self {
        let questions = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Question {
                id: format!("{}_{}", tag.replace(' ', "_"), i + 1),
                category_id: tag.to_string(),
                text: text.to_string(),
                mandatory_field: text.to_string(),
                tags: vec![tag.to_string()],
                domain: tag.to_string(),
                ..Default::default()
            })
            .collect();
        self.by_tag.insert(tag.to_string(), questions);
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionSource for StaticQuestions {
    async fn fetch_by_tags(&self, tags: &[String]) -> Vec<Question> {
        self.calls.lock().unwrap().push(tags.to_vec());
        tags.iter()
            .filter_map(|tag| self.by_tag.get(tag))
            .flatten()
            .cloned()
            .collect()
    }

    async fn check_connection(&self) -> bool {
        true
    }
}

/// 没有配置API KEY的搜索服务
pub struct NoSearch;

#[async_trait]
impl WebSearch for NoSearch {
    fn is_available(&self) -> bool {
        false
    }

    async fn search(&self, _query: &str) -> Result<Value> {
        Err(anyhow!("search is not configured"))
    }
}

/// 输出目录位于临时目录中的配置
pub fn config_in(dir: &TempDir) -> Config {
    let mut config = Config {
        company: "Acme Corp".to_string(),
        industry: "Retail".to_string(),
        country: "Canada".to_string(),
        output_path: dir.path().join("output"),
        ..Default::default()
    };
    config.research.search_results_dir = dir.path().join("search_results");
    config.research.phases_data_dir = dir.path().join("phases_data");
    config.research.batch_delay_ms = 0;
    config.search.api_key = None;
    config
}

pub fn context_with(
    config: Config,
    llm: Arc<dyn LanguageModel>,
    questions: Arc<dyn QuestionSource>,
) -> GeneratorContext {
    GeneratorContext::with_services(config, llm, questions, Arc::new(NoSearch))
}
