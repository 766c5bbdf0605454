use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "moonshot")]
    Moonshot,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Moonshot => write!(f, "moonshot"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Mistral => write!(f, "mistral"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "moonshot" => Ok(LLMProvider::Moonshot),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "mistral" => Ok(LLMProvider::Mistral),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 公司名称
    pub company: String,

    /// 所属行业
    pub industry: String,

    /// 所在国家
    pub country: String,

    /// 用户的初始配置诉求
    pub initial_prompt: String,

    /// 输出路径（phase输出、合并档案、问卷导出）
    pub output_path: PathBuf,

    /// 是否进行前置问题访谈
    pub skip_prerequisites: bool,

    /// 仅生成公司合并档案，不进入对话
    pub research_only: bool,

    /// 是否启用详细日志
    pub verbose: bool,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 问卷检索服务配置
    pub retrieval: RetrievalConfig,

    /// 联网搜索配置
    pub search: SearchConfig,

    /// 分阶段调研配置
    pub research: ResearchConfig,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 模型名称
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 重试次数
    pub retry_attempts: u32,

    /// 调用出错后的重试间隔（毫秒）
    pub retry_delay_ms: u64,

    /// 响应不完整（JSON被截断）时的重试间隔（毫秒）
    pub incomplete_retry_delay_ms: u64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

/// 问卷检索服务配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    /// 检索接口地址
    pub api_url: String,

    /// 问卷集合名称
    pub collection: String,

    /// 每个标签最多返回的问题数
    pub limit: u32,

    /// 相似度阈值
    pub threshold: f64,

    /// 检索超时时间（秒）
    pub timeout_seconds: u64,
}

/// 联网搜索（Tavily）配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Tavily API KEY，为空时记录mock结果
    pub api_key: Option<String>,

    /// 搜索接口基地址
    pub api_base_url: String,

    /// 搜索深度
    pub search_depth: String,

    /// 每个查询最多返回的结果数
    pub max_results: u32,

    /// 每个phase最多执行的查询数
    pub max_queries: usize,
}

/// 分阶段调研配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ResearchConfig {
    /// phase模板与查询文件目录
    pub phases_data_dir: PathBuf,

    /// 搜索结果缓存目录
    pub search_results_dir: PathBuf,

    /// 每批并发执行的phase数量
    pub batch_size: usize,

    /// 批次之间的等待时间（毫秒）
    pub batch_delay_ms: u64,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 公司目录名：空格替换为下划线并转小写
    pub fn company_slug(&self) -> String {
        crate::utils::text::company_slug(&self.company)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            company: String::new(),
            industry: String::from("Technology"),
            country: String::from("United States"),
            initial_prompt: String::from("I want to set up Core HR and Payroll for my company"),
            output_path: PathBuf::from(env_or("OUTPUT_DIR", "output")),
            skip_prerequisites: false,
            research_only: false,
            verbose: false,
            llm: LLMConfig::default(),
            retrieval: RetrievalConfig::default(),
            search: SearchConfig::default(),
            research: ResearchConfig::default(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("LLM_AUTH_TOKEN").unwrap_or_default(),
            api_base_url: env_or("LLM_API_BASE", "https://api.openai.com/v1"),
            model: env_or("LLM_MODEL_ID", "openai/gpt-oss-20b"),
            max_tokens: 8000,
            temperature: 0.2,
            retry_attempts: 3,
            retry_delay_ms: 2000,
            incomplete_retry_delay_ms: 1000,
            timeout_seconds: 300,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            api_url: env_or(
                "QUESTION_API_URL",
                "https://runpodroute.preprod.opkeyone.com/GenericRAGDev/api/v1/query/search",
            ),
            collection: env_or("QUESTION_COLLECTION", "questionnaire_items"),
            limit: 100,
            threshold: 0.1,
            timeout_seconds: 30,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("TAVILY_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            api_base_url: String::from("https://api.tavily.com"),
            search_depth: String::from("advanced"),
            max_results: 10,
            max_queries: 3,
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            phases_data_dir: PathBuf::from("phases_data"),
            search_results_dir: PathBuf::from("search_results"),
            batch_size: 3,
            batch_delay_ms: 2000,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
