use crate::config::{Config, LLMProvider};
use anyhow::{Result, bail};
use clap::Parser;
use std::path::PathBuf;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "copilot.toml";

/// Config Copilot - 面向Oracle Fusion ERP/HCM实施的对话式配置助手
#[derive(Parser, Debug)]
#[command(name = "config-copilot")]
#[command(
    about = "Conversational configuration assistant for Oracle Fusion ERP/HCM. It researches the company, retrieves the relevant questionnaire, pre-fills the answers and lets you refine them through chat."
)]
#[command(version)]
pub struct Args {
    /// 公司名称
    #[arg(long)]
    pub company: Option<String>,

    /// 所属行业
    #[arg(short, long)]
    pub industry: Option<String>,

    /// 所在国家
    #[arg(long)]
    pub country: Option<String>,

    /// 初始配置诉求
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// 输出路径
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 跳过前置问题访谈
    #[arg(long)]
    pub skip_prerequisites: bool,

    /// 仅生成公司合并档案
    #[arg(long)]
    pub research_only: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// 模型名称
    #[arg(long)]
    pub model: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM Provider (openai, moonshot, deepseek, mistral, openrouter, anthropic, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 问卷检索接口地址
    #[arg(long)]
    pub question_api_url: Option<String>,

    /// Tavily API KEY
    #[arg(long)]
    pub tavily_api_key: Option<String>,

    /// 每批并发执行的phase数量
    #[arg(long)]
    pub batch_size: Option<usize>,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            // 显式指定的配置文件必须可读
            Some(config_path) => Config::from_file(config_path)?,
            None => {
                let default_config_path = std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join(DEFAULT_CONFIG_FILE);
                if default_config_path.exists() {
                    Config::from_file(&default_config_path)?
                } else {
                    Config::default()
                }
            }
        };

        // 覆盖配置文件中的设置
        if let Some(company) = self.company {
            config.company = company;
        }
        if let Some(industry) = self.industry {
            config.industry = industry;
        }
        if let Some(country) = self.country {
            config.country = country;
        }
        if let Some(prompt) = self.prompt {
            config.initial_prompt = prompt;
        }
        if let Some(output_path) = self.output_path {
            config.output_path = output_path;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            match provider_str.parse::<LLMProvider>() {
                Ok(provider) => config.llm.provider = provider,
                Err(_) => eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用默认provider",
                    provider_str
                ),
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        // 外部服务
        if let Some(question_api_url) = self.question_api_url {
            config.retrieval.api_url = question_api_url;
        }
        if let Some(tavily_api_key) = self.tavily_api_key {
            config.search.api_key = Some(tavily_api_key).filter(|key| !key.trim().is_empty());
        }
        if let Some(batch_size) = self.batch_size {
            config.research.batch_size = batch_size.max(1);
        }

        // 其他配置
        config.skip_prerequisites |= self.skip_prerequisites;
        config.research_only |= self.research_only;
        config.verbose |= self.verbose;

        if config.company.trim().is_empty() {
            bail!("公司名称不能为空，请使用 --company 或在配置文件中设置 company");
        }

        Ok(config)
    }
}

// Include tests
#[cfg(test)]
mod tests;
