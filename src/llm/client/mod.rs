//! LLM客户端 - 提供统一的LLM服务接口

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::config::LLMConfig;

mod providers;
pub mod types;
pub mod utils;

#[cfg(test)]
pub mod testing;

pub use types::CompletionRequest;

use providers::{AgentSettings, ProviderClient};
use utils::looks_complete;

/// 语言模型接口，所有生成器通过它调用模型
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// 单轮补全，返回模型输出文本
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// LLM客户端 - 提供统一的LLM服务接口
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: &LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(config)?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<()> {
        println!("🔄 正在检查模型连接...");
        let request = CompletionRequest::new("Hello")
            .with_system("You are a helpful assistant.")
            .max_tokens(16);
        match self.complete(request).await {
            Ok(_) => {
                println!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }

    async fn prompt_once(&self, request: &CompletionRequest) -> Result<String> {
        let settings = AgentSettings {
            model: &self.config.model,
            system_prompt: request.system.as_deref().unwrap_or_default(),
            temperature: request.temperature.unwrap_or(self.config.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
        };
        let agent = self.client.create_agent(&settings);

        let timeout = Duration::from_secs(self.config.timeout_seconds);
        match tokio::time::timeout(timeout, agent.prompt(&request.prompt)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!(
                "模型调用超时（{}秒）",
                self.config.timeout_seconds
            )),
        }
    }
}

#[async_trait]
impl LanguageModel for LLMClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        tracing::debug!(
            model = %self.config.model,
            prompt_chars = request.prompt.len(),
            expect_json = request.expect_json,
            "调用模型"
        );
        retry_completion(&self.config, request.expect_json, || {
            self.prompt_once(&request)
        })
        .await
    }
}

/// 通用重试逻辑
///
/// - 调用出错：等待 `retry_delay_ms` 后重试，最后一次仍失败则返回错误
/// - 期望JSON但响应被截断：等待 `incomplete_retry_delay_ms` 后重试，最后一次直接返回截断内容
pub async fn retry_completion<F, Fut>(
    config: &LLMConfig,
    expect_json: bool,
    operation: F,
) -> Result<String>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let max_retries = config.retry_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(response) => {
                if !expect_json || looks_complete(&response) {
                    return Ok(response);
                }
                if attempt >= max_retries {
                    tracing::warn!("⚠️ 最后一次尝试响应仍不完整，返回截断内容");
                    return Ok(response);
                }
                eprintln!(
                    "⚠️ 模型响应不完整，重试中 (第 {} / {}次尝试)",
                    attempt, max_retries
                );
                tokio::time::sleep(Duration::from_millis(config.incomplete_retry_delay_ms)).await;
            }
            Err(err) => {
                eprintln!(
                    "❌ 调用模型服务出错，重试中 (第 {} / {}次尝试): {}",
                    attempt, max_retries, err
                );
                if attempt >= max_retries {
                    return Err(err);
                }
                tokio::time::sleep(Duration::from_millis(config.retry_delay_ms)).await;
            }
        }
    }
}
