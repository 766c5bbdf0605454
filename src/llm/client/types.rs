/// 一次单轮补全请求
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    /// 系统提示词
    pub system: Option<String>,
    /// 用户提示词
    pub prompt: String,
    /// 覆盖配置中的温度
    pub temperature: Option<f64>,
    /// 覆盖配置中的最大tokens
    pub max_tokens: Option<u32>,
    /// 期望返回JSON：响应被截断时会重试
    pub expect_json: bool,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn expect_json(mut self) -> Self {
        self.expect_json = true;
        self
    }
}
