use std::sync::Arc;

use crate::{
    config::Config,
    generator::{
        questionnaire::retriever::QuestionSource, research::search::WebSearch,
    },
    llm::client::LanguageModel,
    workspace::CompanyWorkspace,
};

#[derive(Clone)]
pub struct GeneratorContext {
    /// LLM调用器，用于与AI通信。
    pub llm: Arc<dyn LanguageModel>,
    /// 配置
    pub config: Config,
    /// 问卷检索服务
    pub questions: Arc<dyn QuestionSource>,
    /// 联网搜索服务
    pub search: Arc<dyn WebSearch>,
    /// 公司工作区
    pub workspace: CompanyWorkspace,
}

impl GeneratorContext {
    /// 使用给定的服务实现创建上下文
    pub fn with_services(
        config: Config,
        llm: Arc<dyn LanguageModel>,
        questions: Arc<dyn QuestionSource>,
        search: Arc<dyn WebSearch>,
    ) -> Self {
        let workspace = CompanyWorkspace::new(&config);
        Self {
            llm,
            config,
            questions,
            search,
            workspace,
        }
    }
}
