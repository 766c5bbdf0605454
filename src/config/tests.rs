#[cfg(test)]
mod tests {
    use crate::config::{
        Config, LLMConfig, LLMProvider, ResearchConfig, RetrievalConfig, SearchConfig,
    };
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert!(config.company.is_empty());
        assert_eq!(config.industry, "Technology");
        assert_eq!(config.country, "United States");
        assert!(!config.initial_prompt.is_empty());
        assert!(!config.skip_prerequisites);
        assert!(!config.research_only);
        assert!(!config.verbose);
    }

    #[test]
    fn test_llm_provider_default() {
        let provider = LLMProvider::default();
        assert_eq!(provider, LLMProvider::OpenAI);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!(
            "openai".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        assert_eq!(
            "Moonshot".parse::<LLMProvider>().unwrap(),
            LLMProvider::Moonshot
        );
        assert_eq!(
            "deepseek".parse::<LLMProvider>().unwrap(),
            LLMProvider::DeepSeek
        );
        assert_eq!(
            "mistral".parse::<LLMProvider>().unwrap(),
            LLMProvider::Mistral
        );
        assert_eq!(
            "openrouter".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenRouter
        );
        assert_eq!(
            "ANTHROPIC".parse::<LLMProvider>().unwrap(),
            LLMProvider::Anthropic
        );
        assert_eq!(
            "ollama".parse::<LLMProvider>().unwrap(),
            LLMProvider::Ollama
        );

        assert!("gemini".parse::<LLMProvider>().is_err());
        assert!("invalid".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_llm_provider_display() {
        assert_eq!(LLMProvider::OpenAI.to_string(), "openai");
        assert_eq!(LLMProvider::Moonshot.to_string(), "moonshot");
        assert_eq!(LLMProvider::DeepSeek.to_string(), "deepseek");
        assert_eq!(LLMProvider::Mistral.to_string(), "mistral");
        assert_eq!(LLMProvider::OpenRouter.to_string(), "openrouter");
        assert_eq!(LLMProvider::Anthropic.to_string(), "anthropic");
        assert_eq!(LLMProvider::Ollama.to_string(), "ollama");
    }

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        assert_eq!(config.provider, LLMProvider::OpenAI);
        // api_key may be empty if env var is not set
        assert!(!config.api_base_url.is_empty());
        assert!(!config.model.is_empty());
        assert_eq!(config.max_tokens, 8000);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay_ms, 2000);
        assert_eq!(config.incomplete_retry_delay_ms, 1000);
    }

    #[test]
    fn test_retrieval_config_default() {
        let config = RetrievalConfig::default();

        assert!(!config.api_url.is_empty());
        assert!(!config.collection.is_empty());
        assert_eq!(config.limit, 100);
        assert_eq!(config.threshold, 0.1);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_search_and_research_defaults() {
        let search = SearchConfig::default();
        assert_eq!(search.search_depth, "advanced");
        assert_eq!(search.max_results, 10);
        assert_eq!(search.max_queries, 3);

        let research = ResearchConfig::default();
        assert_eq!(research.phases_data_dir, PathBuf::from("phases_data"));
        assert_eq!(research.search_results_dir, PathBuf::from("search_results"));
        assert_eq!(research.batch_size, 3);
        assert_eq!(research.batch_delay_ms, 2000);
    }

    #[test]
    fn test_company_slug() {
        let config = Config {
            company: "Acme Global Corp".to_string(),
            ..Default::default()
        };

        assert_eq!(config.company_slug(), "acme_global_corp");
    }

    #[test]
    fn test_from_file_partial_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("copilot.toml");

        let content = r#"
company = "Test Corp"
industry = "Manufacturing"
country = "Germany"

[llm]
provider = "deepseek"
model = "deepseek-chat"
temperature = 0.4

[research]
batch_size = 2
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.company, "Test Corp");
        assert_eq!(config.industry, "Manufacturing");
        assert_eq!(config.country, "Germany");
        assert_eq!(config.llm.provider, LLMProvider::DeepSeek);
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.llm.temperature, 0.4);
        // 未配置的字段使用默认值
        assert_eq!(config.llm.max_tokens, 8000);
        assert_eq!(config.research.batch_size, 2);
        assert_eq!(config.research.batch_delay_ms, 2000);
        assert_eq!(config.retrieval.limit, 100);
    }

    #[test]
    fn test_from_file_missing_and_invalid() {
        let temp_dir = TempDir::new().unwrap();

        assert!(Config::from_file(&temp_dir.path().join("missing.toml")).is_err());

        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "company = [unclosed").unwrap();
        assert!(Config::from_file(&path).is_err());
    }
}
