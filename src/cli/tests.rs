#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use crate::config::LLMProvider;
    use clap::Parser;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_args_default_values() {
        let args = Args::try_parse_from(["config-copilot"]).unwrap();

        assert_eq!(args.company, None);
        assert_eq!(args.output_path, None);
        assert!(!args.skip_prerequisites);
        assert!(!args.research_only);
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_short_options() {
        let args = Args::try_parse_from([
            "config-copilot",
            "-i", "Retail",
            "-p", "Set up payroll",
            "-o", "/test/output",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.industry, Some("Retail".to_string()));
        assert_eq!(args.prompt, Some("Set up payroll".to_string()));
        assert_eq!(args.output_path, Some(PathBuf::from("/test/output")));
        assert!(args.verbose);
    }

    #[test]
    fn test_into_config_with_overrides() {
        let args = Args::try_parse_from([
            "config-copilot",
            "--company", "Acme Corp",
            "--country", "Canada",
            "--skip-prerequisites",
            "--research-only",
            "--llm-provider", "deepseek",
            "--model", "deepseek-chat",
            "--max-tokens", "4096",
            "--temperature", "0.5",
            "--tavily-api-key", "tvly-key",
            "--batch-size", "0",
        ])
        .unwrap();

        let config = args.into_config().unwrap();

        assert_eq!(config.company, "Acme Corp");
        assert_eq!(config.country, "Canada");
        assert!(config.skip_prerequisites);
        assert!(config.research_only);
        assert_eq!(config.llm.provider, LLMProvider::DeepSeek);
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.llm.temperature, 0.5);
        assert_eq!(config.search.api_key.as_deref(), Some("tvly-key"));
        assert_eq!(config.research.batch_size, 1);
    }

    #[test]
    fn test_into_config_requires_company() {
        let args = Args::try_parse_from(["config-copilot", "--company", "  "]).unwrap();
        assert!(args.into_config().is_err());
    }

    #[test]
    fn test_into_config_unknown_provider_keeps_default() {
        let args = Args::try_parse_from([
            "config-copilot",
            "--company", "Acme",
            "--llm-provider", "invalid",
        ])
        .unwrap();

        let config = args.into_config().unwrap();
        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
    }

    #[test]
    fn test_into_config_reads_file_then_applies_flags() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
company = "File Corp"
industry = "Healthcare"
skip_prerequisites = true

[research]
batch_size = 2
"#
        )
        .unwrap();

        let args = Args::try_parse_from([
            "config-copilot",
            "-c", file.path().to_str().unwrap(),
            "--industry", "Banking",
        ])
        .unwrap();
        let config = args.into_config().unwrap();

        assert_eq!(config.company, "File Corp");
        assert_eq!(config.industry, "Banking");
        assert!(config.skip_prerequisites);
        assert_eq!(config.research.batch_size, 2);
    }

    #[test]
    fn test_into_config_missing_file_is_error() {
        let args = Args::try_parse_from([
            "config-copilot",
            "--company", "Acme",
            "-c", "/definitely/not/here.toml",
        ])
        .unwrap();
        assert!(args.into_config().is_err());
    }
}
