#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::generator::research::load_or_generate;
    use crate::generator::research::orchestrator::ResearchOrchestrator;
    use crate::generator::research::phases::phase1::CompanyDiscovery;
    use crate::generator::research::phases::phase5::CurrencyLocalization;
    use crate::generator::testing::{StaticQuestions, config_in, context_with};
    use crate::llm::client::testing::ScriptedModel;
    use crate::types::profile::CompanyProfile;

    fn profile() -> CompanyProfile {
        CompanyProfile::new("Acme Corp", "Retail", "Canada")
    }

    #[tokio::test]
    async fn test_existing_consolidated_profile_is_loaded() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(ScriptedModel::failing());
        let context = context_with(config_in(&dir), model.clone(), Arc::new(StaticQuestions::default()));
        context
            .workspace
            .write_json(
                &context.workspace.consolidated_path(),
                &json!({ "companyProfile": { "companyName": "Acme Corp" } }),
            )
            .await
            .unwrap();

        let consolidated = load_or_generate(&context, &profile()).await.unwrap();

        assert_eq!(consolidated["companyProfile"]["companyName"], json!("Acme Corp"));
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_generate_runs_phases_and_skips_failures() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(ScriptedModel::with_responder(|request| {
            if request.prompt.contains("**PHASE 1**") {
                Ok(r#"```json
{"companyName": "Acme Corp", "legalName": "Acme Corporation", "hqCountry": "Canada", "leadership": {"ceo": "Jane Roe"}}
```"#
                    .to_string())
            } else {
                Err(anyhow::anyhow!("provider unavailable"))
            }
        }));
        let mut config = config_in(&dir);
        config.research.batch_size = 1;
        let context = context_with(config, model.clone(), Arc::new(StaticQuestions::default()));

        let orchestrator = ResearchOrchestrator::with_phases(vec![
            Box::new(CompanyDiscovery),
            Box::new(CurrencyLocalization),
        ]);
        let consolidated = orchestrator
            .load_or_generate(&context, &profile())
            .await
            .unwrap();

        assert_eq!(consolidated.len(), 1);
        let company = &consolidated["companyProfile"];
        assert_eq!(company["legalName"], json!("Acme Corporation"));
        assert_eq!(company["leadership_ceo"], json!("Jane Roe"));
        assert_eq!(company["fiscalYearEnd"], json!("December"));
        assert!(company.get("_validation_metadata").is_none());

        let phase1: Value = context
            .workspace
            .read_json(&context.workspace.phase_output_path(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            phase1["_validation_metadata"]["required_fields_missing"],
            json!(["website", "businessModel", "hqStreetAddress", "hqCity", "hqState"])
        );
        assert!(!context.workspace.phase_output_path(5).exists());

        let search: Value = context
            .workspace
            .read_json(&context.workspace.search_results_path(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(search[0]["status"], json!("mock"));

        let saved: Value = context
            .workspace
            .read_json(&context.workspace.consolidated_path())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved, Value::Object(consolidated));
    }

    #[tokio::test]
    async fn test_phase_uses_template_override_and_cached_search() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(ScriptedModel::new([r#"{"primaryCurrency": "CAD"}"#]));
        let context = context_with(config_in(&dir), model.clone(), Arc::new(StaticQuestions::default()));

        std::fs::create_dir_all(&context.config.research.phases_data_dir).unwrap();
        std::fs::write(
            context
                .config
                .research
                .phases_data_dir
                .join("phase5-currency-localization.json"),
            r#"{"primaryCurrency": "{{OVERRIDE_MARKER}}"}"#,
        )
        .unwrap();
        context
            .workspace
            .write_json(
                &context.workspace.search_results_path(5),
                &json!([{ "query": "cached query", "status": "success" }]),
            )
            .await
            .unwrap();

        let orchestrator = ResearchOrchestrator::with_phases(vec![Box::new(CurrencyLocalization)]);
        let consolidated = orchestrator
            .load_or_generate(&context, &profile())
            .await
            .unwrap();

        let prompt = &model.requests()[0].prompt;
        assert!(prompt.contains("OVERRIDE_MARKER"));
        assert!(prompt.contains("cached query"));
        assert!(prompt.contains("**PHASE 5 FOCUS**"));
        assert!(model.requests()[0].expect_json);

        let section = &consolidated["currencyLocalization"];
        assert_eq!(section["primaryCurrency"], json!("CAD"));
        assert_eq!(section["functionalCurrency"], json!("CAD"));
        assert!(
            context.workspace.extracted_data_path(5).exists(),
            "extracted data is saved next to the search cache"
        );
    }

    #[tokio::test]
    async fn test_invalid_template_fails_phase() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(ScriptedModel::new([r#"{"primaryCurrency": "CAD"}"#]));
        let context = context_with(config_in(&dir), model.clone(), Arc::new(StaticQuestions::default()));

        std::fs::create_dir_all(&context.config.research.phases_data_dir).unwrap();
        std::fs::write(
            context
                .config
                .research
                .phases_data_dir
                .join("phase5-currency-localization.json"),
            "{ broken",
        )
        .unwrap();

        let orchestrator = ResearchOrchestrator::with_phases(vec![Box::new(CurrencyLocalization)]);
        let consolidated = orchestrator
            .load_or_generate(&context, &profile())
            .await
            .unwrap();

        assert!(consolidated.is_empty());
        assert!(model.requests().is_empty());
    }
}
