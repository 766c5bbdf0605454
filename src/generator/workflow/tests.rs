#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    use crate::generator::workflow::{
        Command, TimingKeys, TimingScope, parse_command, research_only, run_session,
    };
    use crate::generator::testing::{StaticQuestions, config_in, context_with};
    use crate::llm::client::testing::ScriptedModel;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("   "), Command::Empty);
        assert_eq!(
            parse_command(" We pay weekly "),
            Command::Message("We pay weekly".to_string())
        );
        assert_eq!(parse_command("/questions"), Command::Questions(None));
        assert_eq!(
            parse_command("/questions  Core HR "),
            Command::Questions(Some("Core HR".to_string()))
        );
        assert_eq!(parse_command("/Categories"), Command::Categories);
        assert_eq!(parse_command("/status"), Command::Status);
        assert_eq!(parse_command("/export"), Command::Export);
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("/reset"), Command::Unknown("reset".to_string()));
    }

    #[test]
    fn test_timing_scope() {
        let mut timing = TimingScope::new();
        timing.start_phase(TimingKeys::RESEARCH);
        std::thread::sleep(Duration::from_millis(5));

        let duration = timing.end_phase(TimingKeys::RESEARCH).unwrap();
        assert!(duration >= Duration::from_millis(5));
        assert!(timing.end_phase(TimingKeys::RESEARCH).is_none());
        assert_eq!(timing.get_phase_durations().len(), 1);

        let report = timing.generate_timing_report();
        assert!(report.starts_with("总执行时间:"));
        assert!(report.contains("- research:"));
    }

    #[tokio::test]
    async fn test_research_only_generates_profile() {
        let dir = TempDir::new().unwrap();
        let context = context_with(
            config_in(&dir),
            Arc::new(ScriptedModel::failing()),
            Arc::new(StaticQuestions::default()),
        );
        let mut timing = TimingScope::new();

        let consolidated = research_only(&context, &mut timing).await.unwrap();

        assert!(consolidated.is_empty());
        assert!(context.workspace.consolidated_path().exists());
        assert_eq!(timing.get_phase_durations()[0].0, TimingKeys::RESEARCH);
    }

    #[tokio::test]
    async fn test_session_runs_commands_and_saves_outputs() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.skip_prerequisites = true;
        let model = Arc::new(ScriptedModel::with_responder(|request| {
            let system = request.system.as_deref().unwrap_or_default();
            if system.contains("Available Oracle HCM domains") {
                Ok(r#"{"tags": ["payroll"], "reasoning": "Payroll"}"#.to_string())
            } else if system.contains("filling out a questionnaire") {
                Ok(r#"[{"id": "payroll_1", "answer": "Monthly", "confidence": "medium", "source": "industryAnalysis"}]"#.to_string())
            } else if system.contains("analyzing user messages") {
                Ok(r#"{"reasoning": "Small talk"}"#.to_string())
            } else {
                Ok("Happy to help.".to_string())
            }
        }));
        let context = context_with(
            config,
            model,
            Arc::new(StaticQuestions::default().with_tag("payroll", &["What is your pay frequency?"])),
        );
        context
            .workspace
            .write_json(&context.workspace.consolidated_path(), &json!({}))
            .await
            .unwrap();
        let workspace = context.workspace.clone();

        let input: &[u8] = b"/status\n/questions payroll\n\nHello there\n/nope\n/quit\nignored after quit\n";
        let mut timing = TimingScope::new();
        let agent = run_session(context, input, &mut timing).await.unwrap();

        assert_eq!(agent.history().len(), 3);
        assert_eq!(agent.history()[2].content, "Happy to help.");

        let exported: Value = workspace
            .read_json(&workspace.questionnaire_path())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exported[0]["answer"], json!("Monthly"));
        assert!(workspace.transcript_path(agent.session_id()).exists());

        let phases: Vec<&str> = timing
            .get_phase_durations()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(
            phases,
            vec![
                TimingKeys::INITIALIZATION,
                TimingKeys::CONVERSATION,
                TimingKeys::EXPORT
            ]
        );
    }
}
