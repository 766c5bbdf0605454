use crate::config::Config;
use crate::generator::context::GeneratorContext;
use crate::generator::conversation::agent::ConversationalAgent;
use crate::generator::conversation::display::{
    render_agent_panel, render_categories, render_status,
};
use crate::generator::questionnaire::retriever::{QuestionRetriever, QuestionSource};
use crate::generator::research;
use crate::generator::research::search::TavilyClient;
use crate::llm::client::LLMClient;
use crate::types::profile::{CompanyProfile, ConsolidatedProfile};

use anyhow::Result;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: std::time::Instant,
    phase_start_times: HashMap<String, std::time::Instant>,
    phase_durations: Vec<(String, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: std::time::Instant::now(),
            phase_start_times: HashMap::new(),
            phase_durations: Vec::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &str) {
        self.phase_start_times
            .insert(phase_name.to_string(), std::time::Instant::now());
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, phase_name: &str) -> Option<Duration> {
        let start_time = self.phase_start_times.remove(phase_name)?;
        let duration = start_time.elapsed();
        self.phase_durations.push((phase_name.to_string(), duration));
        Some(duration)
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 获取所有阶段的执行时间（按结束顺序）
    pub fn get_phase_durations(&self) -> &[(String, Duration)] {
        &self.phase_durations
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.get_total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\n各阶段执行时间:\n");
            for (phase, duration) in &self.phase_durations {
                report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
            }
        }

        report
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const RESEARCH: &'static str = "research";
    pub const INITIALIZATION: &'static str = "initialization";
    pub const CONVERSATION: &'static str = "conversation";
    pub const EXPORT: &'static str = "export";
}

const HELP_TEXT: &str = r#"📖 可用命令:
  /questions [category]  查看问题面板（All 或分类名，默认第一个分类）
  /categories            查看分类及回答进度
  /status                查看当前状态
  /export                导出问卷
  /help                  显示帮助
  /quit                  保存并退出
其他输入将作为对话消息发送给助手"#;

/// REPL命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Message(String),
    Questions(Option<String>),
    Categories,
    Status,
    Export,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

/// 解析一行输入
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Command::Message(line.to_string());
    };

    let (name, argument) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, Some(rest.trim().to_string()).filter(|r| !r.is_empty())),
        None => (command, None),
    };
    match name.to_lowercase().as_str() {
        "questions" | "q" => Command::Questions(argument),
        "categories" => Command::Categories,
        "status" => Command::Status,
        "export" => Command::Export,
        "help" | "h" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(name.to_string()),
    }
}

/// 执行一条命令，返回要展示的文本
pub async fn dispatch(agent: &mut ConversationalAgent, command: Command) -> Result<String> {
    Ok(match command {
        Command::Message(text) => {
            let before = agent.questions().len();
            let reply = agent.process_message(&text).await;
            let mut output = format!("🤖 {}\n\n{}", reply, render_status(&agent.status_summary()));
            let after = agent.questions().len();
            if after != before {
                output.push_str(&format!("\n\n🆕 问题数量: {} -> {}\n\n", before, after));
                output.push_str(&render_agent_panel(agent, Some("All")));
            }
            output
        }
        Command::Questions(category) => render_agent_panel(agent, category.as_deref()),
        Command::Categories => render_categories(agent.questions()),
        Command::Status => render_status(&agent.status_summary()),
        Command::Export => {
            let path = agent.export().await?;
            format!("💾 问卷已导出: {}", path.display())
        }
        Command::Help => HELP_TEXT.to_string(),
        Command::Unknown(name) => format!("❓ 未知命令: /{}，输入 /help 查看可用命令", name),
        Command::Quit | Command::Empty => String::new(),
    })
}

/// 启动配置助手
pub async fn launch(config: &Config) -> Result<()> {
    let mut timing = TimingScope::new();

    let llm = Arc::new(LLMClient::new(&config.llm)?);
    // 启动时检查模型连接
    llm.check_connection().await?;

    let questions = Arc::new(QuestionRetriever::new(&config.retrieval)?);
    if questions.check_connection().await {
        println!("✅ 问卷检索服务连接正常");
    } else {
        tracing::warn!("⚠️ 问卷检索服务不可用，问题检索可能为空");
    }

    let search = Arc::new(TavilyClient::new(&config.search)?);
    let context = GeneratorContext::with_services(config.clone(), llm, questions, search);

    if config.research_only {
        research_only(&context, &mut timing).await?;
    } else {
        let input = BufReader::new(tokio::io::stdin());
        run_session(context, input, &mut timing).await?;
    }

    println!("\n⏱️ {}", timing.generate_timing_report());
    Ok(())
}

/// 只生成公司合并档案
pub async fn research_only(
    context: &GeneratorContext,
    timing: &mut TimingScope,
) -> Result<ConsolidatedProfile> {
    let profile = CompanyProfile::from(&context.config);

    timing.start_phase(TimingKeys::RESEARCH);
    let consolidated = research::load_or_generate(context, &profile).await?;
    timing.end_phase(TimingKeys::RESEARCH);

    println!(
        "✅ {} 的公司档案已就绪，共 {} 个section: {}",
        profile.company,
        consolidated.len(),
        context.workspace.consolidated_path().display()
    );
    Ok(consolidated)
}

/// 初始化Agent并运行REPL，输入结束或 `/quit` 后导出问卷与对话记录
pub async fn run_session<R>(
    context: GeneratorContext,
    input: R,
    timing: &mut TimingScope,
) -> Result<ConversationalAgent>
where
    R: AsyncBufRead + Unpin,
{
    let initial_prompt = context.config.initial_prompt.clone();
    let mut agent = ConversationalAgent::new(context);

    timing.start_phase(TimingKeys::INITIALIZATION);
    let opening = agent.initialize(&initial_prompt).await?;
    timing.end_phase(TimingKeys::INITIALIZATION);

    println!("\n🤖 {}\n", opening);
    if !agent.questions().is_empty() {
        println!("{}\n", render_agent_panel(&agent, None));
    }
    println!("{}", render_status(&agent.status_summary()));
    println!("💡 输入 /help 查看可用命令");

    timing.start_phase(TimingKeys::CONVERSATION);
    let mut lines = input.lines();
    loop {
        print!("\n💬 > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_command(&line) {
            Command::Quit => break,
            Command::Empty => continue,
            command => match dispatch(&mut agent, command).await {
                Ok(output) => println!("{}", output),
                Err(e) => {
                    tracing::error!("❌ 命令执行失败: {:#}", e);
                    println!("⚠️ 命令执行失败: {}", e);
                }
            },
        }
    }
    timing.end_phase(TimingKeys::CONVERSATION);

    timing.start_phase(TimingKeys::EXPORT);
    if !agent.questions().is_empty() {
        agent.export().await?;
    }
    let transcript = agent.save_transcript().await?;
    timing.end_phase(TimingKeys::EXPORT);

    println!("👋 会话结束，对话记录: {}", transcript.display());
    Ok(agent)
}

// Include tests
#[cfg(test)]
mod tests;
