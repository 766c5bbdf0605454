//! 终端展示：问题面板、分类列表与状态栏

use crate::generator::conversation::agent::{AgentStatus, ConversationalAgent, categorize};
use crate::types::conversation::AgentPhase;
use crate::types::question::Question;
use crate::utils::text::ellipsize;

const ALL: &str = "All";

/// 选择要展示的分类：`All`、已有分类名，或默认第一个分类
pub fn resolve_category<'a>(questions: &'a [Question], requested: Option<&str>) -> &'a str {
    let categories = categorize(questions);
    match requested.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) if r.eq_ignore_ascii_case(ALL) => ALL,
        Some(r) => categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(r))
            .map(|c| c.name)
            .unwrap_or(ALL),
        None => categories.first().map(|c| c.name).unwrap_or(ALL),
    }
}

fn render_question(question: &Question) -> String {
    let (icon, answer) = if question.has_open_answer() {
        ("⏳", "Waiting for information...".to_string())
    } else {
        ("✅", question.answer.clone().unwrap_or_default())
    };

    let mut line = format!("{} [{}] {}\n     → {}", icon, question.id, question.text, answer);
    if question.updated_from_conversation {
        line.push_str("  (updated from conversation)");
    }
    line
}

/// 渲染问题面板：总览、分类标签页与当前分类的问题列表
pub fn render_panel(questions: &[Question], requested: Option<&str>) -> String {
    if questions.is_empty() {
        return "📭 No questions loaded yet.".to_string();
    }

    let categories = categorize(questions);
    let answered = questions.iter().filter(|q| !q.has_open_answer()).count();
    let selected = resolve_category(questions, requested);

    let mut out = String::new();
    out.push_str(&format!(
        "📋 Configuration Questions: {} total | ✅ {} answered | ⏳ {} pending | 📂 {} categories\n",
        questions.len(),
        answered,
        questions.len() - answered,
        categories.len()
    ));

    let tabs = std::iter::once((ALL, questions.len()))
        .chain(categories.iter().map(|c| (c.name, c.questions.len())))
        .map(|(name, count)| {
            let tab = format!("{} ({})", name, count);
            if name == selected {
                format!("[{}]", tab)
            } else {
                tab
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(&format!("{}\n\n", tabs));

    for category in &categories {
        if selected != ALL && category.name != selected {
            continue;
        }
        out.push_str(&format!("## {}\n", category.name));
        for question in &category.questions {
            out.push_str(&render_question(question));
            out.push('\n');
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// 渲染分类列表
pub fn render_categories(questions: &[Question]) -> String {
    let categories = categorize(questions);
    if categories.is_empty() {
        return "📭 No categories yet.".to_string();
    }
    categories
        .iter()
        .map(|c| {
            let answered = c.questions.iter().filter(|q| !q.has_open_answer()).count();
            format!(
                "📂 {} - {}/{} answered",
                ellipsize(c.name, 60),
                answered,
                c.questions.len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 按阶段渲染状态栏
pub fn render_status(status: &AgentStatus) -> String {
    match status.phase {
        AgentPhase::NotStarted => "💤 Not started".to_string(),
        AgentPhase::Generating => format!("⏳ Preparing configuration for {}...", status.company),
        AgentPhase::Error => "❌ Initialization failed".to_string(),
        AgentPhase::Prerequisites => {
            let (answered, total) = status.prerequisite_progress.unwrap_or_default();
            format!(
                "📋 Prerequisites for {}: {}/{} answered",
                status.company, answered, total
            )
        }
        AgentPhase::Ready | AgentPhase::Conversing => {
            let mut line = format!(
                "🏢 {} ({}) | 🎯 {} | 📋 {} questions, ✅ {} answered | 💡 {} facts",
                status.company,
                status.industry,
                status.tags.join(", "),
                status.total_questions,
                status.answered,
                status.facts
            );
            if let Some(at) = status.last_update {
                line.push_str(&format!(" | 🕒 {}", at.format("%H:%M:%S")));
            }
            line
        }
    }
}

/// 渲染Agent当前的问题面板
pub fn render_agent_panel(agent: &ConversationalAgent, requested: Option<&str>) -> String {
    render_panel(agent.questions(), requested)
}
