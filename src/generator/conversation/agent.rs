//! 对话Agent：维护问卷状态，并根据对话增量合并问题与答案

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::generator::context::GeneratorContext;
use crate::generator::questionnaire::filler::{self, prefill};
use crate::generator::questionnaire::intent::{extract_intent, validate_tags};
use crate::generator::questionnaire::prerequisites::PrerequisiteManager;
use crate::generator::research;
use crate::llm::client::CompletionRequest;
use crate::types::conversation::{AgentPhase, ChatMessage, MessageAnalysis, Role};
use crate::types::intent::IntentResult;
use crate::types::profile::{CompanyProfile, ConsolidatedProfile};
use crate::types::question::Question;
use crate::utils::json_repair::{parse_array_response, strip_code_fences};
use crate::utils::text::{truncate_chars, value_to_text};

/// 没有检索到问题时使用的默认标签
const DEFAULT_TAGS: [&str; 2] = ["core hr", "payroll"];
/// 每次对话最多更新的未回答问题数
const MAX_ANSWER_UPDATES: usize = 10;
/// 分析消息时带上的最近对话轮数
const RECENT_EXCHANGES: usize = 3;
const SAMPLE_QUESTIONS: usize = 5;

/// 一个问题分类及其问题
#[derive(Debug, Clone, PartialEq)]
pub struct Category<'a> {
    pub name: &'a str,
    pub questions: Vec<&'a Question>,
}

/// 按 `categoryID` 分组（首次出现顺序），缺失时归入 `General`
pub fn categorize(questions: &[Question]) -> Vec<Category<'_>> {
    let mut categories: Vec<Category<'_>> = Vec::new();
    for question in questions {
        let name = question.category();
        match categories.iter_mut().find(|c| c.name == name) {
            Some(category) => category.questions.push(question),
            None => categories.push(Category {
                name,
                questions: vec![question],
            }),
        }
    }
    categories
}

/// Agent状态摘要，用于状态栏展示
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgentStatus {
    pub phase: AgentPhase,
    pub company: String,
    pub industry: String,
    pub tags: Vec<String>,
    pub total_questions: usize,
    pub answered: usize,
    pub categories: usize,
    pub facts: usize,
    /// 前置访谈进度（已回答, 总数）
    pub prerequisite_progress: Option<(usize, usize)>,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct Transcript<'a> {
    session_id: &'a str,
    company: &'a CompanyProfile,
    phase: AgentPhase,
    current_tags: &'a [String],
    extracted_facts: &'a Map<String, Value>,
    conversation_history: &'a [ChatMessage],
    last_update: Option<DateTime<Utc>>,
}

/// 对话式配置Agent
pub struct ConversationalAgent {
    context: GeneratorContext,
    profile: CompanyProfile,
    consolidated: ConsolidatedProfile,
    current_tags: Vec<String>,
    questions: Vec<Question>,
    history: Vec<ChatMessage>,
    facts: Map<String, Value>,
    phase: AgentPhase,
    last_update: Option<DateTime<Utc>>,
    session_id: String,
    pending_intent: Option<IntentResult>,
    prerequisites: PrerequisiteManager,
}

impl ConversationalAgent {
    pub fn new(context: GeneratorContext) -> Self {
        let profile = CompanyProfile::from(&context.config);
        Self {
            context,
            profile,
            consolidated: ConsolidatedProfile::new(),
            current_tags: Vec::new(),
            questions: Vec::new(),
            history: Vec::new(),
            facts: Map::new(),
            phase: AgentPhase::NotStarted,
            last_update: None,
            session_id: uuid::Uuid::new_v4().to_string(),
            pending_intent: None,
            prerequisites: PrerequisiteManager::new(),
        }
    }

    /// 初始化：合并档案 -> 意图分析 ->（前置访谈）-> 检索并预填问题
    ///
    /// 需要前置访谈时返回访谈的开场白，Agent进入 `prerequisites` 阶段；
    /// 否则返回初始化完成的回复。出错时进入 `error` 阶段并返回错误。
    pub async fn initialize(&mut self, initial_prompt: &str) -> Result<String> {
        self.phase = AgentPhase::Generating;
        match self.try_initialize(initial_prompt).await {
            Ok(message) => Ok(message),
            Err(e) => {
                tracing::error!("❌ Agent初始化失败: {:#}", e);
                self.phase = AgentPhase::Error;
                Err(e)
            }
        }
    }

    async fn try_initialize(&mut self, initial_prompt: &str) -> Result<String> {
        tracing::info!("🤖 初始化 {} 的配置Agent", self.profile.company);

        println!("📊 Step 1/4: 获取公司档案...");
        self.consolidated = research::load_or_generate(&self.context, &self.profile).await?;

        println!("🤔 Step 2/4: 分析初始意图...");
        let intent = extract_intent(self.context.llm.as_ref(), initial_prompt, &self.profile).await;
        self.current_tags = intent.tags.clone();

        if !self.context.config.skip_prerequisites {
            let opening = self.prerequisites.initialize(&intent.tags);
            if !self.prerequisites.is_complete() {
                self.pending_intent = Some(intent);
                self.phase = AgentPhase::Prerequisites;
                self.history.push(ChatMessage::assistant(opening.clone()));
                self.touch();
                return Ok(opening);
            }
        }

        self.finish_initialization(intent).await
    }

    async fn finish_initialization(&mut self, intent: IntentResult) -> Result<String> {
        let available = self.context.questions.available_tags();
        let tags = validate_tags(&intent.tags, &available);

        println!("📋 Step 3/4: 检索问题，标签: {:?}", tags);
        let mut questions = self.context.questions.fetch_by_tags(&tags).await;
        if questions.is_empty() {
            tracing::warn!("⚠️ 没有检索到问题，使用默认标签");
            let defaults: Vec<String> = DEFAULT_TAGS.iter().map(|t| t.to_string()).collect();
            questions = self.context.questions.fetch_by_tags(&defaults).await;
        }

        println!("✍️ Step 4/4: 预填 {} 个答案...", questions.len());
        let filled = prefill(
            self.context.llm.as_ref(),
            questions,
            &self.consolidated,
            &self.profile,
        )
        .await;

        self.current_tags = tags;
        self.questions.clear();
        self.merge_questions(filled);

        let response = self.initial_response(&intent);
        self.history.push(
            ChatMessage::assistant(response.clone())
                .with_questions(self.questions.len(), &self.current_tags),
        );
        self.phase = AgentPhase::Ready;
        self.touch();

        tracing::info!("✅ Agent初始化完成，共 {} 个问题", self.questions.len());
        Ok(response)
    }

    fn initial_response(&self, intent: &IntentResult) -> String {
        format!(
            r#"✅ **Configuration Initialized!**

I've analyzed **{company}** (a {industry} company) and found **{count} relevant questions** across these Oracle modules:

🎯 **Identified Modules:** {tags}

📊 **What I found:**
{reasoning}

💬 **Let's refine your configuration!** 

You can:
- Ask me questions about any configuration item
- Tell me more about your requirements
- Request changes to any pre-filled answers
- Add new modules or features

What would you like to know or adjust?"#,
            company = self.profile.company,
            industry = self.profile.industry,
            count = self.questions.len(),
            tags = self.current_tags.join(", "),
            reasoning = intent.reasoning,
        )
    }

    /// 处理一条用户消息，返回助手回复
    pub async fn process_message(&mut self, text: &str) -> String {
        match self.phase {
            AgentPhase::NotStarted => {
                "⚠️ The assistant has not been initialized yet. Please start a configuration first."
                    .to_string()
            }
            AgentPhase::Generating => {
                "⏳ I'm still preparing your configuration. Please wait a moment...".to_string()
            }
            AgentPhase::Error => {
                "❌ Initialization failed. Please check the logs and restart the session."
                    .to_string()
            }
            AgentPhase::Prerequisites => self.answer_prerequisite(text).await,
            AgentPhase::Ready | AgentPhase::Conversing => match self.converse(text).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::error!("❌ 处理消息失败: {:#}", e);
                    format!(
                        "⚠️ I encountered an error: {}. Please try rephrasing your question.",
                        e
                    )
                }
            },
        }
    }

    async fn answer_prerequisite(&mut self, text: &str) -> String {
        self.history.push(ChatMessage::user(text));
        let reply = self
            .prerequisites
            .process_answer(self.context.llm.as_ref(), text)
            .await;

        let response = if reply.is_complete {
            self.record_prerequisite_facts();
            let intent = self.pending_intent.take().unwrap_or_else(|| IntentResult {
                tags: self.current_tags.clone(),
                ..Default::default()
            });
            self.phase = AgentPhase::Generating;
            match self.finish_initialization(intent).await {
                Ok(initialized) => {
                    // finish_initialization已经记录了初始化回复
                    return format!("{}\n\n{}", reply.response, initialized);
                }
                Err(e) => {
                    self.phase = AgentPhase::Error;
                    format!("⚠️ I encountered an error: {}. Please try rephrasing your question.", e)
                }
            }
        } else {
            reply.response
        };

        self.history.push(ChatMessage::assistant(response.clone()));
        self.touch();
        response
    }

    fn record_prerequisite_facts(&mut self) {
        for answer in self.prerequisites.answers_summary().answers {
            self.facts.insert(
                answer.id.clone(),
                json!({
                    "category": answer.category,
                    "question": answer.question,
                    "answer": answer.answer,
                }),
            );
        }
    }

    async fn converse(&mut self, text: &str) -> Result<String> {
        self.phase = AgentPhase::Conversing;
        tracing::info!("💬 处理消息: {}...", truncate_chars(text, 100));
        self.history.push(ChatMessage::user(text));

        let analysis = self.analyze(text).await?;

        for (key, value) in &analysis.extracted_info {
            self.facts.insert(key.clone(), value.clone());
        }

        if analysis.needs_new_questions && !analysis.new_tags.is_empty() {
            self.add_questions_for(&analysis.new_tags).await;
        }

        if !analysis.extracted_info.is_empty() {
            self.update_answers(&analysis.extracted_info).await?;
        }

        tracing::info!(
            "📂 当前共 {} 个问题，{} 个分类",
            self.questions.len(),
            categorize(&self.questions).len()
        );

        let reply = self.reply(&analysis, text).await?;
        self.history
            .push(ChatMessage::assistant(reply.clone()).with_analysis(analysis));
        self.touch();
        Ok(reply)
    }

    async fn analyze(&self, text: &str) -> Result<MessageAnalysis> {
        let system = format!(
            r#"You are an Oracle ERP configuration expert analyzing user messages.

**CURRENT CONFIGURATION STATE:**
- Company: {company} ({industry})
- Current modules: {tags}
- Questions fetched: {count}
- Displayed questions: {count}
- Extracted facts so far: {facts}

**YOUR TASK:**
Analyze the user's message and determine:
1. Does this reveal NEW information that changes our configuration?
2. Do we need to fetch questions for NEW Oracle modules/domains?
3. What specific facts can we extract from this message?
4. What follow-up question should we ask?

**AVAILABLE ORACLE DOMAINS:**
{domains}

**IMPORTANT:** We ALWAYS show ALL questions. Never filter or hide questions.

Return ONLY a JSON object:
{{
    "needs_new_questions": true/false,
    "new_tags": ["domain1", "domain2"],
    "extracted_info": {{"key": "value"}},
    "suggested_followup": "What should I ask the user next?",
    "reasoning": "Why you made these decisions"
}}

CRITICAL: Return ONLY the JSON, no markdown, no explanations."#,
            company = self.profile.company,
            industry = self.profile.industry,
            tags = self.current_tags.join(", "),
            count = self.questions.len(),
            facts = serde_json::to_string_pretty(&self.facts)?,
            domains = self.context.questions.available_tags().join(", "),
        );

        let prompt = format!(
            "**USER MESSAGE:** {}\n\n**RECENT CONVERSATION:**\n{}\n\n**SAMPLE CURRENT QUESTIONS:**\n{}\n\nAnalyze this message and return the JSON analysis.",
            text,
            self.recent_conversation(RECENT_EXCHANGES),
            self.sample_questions(SAMPLE_QUESTIONS)
        );

        let request = CompletionRequest::new(prompt)
            .with_system(system)
            .temperature(0.3)
            .expect_json();

        let analysis = match self.context.llm.complete(request).await {
            Ok(response) => serde_json::from_str::<MessageAnalysis>(strip_code_fences(&response))
                .unwrap_or_else(|e| {
                    tracing::error!("❌ 消息分析结果解析失败: {}", e);
                    MessageAnalysis::fallback()
                }),
            Err(e) => {
                tracing::error!("❌ 消息分析失败: {:#}", e);
                MessageAnalysis::fallback()
            }
        };
        tracing::info!("📊 分析结果: {}", analysis.reasoning);
        Ok(analysis)
    }

    fn recent_conversation(&self, exchanges: usize) -> String {
        let start = self.history.len().saturating_sub(exchanges * 2);
        self.history[start..]
            .iter()
            .map(|message| {
                let role = match message.role {
                    Role::User => "USER",
                    Role::Assistant => "ASSISTANT",
                };
                format!("{}: {}", role, truncate_chars(&message.content, 200))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn sample_questions(&self, count: usize) -> String {
        self.questions
            .iter()
            .take(count)
            .map(|q| {
                let answer = q.answer.as_deref().unwrap_or("N/A");
                format!("- [{}] {}: {}", q.id, q.text, truncate_chars(answer, 100))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn add_questions_for(&mut self, new_tags: &[String]) {
        tracing::info!("🔍 为新标签检索问题: {:?}", new_tags);
        let available = self.context.questions.available_tags();
        let valid = validate_tags(new_tags, &available);

        for tag in &valid {
            if !self.current_tags.contains(tag) {
                self.current_tags.push(tag.clone());
            }
        }

        let fetched = self.context.questions.fetch_by_tags(&valid).await;
        if fetched.is_empty() {
            tracing::warn!("⚠️ 标签 {:?} 没有检索到问题", valid);
            return;
        }

        let filled = prefill(
            self.context.llm.as_ref(),
            fetched,
            &self.consolidated,
            &self.profile,
        )
        .await;
        let added = self.merge_questions(filled);
        tracing::info!("✅ 新增 {} 个问题，共 {} 个", added, self.questions.len());
    }

    /// 合并问题：跳过已有的问题文本，id冲突时追加序号，返回新增数量
    fn merge_questions(&mut self, incoming: Vec<Question>) -> usize {
        let mut texts: HashSet<String> = self.questions.iter().map(|q| q.text.clone()).collect();
        let mut ids: HashSet<String> = self.questions.iter().map(|q| q.id.clone()).collect();

        let mut added = 0;
        for mut question in incoming {
            if !texts.insert(question.text.clone()) {
                continue;
            }
            if ids.contains(&question.id) {
                let base = question.id.clone();
                let mut suffix = 2;
                while ids.contains(&format!("{}_{}", base, suffix)) {
                    suffix += 1;
                }
                question.id = format!("{}_{}", base, suffix);
            }
            ids.insert(question.id.clone());
            self.questions.push(question);
            added += 1;
        }
        added
    }

    /// 根据新事实批量更新至多10个未回答的问题
    async fn update_answers(&mut self, info: &Map<String, Value>) -> Result<()> {
        let open: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| q.has_open_answer())
            .take(MAX_ANSWER_UPDATES)
            .collect();
        if open.is_empty() {
            tracing::info!("   ℹ️ 没有需要更新的问题");
            return Ok(());
        }

        let system = format!(
            r#"You are updating Oracle ERP configuration answers based on new user information.

**NEW INFORMATION FROM USER:**
{info}

**YOUR TASK:**
For each question below, if the new information is relevant, provide an updated answer.
If not relevant, return null.

Return ONLY a JSON array:
[
    {{"question_id": "id1", "new_answer": "answer" or null}},
    {{"question_id": "id2", "new_answer": "answer" or null}}
]

CRITICAL: Return ONLY the JSON array, no markdown, no explanations."#,
            info = serde_json::to_string_pretty(info)?,
        );

        let prompt = format!(
            "**QUESTIONS TO UPDATE:**\n\n{}",
            open.iter()
                .map(|q| format!(
                    "ID: {}\nQuestion: {}\nCurrent: {}",
                    q.id,
                    q.text,
                    q.answer.as_deref().unwrap_or("N/A")
                ))
                .collect::<Vec<_>>()
                .join("\n\n")
        );
        let candidates: HashSet<String> = open.iter().map(|q| q.id.clone()).collect();

        let request = CompletionRequest::new(prompt)
            .with_system(system)
            .temperature(0.2)
            .expect_json();

        let updates = match self.context.llm.complete(request).await {
            Ok(response) => match parse_array_response(&response) {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::error!("❌ 批量更新结果解析失败: {}", e);
                    return Ok(());
                }
            },
            Err(e) => {
                tracing::error!("❌ 批量更新答案失败: {:#}", e);
                return Ok(());
            }
        };

        let mut updated = 0;
        for update in &updates {
            let Some(id) = update.get("question_id").map(value_to_text) else {
                continue;
            };
            let answer = update.get("new_answer").map(value_to_text).unwrap_or_default();
            if answer.trim().is_empty() || !candidates.contains(&id) {
                continue;
            }
            if let Some(question) = self.questions.iter_mut().find(|q| q.id == id) {
                tracing::info!("   ✅ 已更新: {}...", truncate_chars(&question.text, 50));
                question.answer = Some(answer);
                question.updated_from_conversation = true;
                updated += 1;
            }
        }
        tracing::info!("   ✅ 批量更新了 {} 个答案", updated);
        Ok(())
    }

    async fn reply(&self, analysis: &MessageAnalysis, text: &str) -> Result<String> {
        let system = format!(
            r#"You are a friendly Oracle ERP configuration assistant helping {company}.

**CONTEXT:**
- Current modules: {tags}
- Questions displayed: {count}
- Recent analysis: {reasoning}

**YOUR PERSONALITY:**
- Conversational and helpful
- Explain WHY things matter
- Reference specific questions when relevant
- Ask clarifying questions
- Be concise but informative

**WHAT HAPPENED:**
{analysis}

Generate a natural, conversational response that:
1. Acknowledges what the user said
2. Explains what you did (fetched new questions, updated answers, etc.)
3. Asks a relevant follow-up question
4. Is under 150 words

Return ONLY the response text, no JSON, no formatting."#,
            company = self.profile.company,
            tags = self.current_tags.join(", "),
            count = self.questions.len(),
            reasoning = analysis.reasoning,
            analysis = serde_json::to_string_pretty(analysis)?,
        );

        let request = CompletionRequest::new(format!(
            "User said: \"{}\"\n\nGenerate your response:",
            text
        ))
        .with_system(system)
        .temperature(0.7);

        let fallback = || {
            let followup = if analysis.suggested_followup.trim().is_empty() {
                "What else would you like to configure?"
            } else {
                analysis.suggested_followup.as_str()
            };
            format!(
                "I understand. I've updated the configuration based on your input. {}",
                followup
            )
        };

        Ok(match self.context.llm.complete(request).await {
            Ok(response) if !response.trim().is_empty() => response.trim().to_string(),
            Ok(_) => fallback(),
            Err(e) => {
                tracing::error!("❌ 生成回复失败: {:#}", e);
                fallback()
            }
        })
    }

    fn touch(&mut self) {
        self.last_update = Some(Utc::now());
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    pub fn profile(&self) -> &CompanyProfile {
        &self.profile
    }

    pub fn consolidated(&self) -> &ConsolidatedProfile {
        &self.consolidated
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_tags(&self) -> &[String] {
        &self.current_tags
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn facts(&self) -> &Map<String, Value> {
        &self.facts
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn categories(&self) -> Vec<Category<'_>> {
        categorize(&self.questions)
    }

    /// 指定分类下的问题；`All` 返回全部问题
    pub fn questions_in(&self, category: &str) -> Vec<&Question> {
        if category.eq_ignore_ascii_case("all") {
            return self.questions.iter().collect();
        }
        self.questions
            .iter()
            .filter(|q| q.category() == category)
            .collect()
    }

    pub fn status_summary(&self) -> AgentStatus {
        let prerequisite_progress = (self.phase == AgentPhase::Prerequisites)
            .then(|| self.prerequisites.progress());
        AgentStatus {
            phase: self.phase,
            company: self.profile.company.clone(),
            industry: self.profile.industry.clone(),
            tags: self.current_tags.clone(),
            total_questions: self.questions.len(),
            answered: self.questions.iter().filter(|q| !q.has_open_answer()).count(),
            categories: self.categories().len(),
            facts: self.facts.len(),
            prerequisite_progress,
            last_update: self.last_update,
        }
    }

    /// 导出问卷
    pub async fn export(&self) -> Result<PathBuf> {
        filler::export(&self.context.workspace, &self.questions).await
    }

    /// 保存对话记录
    pub async fn save_transcript(&self) -> Result<PathBuf> {
        let path = self.context.workspace.transcript_path(&self.session_id);
        let transcript = Transcript {
            session_id: &self.session_id,
            company: &self.profile,
            phase: self.phase,
            current_tags: &self.current_tags,
            extracted_facts: &self.facts,
            conversation_history: &self.history,
            last_update: self.last_update,
        };
        self.context.workspace.write_json(&path, &transcript).await?;
        tracing::info!("💾 对话记录已保存: {}", path.display());
        Ok(path)
    }
}
