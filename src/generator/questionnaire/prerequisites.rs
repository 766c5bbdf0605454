//! 前置问题访谈：正式配置前确认Oracle Fusion HCM的基础设置

use serde::{Deserialize, Serialize};

use crate::llm::client::{CompletionRequest, LanguageModel};

/// 一个前置问题
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PrerequisiteQuestion {
    pub id: &'static str,
    pub question: &'static str,
    pub category: &'static str,
    pub required: bool,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub hint: &'static str,
    pub oracle_objects: &'static [&'static str],
}

/// HR/Payroll实施的九个前置问题，按分类顺序排列
pub static HR_PAYROLL_PREREQUISITES: [PrerequisiteQuestion; 9] = [
    PrerequisiteQuestion {
        id: "prereq_es_001",
        question: "Have you already completed your Enterprise Structure setup in Oracle Fusion? Specifically, do you have your Legal Entities, Business Units, and Legal Employers defined?",
        category: "Enterprise Structure",
        required: true,
        kind: "text",
        hint: "We need to know if you have the foundational structures in place or if we need to configure them as part of this implementation",
        oracle_objects: &["Legal Entity", "Business Unit", "Legal Employer"],
    },
    PrerequisiteQuestion {
        id: "prereq_es_002",
        question: "What is your Organization Hierarchy structure? Do you have your Department Tree, Cost Center Hierarchy, and Reporting Organizations defined?",
        category: "Enterprise Structure",
        required: true,
        kind: "text",
        hint: "This determines how employees are organized and how financials roll up",
        oracle_objects: &[
            "Organization Hierarchy",
            "Department Tree",
            "Cost Center",
            "Reporting Organization",
        ],
    },
    PrerequisiteQuestion {
        id: "prereq_cal_001",
        question: "Have you set up your Payroll Calendars and HR Processing Calendars? What are your pay frequencies - Weekly, Bi-weekly, Semi-monthly, or Monthly?",
        category: "Calendars & Time",
        required: true,
        kind: "text",
        hint: "Each pay frequency needs its own Payroll Calendar with defined Pay Periods",
        oracle_objects: &[
            "Payroll Calendar",
            "HR Processing Calendar",
            "Pay Period",
            "Processing Cycle",
        ],
    },
    PrerequisiteQuestion {
        id: "prereq_cal_002",
        question: "What Work Schedules do you need configured? Do you use standard 8-hour days, Shift Patterns, or Flexible Work Schedules?",
        category: "Calendars & Time",
        required: true,
        kind: "text",
        hint: "This affects time tracking, absence management, and overtime calculations",
        oracle_objects: &["Work Schedule", "Shift Pattern", "Time Entry", "Standard Hours"],
    },
    PrerequisiteQuestion {
        id: "prereq_ws_001",
        question: "How is your Job Catalog structured? Do you have Job Families, Jobs, and Positions defined, or are you using a position-less HR model?",
        category: "Workforce Structures",
        required: true,
        kind: "text",
        hint: "This is fundamental to how you organize and manage your workforce in Oracle HCM",
        oracle_objects: &["Job Catalog", "Job Family", "Job", "Position", "Position Hierarchy"],
    },
    PrerequisiteQuestion {
        id: "prereq_ws_002",
        question: "What Grade Ladders and Salary Ranges do you need? Do you have defined Grade Structures with salary steps, or market-based pay ranges?",
        category: "Workforce Structures",
        required: true,
        kind: "text",
        hint: "This drives compensation decisions and pay progression in your system",
        oracle_objects: &[
            "Grade Ladder",
            "Grade",
            "Salary Range",
            "Pay Scale",
            "Compensation Structure",
        ],
    },
    PrerequisiteQuestion {
        id: "prereq_pay_001",
        question: "What Payroll Elements do you need configured? Specifically, what are your standard Earnings (Salary, Hourly, Overtime), Deductions (401k, Health Insurance), and Tax Withholdings?",
        category: "Payroll Configuration",
        required: true,
        kind: "text",
        hint: "Each element needs to be set up with calculation rules and costing allocations",
        oracle_objects: &[
            "Element",
            "Earnings Element",
            "Deduction Element",
            "Tax Element",
            "Element Eligibility",
        ],
    },
    PrerequisiteQuestion {
        id: "prereq_pay_002",
        question: "Do you have complex Payroll Rules? For example, union differentials, shift premiums, tax overrides, or special calculation formulas?",
        category: "Payroll Configuration",
        required: true,
        kind: "text",
        hint: "These require Formula setup and may need custom Fast Formulas",
        oracle_objects: &[
            "Fast Formula",
            "Element Input Values",
            "Calculation Rule",
            "Balance Feeds",
        ],
    },
    PrerequisiteQuestion {
        id: "prereq_sec_001",
        question: "What Data Security Policies do you need? Do managers need access only to their direct reports, or do you have more complex security requirements?",
        category: "Security & Access",
        required: true,
        kind: "text",
        hint: "This controls who can see and edit employee data in Oracle HCM",
        oracle_objects: &[
            "Data Security Policy",
            "HCM Group",
            "Security Profile",
            "Role-Based Access",
        ],
    },
];

/// 触发前置访谈的标签
const HR_PAYROLL_TAGS: [&str; 8] = [
    "core hr",
    "payroll",
    "human capital management",
    "hcm",
    "workforce",
    "compensation",
    "benefits",
    "time and labor",
];

const FOLLOWUP_SYSTEM_PROMPT: &str = r#"You are an experienced Oracle Fusion consultant conducting a discovery interview.

**YOUR TASK:**
1. Briefly acknowledge the user's answer (1 sentence)
2. If category changed, mention we're moving to a new area with Oracle components
3. Ask the next question with specific Oracle Fusion terminology
4. Include the specific Oracle objects/components in the question

Keep it conversational, professional, and under 100 words.
Demonstrate expertise by using proper Oracle terminology.

Return ONLY the response text, no JSON, no markdown."#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InterviewState {
    #[default]
    NotStarted,
    Asking,
    Completed,
}

/// 一条已回答的前置问题
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrerequisiteAnswer {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
}

/// 处理一次回答后的结果
#[derive(Debug, Clone, PartialEq)]
pub struct PrerequisiteReply {
    pub response: String,
    pub progress: String,
    pub is_complete: bool,
    /// 下一个问题所属分类
    pub category: Option<String>,
}

/// 访谈汇总
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PrerequisiteSummary {
    pub total_questions: usize,
    pub answered: usize,
    pub answers: Vec<PrerequisiteAnswer>,
    pub is_complete: bool,
}

/// 前置问题访谈管理器
#[derive(Debug, Default)]
pub struct PrerequisiteManager {
    state: InterviewState,
    questions: Vec<&'static PrerequisiteQuestion>,
    answers: Vec<PrerequisiteAnswer>,
    current_category: Option<&'static str>,
    completed_categories: Vec<&'static str>,
}

impl PrerequisiteManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按意图标签初始化访谈；与HR/Payroll无关时直接完成
    pub fn initialize(&mut self, tags: &[String]) -> String {
        tracing::info!("📋 初始化前置问题，标签: {:?}", tags);

        let applies = tags
            .iter()
            .any(|tag| HR_PAYROLL_TAGS.contains(&tag.to_lowercase().as_str()));
        if !applies {
            tracing::info!("   ℹ️ 非HR/Payroll实施，跳过前置问题");
            self.state = InterviewState::Completed;
            return "Starting configuration directly...".to_string();
        }

        self.questions = HR_PAYROLL_PREREQUISITES.iter().collect();
        self.state = InterviewState::Asking;
        self.current_category = self.questions.first().map(|q| q.category);

        let required = self.questions.iter().filter(|q| q.required).count();
        tracing::info!("   ✅ 共 {} 个前置问题（{} 个必答）", self.questions.len(), required);

        self.initial_message()
    }

    fn initial_message(&self) -> String {
        let Some(first) = self.questions.first() else {
            return "Proceeding with configuration...".to_string();
        };

        let mut categories: Vec<(&str, usize)> = Vec::new();
        for question in &self.questions {
            match categories.iter_mut().find(|(name, _)| *name == question.category) {
                Some((_, count)) => *count += 1,
                None => categories.push((question.category, 1)),
            }
        }
        let category_summary = categories
            .iter()
            .map(|(name, count)| format!("   • **{}**: {} questions", name, count))
            .collect::<Vec<_>>()
            .join("\n");

        let oracle_hint = if first.oracle_objects.is_empty() {
            String::new()
        } else {
            format!(
                "\n\n💡 *We'll be discussing: {}*",
                first.oracle_objects.join(", ")
            )
        };

        format!(
            r#"🎯 **Before we configure your system, I need to understand your Oracle Fusion prerequisites.**

I've prepared **{count} prerequisite questions** that will help me configure your Oracle ERP optimally:

{category_summary}

📋 **How this works:**
- I'll ask specific questions about Oracle Fusion components
- Answer based on what you have already configured
- If something isn't set up yet, just let me know
- Your answers will help me pre-configure the right modules

Let's start with **{category}**!{oracle_hint}

{question}"#,
            count = self.questions.len(),
            category_summary = category_summary,
            category = first.category,
            oracle_hint = oracle_hint,
            question = first.question,
        )
    }

    /// 记录当前问题的回答，并给出下一个问题
    pub async fn process_answer(&mut self, llm: &dyn LanguageModel, text: &str) -> PrerequisiteReply {
        let total = self.questions.len();
        if self.state != InterviewState::Asking {
            return PrerequisiteReply {
                response: "Prerequisites already completed!".to_string(),
                progress: format!("{}/{}", self.answers.len(), total),
                is_complete: true,
                category: None,
            };
        }

        let answered = self.answers.len();
        let Some(current) = self.questions.get(answered).copied() else {
            self.state = InterviewState::Completed;
            return self.completion_reply();
        };

        self.answers.push(PrerequisiteAnswer {
            id: current.id.to_string(),
            question: current.question.to_string(),
            answer: text.to_string(),
            category: current.category.to_string(),
        });

        let Some(next) = self.questions.get(answered + 1).copied() else {
            if !self.completed_categories.contains(&current.category) {
                self.completed_categories.push(current.category);
            }
            self.state = InterviewState::Completed;
            return self.completion_reply();
        };

        let category_changed = next.category != current.category;
        if category_changed {
            self.completed_categories.push(current.category);
            self.current_category = Some(next.category);
        }

        let response = self
            .followup(llm, current, next, text, category_changed)
            .await;

        PrerequisiteReply {
            response,
            progress: format!("{}/{}", answered + 1, total),
            is_complete: false,
            category: Some(next.category.to_string()),
        }
    }

    async fn followup(
        &self,
        llm: &dyn LanguageModel,
        current: &PrerequisiteQuestion,
        next: &PrerequisiteQuestion,
        answer: &str,
        category_changed: bool,
    ) -> String {
        let oracle_context = if next.oracle_objects.is_empty() {
            String::new()
        } else {
            format!("\nOracle Components: {}", next.oracle_objects.join(", "))
        };

        let prompt = format!(
            "**USER JUST ANSWERED:**\nQ: {}\nA: {}\n\n**NEXT QUESTION:**\nCategory: {}\nQ: {}{}\n\nCategory changed: {}\n\nProgress: {}/{}\n\nGenerate your response with specific Oracle Fusion terminology:",
            current.question,
            answer,
            next.category,
            next.question,
            oracle_context,
            category_changed,
            self.answers.len() + 1,
            self.questions.len()
        );

        let request = CompletionRequest::new(prompt)
            .with_system(FOLLOWUP_SYSTEM_PROMPT)
            .temperature(0.7);

        match llm.complete(request).await {
            Ok(response) if !response.trim().is_empty() => response.trim().to_string(),
            Ok(_) => fallback_followup(next, category_changed),
            Err(e) => {
                tracing::warn!("⚠️ 生成追问失败，使用模板: {}", e);
                fallback_followup(next, category_changed)
            }
        }
    }

    fn completion_reply(&self) -> PrerequisiteReply {
        PrerequisiteReply {
            response: self.completion_message(),
            progress: format!("{}/{}", self.answers.len(), self.questions.len()),
            is_complete: true,
            category: None,
        }
    }

    fn completion_message(&self) -> String {
        let mut categories: Vec<&str> = Vec::new();
        for answer in &self.answers {
            if !categories.contains(&answer.category.as_str()) {
                categories.push(&answer.category);
            }
        }

        format!(
            r#"✅ **Excellent! All prerequisite questions completed.**

📊 **Summary:**
- Answered {answered} questions
- Covered {categories} categories

🚀 **Now I'll use this information to:**
1. Generate your company's baseline configuration
2. Fetch relevant Oracle ERP questions
3. Pre-fill answers based on what you've told me

This will take about 2-3 minutes. Please wait...

⏳ Starting configuration analysis..."#,
            answered = self.answers.len(),
            categories = categories.len(),
        )
    }

    pub fn answers_summary(&self) -> PrerequisiteSummary {
        PrerequisiteSummary {
            total_questions: self.questions.len(),
            answered: self.answers.len(),
            answers: self.answers.clone(),
            is_complete: self.is_complete(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == InterviewState::Completed
    }

    /// 已回答数 / 总数
    pub fn progress(&self) -> (usize, usize) {
        (self.answers.len(), self.questions.len())
    }

    /// 当前正在询问的分类
    pub fn current_category(&self) -> Option<&str> {
        self.current_category
    }

    pub fn completed_categories(&self) -> &[&'static str] {
        &self.completed_categories
    }
}

fn fallback_followup(next: &PrerequisiteQuestion, category_changed: bool) -> String {
    if category_changed {
        let oracle_hint = if next.oracle_objects.is_empty() {
            String::new()
        } else {
            format!(" We'll be discussing: {}.", next.oracle_objects.join(", "))
        };
        format!(
            "Got it, thanks! \n\nNow let's move to **{}**.{}\n\n{}",
            next.category, oracle_hint, next.question
        )
    } else {
        format!("Thanks! \n\n{}", next.question)
    }
}
