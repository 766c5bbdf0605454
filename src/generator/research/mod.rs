//! 公司调研：九个phase的联网搜索、字段抽取与合并

use anyhow::Result;

use crate::generator::context::GeneratorContext;
use crate::generator::research::orchestrator::ResearchOrchestrator;
use crate::types::profile::{CompanyProfile, ConsolidatedProfile};

pub mod consolidate;
pub mod orchestrator;
pub mod phase;
pub mod phases;
pub mod search;

/// 加载或生成公司的合并档案
pub async fn load_or_generate(
    context: &GeneratorContext,
    profile: &CompanyProfile,
) -> Result<ConsolidatedProfile> {
    ResearchOrchestrator::default()
        .load_or_generate(context, profile)
        .await
}

#[cfg(test)]
mod tests;
