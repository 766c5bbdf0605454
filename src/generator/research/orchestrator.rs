use anyhow::Result;
use futures::future::join_all;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::generator::context::GeneratorContext;
use crate::generator::research::consolidate::consolidate;
use crate::generator::research::phase::PhaseExtractor;
use crate::generator::research::phases::all_phases;
use crate::types::profile::{CompanyProfile, ConsolidatedProfile};

/// 分批执行九个phase并生成合并档案
pub struct ResearchOrchestrator {
    phases: Vec<Box<dyn PhaseExtractor>>,
}

impl Default for ResearchOrchestrator {
    fn default() -> Self {
        Self {
            phases: all_phases(),
        }
    }
}

impl ResearchOrchestrator {
    pub fn with_phases(phases: Vec<Box<dyn PhaseExtractor>>) -> Self {
        Self { phases }
    }

    /// 已有合并档案时直接加载，否则执行全部phase后合并保存
    pub async fn load_or_generate(
        &self,
        context: &GeneratorContext,
        profile: &CompanyProfile,
    ) -> Result<ConsolidatedProfile> {
        let path = context.workspace.consolidated_path();
        if let Some(existing) = context
            .workspace
            .read_json::<ConsolidatedProfile>(&path)
            .await?
        {
            println!("📂 已加载 {} 的公司档案: {}", profile.company, path.display());
            return Ok(existing);
        }

        println!("🚀 开始为 {} 生成公司档案...", profile.company);
        let outputs = self.run_phases(context, profile).await?;

        let consolidated = consolidate(&outputs);
        context.workspace.write_json(&path, &consolidated).await?;
        println!(
            "✓ 公司档案已生成: {} 个section，保存到 {}",
            consolidated.len(),
            path.display()
        );
        Ok(consolidated)
    }

    /// 按批次并发执行phase，失败的phase记录日志后跳过
    async fn run_phases(
        &self,
        context: &GeneratorContext,
        profile: &CompanyProfile,
    ) -> Result<Vec<(u8, Map<String, Value>)>> {
        let batch_size = context.config.research.batch_size.max(1);
        let delay = Duration::from_millis(context.config.research.batch_delay_ms);
        let batches: Vec<_> = self.phases.chunks(batch_size).collect();
        let batch_count = batches.len();

        let mut outputs = Vec::new();
        for (index, batch) in batches.into_iter().enumerate() {
            let numbers: Vec<u8> = batch.iter().map(|p| p.number()).collect();
            println!("🤖 执行第 {}/{} 批phase: {:?}", index + 1, batch_count, numbers);

            let results = join_all(batch.iter().map(|phase| phase.execute(context, profile))).await;

            for (phase, result) in batch.iter().zip(results) {
                match result {
                    Ok(data) => {
                        context
                            .workspace
                            .write_json(&context.workspace.phase_output_path(phase.number()), &data)
                            .await?;
                        outputs.push((phase.number(), data));
                    }
                    Err(e) => {
                        tracing::error!("❌ Phase {} [{}] 执行失败: {:#}", phase.number(), phase.name(), e);
                        println!("⚠️ Phase {} 失败，已跳过", phase.number());
                    }
                }
            }

            if index + 1 < batch_count {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(outputs)
    }
}
