//! 九个调研phase的抽取器

use crate::generator::research::phase::PhaseExtractor;
use crate::types::error::CopilotError;

pub mod phase1;
pub mod phase2;
pub mod phase3;
pub mod phase4;
pub mod phase5;
pub mod phase6;
pub mod phase7;
pub mod phase8;
pub mod phase9;

use phase1::CompanyDiscovery;
use phase2::IndustryResearch;
use phase3::EnterpriseStructure;
use phase4::ChartOfAccounts;
use phase5::CurrencyLocalization;
use phase6::ProcessWorkflow;
use phase7::RiskCompliance;
use phase8::IntegrationTechnology;
use phase9::ImplementationPlanning;

/// phase编号到合并档案section的映射
const SECTIONS: [&str; 9] = [
    "companyProfile",
    "industryAnalysis",
    "enterpriseStructure",
    "chartOfAccounts",
    "currencyLocalization",
    "processWorkflow",
    "riskCompliance",
    "integrationTechnology",
    "implementationPlanning",
];

/// 按编号顺序返回全部phase
pub fn all_phases() -> Vec<Box<dyn PhaseExtractor>> {
    vec![
        Box::new(CompanyDiscovery),
        Box::new(IndustryResearch),
        Box::new(EnterpriseStructure),
        Box::new(ChartOfAccounts),
        Box::new(CurrencyLocalization),
        Box::new(ProcessWorkflow),
        Box::new(RiskCompliance),
        Box::new(IntegrationTechnology),
        Box::new(ImplementationPlanning),
    ]
}

/// phase在合并档案中的section名
pub fn section_for(phase: u8) -> Result<&'static str, CopilotError> {
    match phase {
        1..=9 => Ok(SECTIONS[usize::from(phase) - 1]),
        other => Err(CopilotError::UnknownPhase(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_are_numbered_in_order() {
        let numbers: Vec<u8> = all_phases().iter().map(|p| p.number()).collect();
        assert_eq!(numbers, (1..=9).collect::<Vec<u8>>());
    }

    #[test]
    fn test_builtin_templates_are_valid_json() {
        for phase in all_phases() {
            let parsed: serde_json::Value = serde_json::from_str(phase.builtin_template())
                .unwrap_or_else(|e| panic!("phase {} template: {}", phase.number(), e));
            assert!(parsed.is_object(), "phase {}", phase.number());
        }
    }

    #[test]
    fn test_section_for() {
        assert_eq!(section_for(1).unwrap(), "companyProfile");
        assert_eq!(section_for(5).unwrap(), "currencyLocalization");
        assert_eq!(section_for(9).unwrap(), "implementationPlanning");
        assert!(matches!(section_for(0), Err(CopilotError::UnknownPhase(0))));
        assert!(matches!(section_for(10), Err(CopilotError::UnknownPhase(10))));
    }
}
