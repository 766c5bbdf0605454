use crate::generator::research::phase::{FieldDefaults, PhaseExtractor, contains_any, is_us};
use crate::types::profile::CompanyProfile;

/// Phase 2：行业调研
#[derive(Default, Clone)]
pub struct IndustryResearch;

fn corporate_tax_rate(country_upper: &str) -> &'static str {
    match country_upper {
        "US" | "USA" | "UNITED STATES" => "21",
        "UK" => "25",
        "CANADA" => "26.5",
        "GERMANY" => "30",
        "FRANCE" => "25",
        _ => "25",
    }
}

impl PhaseExtractor for IndustryResearch {
    fn number(&self) -> u8 {
        2
    }

    fn name(&self) -> &'static str {
        "Industry-Specific Research"
    }

    fn template_stem(&self) -> &'static str {
        "industry-research"
    }

    fn builtin_template(&self) -> &'static str {
        include_str!("../../../../phases_data/phase2-industry-research.json")
    }

    fn focus(&self, profile: &CompanyProfile) -> String {
        format!(
            r#"
**PHASE 2 FOCUS**: Extract industry-specific regulatory, accounting, and operational requirements to configure Oracle Fusion ERP for compliance and best practices.

**KEY EXTRACTION PRIORITIES**:
1. **Regulatory Framework**: Federal, state, and international regulations affecting {industry}
2. **Compliance Requirements**: SOX, environmental, safety, data privacy requirements
3. **Accounting Standards**: GAAP vs IFRS, industry-specific revenue recognition
4. **Tax Implications**: Corporate, state, local, and international tax considerations
5. **Industry Patterns**: Common enterprise structures, chart of accounts patterns
6. **Operational Standards**: Industry-specific processes, KPIs, and integrations
7. **Technology Context**: Common systems, data standards, integration requirements

**INDUSTRY FOCUS**: {industry}
**REGULATORY JURISDICTION**: {country}

This data will configure:
- Regulatory reporting requirements in Oracle
- Industry-specific chart of accounts structure
- Compliance workflows and controls
- Tax calculation and reporting rules
- Industry standard business processes
"#,
            industry = profile.industry,
            country = profile.country,
        )
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "primaryIndustry",
            "naicsCode",
            "primaryAccountingStandard",
            "corporateTaxRate",
            "soxCompliance",
        ]
    }

    fn apply_defaults(&self, fields: &mut FieldDefaults<'_>, profile: &CompanyProfile) {
        let country = profile.country.to_uppercase();

        fields.fill(
            "primaryAccountingStandard",
            if is_us(&country) { "GAAP" } else { "IFRS" },
        );
        fields.fill("corporateTaxRate", corporate_tax_rate(&country));
        fields.fill("soxCompliance", "REQUIRED");
        fields.fill("revenueRecognitionMethod", "ASC_606");

        let industry = fields.text("primaryIndustry").to_lowercase();

        let valuation = if contains_any(&industry, &["oil", "commodity"])
            && !contains_any(&industry, &["retail", "manufacturing"])
        {
            "WEIGHTED_AVERAGE"
        } else {
            "FIFO"
        };
        fields.fill("inventoryValuationMethod", valuation);

        let structure = if contains_any(
            &industry,
            &["financial", "pharmaceutical", "energy", "aerospace"],
        ) {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("enterpriseStructureComplexity", structure);

        let reporting = if contains_any(
            &industry,
            &["financial", "pharmaceutical", "healthcare", "energy"],
        ) {
            "EXTENSIVE"
        } else {
            "MODERATE"
        };
        fields.fill("regulatoryReportingRequirements", reporting);
    }
}
