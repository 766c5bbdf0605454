use crate::generator::research::phase::{FieldDefaults, PhaseExtractor, contains_any};
use crate::types::profile::CompanyProfile;

/// Phase 9：实施规划
#[derive(Default, Clone)]
pub struct ImplementationPlanning;

impl PhaseExtractor for ImplementationPlanning {
    fn number(&self) -> u8 {
        9
    }

    fn name(&self) -> &'static str {
        "Implementation Planning"
    }

    fn template_stem(&self) -> &'static str {
        "implementation-planning"
    }

    fn builtin_template(&self) -> &'static str {
        include_str!("../../../../phases_data/phase9-implementation-planning.json")
    }

    fn focus(&self, profile: &CompanyProfile) -> String {
        format!(
            r#"
**PHASE 9 FOCUS**: Plan the Oracle Fusion ERP implementation approach, governance, change management, risks and success metrics.

**KEY EXTRACTION PRIORITIES**:
1. **Methodology**: Agile, waterfall or hybrid delivery approach
2. **Rollout Strategy**: Phased, pilot or big bang deployment and timeline
3. **Project Governance**: Sponsors, steering committee and PMO structure
4. **Change Management**: Organizational readiness, change impact and training
5. **Risk Management**: Scope, data migration, resource and integration risks
6. **Business Case**: ROI targets, payback period and expected benefits
7. **Success Metrics**: KPIs, targets and measurement methods

**INDUSTRY CONTEXT**: {industry} implementation patterns and constraints
**ORGANIZATIONAL CONTEXT**: {company} in {country}

This data will configure:
- Implementation roadmap and milestones
- Project governance model
- Change management and training plan
- Risk register and success criteria
"#,
            industry = profile.industry,
            company = profile.company,
            country = profile.country,
        )
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "methodologyFramework",
            "rolloutStrategy",
            "organizationalReadiness",
            "changeImpactLevel",
            "implementationOverallComplexity",
        ]
    }

    fn apply_defaults(&self, fields: &mut FieldDefaults<'_>, profile: &CompanyProfile) {
        let industry = profile.industry.to_lowercase();
        let enterprise = industry.contains("enterprise");

        let methodology = if contains_any(&industry, &["technology", "startup", "agile"]) {
            "AGILE"
        } else if contains_any(&industry, &["manufacturing", "financial", "regulated"]) {
            "WATERFALL"
        } else {
            "HYBRID"
        };
        fields.fill("methodologyFramework", methodology);

        let rollout = if contains_any(&industry, &["large", "enterprise", "complex"]) {
            "PHASED"
        } else if contains_any(&industry, &["startup", "small", "simple"]) {
            "BIG_BANG"
        } else {
            "PILOT"
        };
        fields.fill("rolloutStrategy", rollout);

        let deployment = if contains_any(&industry, &["technology", "saas", "cloud"]) {
            "CLOUD_FIRST"
        } else {
            "HYBRID"
        };
        fields.fill("deploymentModel", deployment);

        let duration = if fields.is("rolloutStrategy", "PHASED") {
            if enterprise { "18" } else { "12" }
        } else if fields.is("rolloutStrategy", "BIG_BANG") {
            "8"
        } else {
            "10"
        };
        fields.fill("estimatedImplementationDuration", duration);

        fields.fill_group(
            "goLiveStrategy",
            &[
                ("goLiveStrategy", "PARALLEL_RUN_CUTOVER"),
                ("cutoverDuration", "WEEKEND"),
                ("rollbackPlanRequired", "true"),
            ],
        );
        fields.fill_group(
            "projectSponsor",
            &[
                ("projectSponsor", "Chief Financial Officer"),
                ("businessSponsor", "VP Finance"),
                ("itSponsor", "CTO"),
            ],
        );

        let meeting = if fields.is("methodologyFramework", "AGILE") {
            "BIWEEKLY"
        } else {
            "MONTHLY"
        };
        fields.fill("steeringCommitteeMeetingFrequency", meeting);
        fields.fill("steeringCommitteeMeetingDuration", "2");
        fields.fill("pmoStructure", if enterprise { "CENTRALIZED" } else { "HYBRID" });

        fields.fill_group(
            "projectMethodologyCompliance",
            &[
                ("projectMethodologyCompliance", "STRICT"),
                ("resourceCoordination", "CENTRALIZED"),
                ("riskAndIssueManagement", "FORMAL_PROCESS"),
            ],
        );
        fields.fill_group(
            "projectTeamStructure",
            &[
                ("projectTeamStructure", "DEDICATED_TEAM"),
                ("coreTeamSize", if enterprise { "12" } else { "8" }),
                ("extendedTeamSize", if enterprise { "25" } else { "15" }),
            ],
        );

        let readiness = if contains_any(&industry, &["technology", "startup", "innovation"]) {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("organizationalReadiness", readiness);
        let organizational_readiness = fields.text("organizationalReadiness");
        fields.fill("changeReadiness", organizational_readiness.clone());

        let impact = if fields.is("rolloutStrategy", "BIG_BANG") {
            "TRANSFORMATIONAL"
        } else if fields.is("rolloutStrategy", "PHASED") {
            "SIGNIFICANT"
        } else {
            "MODERATE"
        };
        fields.fill("changeImpactLevel", impact);

        let buy_in = if organizational_readiness == "HIGH" {
            "STRONG"
        } else {
            "MODERATE"
        };
        fields.fill("stakeholderBuyIn", buy_in);

        fields.fill_group(
            "changeChampionsProgram",
            &[
                ("changeChampionsProgram", "PLANNED"),
                ("communicationPlanRequired", "true"),
                ("trainingProgramRequired", "true"),
            ],
        );
        fields.fill_group(
            "trainingApproach",
            &[
                ("trainingApproach", "BLENDED_LEARNING"),
                ("trainingDuration", "40_HOURS_PER_USER"),
                ("superUserTrainingRequired", "true"),
            ],
        );

        fields.fill_group(
            "scopeCreepRiskId",
            &[
                ("scopeCreepRiskId", "RISK_001"),
                ("scopeCreepCategory", "SCOPE"),
                (
                    "scopeCreepRiskDescription",
                    "Scope creep and requirements changes during implementation",
                ),
                ("scopeCreepProbability", "HIGH"),
                ("scopeCreepImpact", "HIGH"),
                (
                    "scopeCreepMitigation",
                    "Formal change control process with approval gates",
                ),
                ("scopeCreepOwner", "Project Sponsor"),
            ],
        );

        let data_quality_risk = if industry.contains("legacy") { "HIGH" } else { "MEDIUM" };
        fields.fill_group(
            "dataMigrationRisk",
            &[
                ("dataMigrationRisk", "MEDIUM"),
                (
                    "dataMigrationMitigation",
                    "Phased migration with validation checkpoints",
                ),
                ("dataQualityRisk", data_quality_risk),
            ],
        );
        fields.fill_group(
            "resourceAvailabilityRisk",
            &[
                ("resourceAvailabilityRisk", "MEDIUM"),
                ("keyPersonDependencyRisk", "HIGH"),
                ("skillGapRisk", "MEDIUM"),
            ],
        );

        let integration_risk = if contains_any(&industry, &["complex", "manufacturing", "financial"]) {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("integrationRisk", integration_risk);

        let high_risks = ["scopeCreepProbability", "integrationRisk", "dataMigrationRisk"]
            .iter()
            .filter(|key| fields.is(key, "HIGH"))
            .count();
        let risk_level = match high_risks {
            n if n >= 2 => "HIGH",
            1 => "MEDIUM",
            _ => "LOW",
        };
        fields.fill("implementationRiskLevel", risk_level);

        fields.fill_group(
            "roiYear1Target",
            &[
                ("roiYear1Target", "15"),
                ("roiYear2Target", "25"),
                ("roiYear3Target", "35"),
            ],
        );
        fields.fill(
            "paybackPeriod",
            if industry.contains("technology") { "18" } else { "24" },
        );

        fields.fill_group(
            "operationalCostSavingsBenefit",
            &[
                (
                    "operationalCostSavingsBenefit",
                    "Process automation and efficiency gains",
                ),
                ("costReductionTargetValue", "15"),
                (
                    "costReductionMeasurementMethod",
                    "Before vs after process time comparison",
                ),
                ("costReductionRealizationTimeframe", "12_MONTHS"),
            ],
        );
        fields.fill_group(
            "improvedCashFlowBenefit",
            &[
                (
                    "improvedCashFlowBenefit",
                    "Faster invoice processing and collections",
                ),
                ("cashFlowTargetValue", "5"),
                (
                    "cashFlowMeasurementMethod",
                    "Days Sales Outstanding calculation",
                ),
            ],
        );
        fields.fill_group(
            "systemUptimeKPI",
            &[
                ("systemUptimeKPI", "System availability percentage"),
                ("systemUptimeTargetValue", "99.5"),
                (
                    "systemUptimeMeasurementMethod",
                    "Automated monitoring dashboard",
                ),
                (
                    "systemUptimeReportingFrequency",
                    "Real-time with monthly reports",
                ),
            ],
        );
        fields.fill_group(
            "userSatisfactionKPI",
            &[
                ("userSatisfactionKPI", "User satisfaction score"),
                ("userSatisfactionTargetValue", "4.0"),
                ("userSatisfactionMeasurementMethod", "Quarterly user survey"),
            ],
        );

        let mut score = if contains_any(
            &industry,
            &["financial", "healthcare", "manufacturing", "regulated"],
        ) {
            2
        } else {
            1
        };
        score += if fields.is("rolloutStrategy", "PHASED") {
            2
        } else if fields.is("rolloutStrategy", "BIG_BANG") {
            3
        } else {
            1
        };
        score += if fields.is("changeImpactLevel", "TRANSFORMATIONAL") {
            3
        } else if fields.is("changeImpactLevel", "SIGNIFICANT") {
            2
        } else {
            1
        };
        let overall = match score {
            s if s >= 6 => "HIGH",
            s if s >= 4 => "MEDIUM",
            _ => "LOW",
        };
        fields.fill("implementationOverallComplexity", overall);

        let organizational_complexity = if fields.is("changeImpactLevel", "TRANSFORMATIONAL") {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("implementationOrganizationalComplexity", organizational_complexity);

        let technical_complexity = if fields.is("integrationRisk", "HIGH") {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("implementationTechnicalComplexity", technical_complexity);

        let ready = fields.is("organizationalReadiness", "HIGH") || fields.is("changeReadiness", "HIGH");
        fields.fill(
            "implementationOrganizationalReadiness",
            if ready { "HIGH" } else { "MEDIUM" },
        );
        fields.fill("implementationTechnicalReadiness", "MEDIUM");
        let change_readiness = fields.text("changeReadiness");
        fields.fill("implementationChangeReadiness", change_readiness);

        let likelihood = if fields.is("implementationOverallComplexity", "HIGH") {
            "MEDIUM"
        } else {
            "HIGH"
        };
        fields.fill("successLikelihood", likelihood);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn apply(data: Value, industry: &str) -> Map<String, Value> {
        let mut map = data.as_object().cloned().unwrap();
        let profile = CompanyProfile::new("Acme", industry, "United States");
        ImplementationPlanning.apply_defaults(&mut FieldDefaults::new(&mut map), &profile);
        map
    }

    #[test]
    fn test_enterprise_manufacturing_plan() {
        let data = apply(json!({}), "Enterprise Manufacturing");

        assert_eq!(data["methodologyFramework"], json!("WATERFALL"));
        assert_eq!(data["rolloutStrategy"], json!("PHASED"));
        assert_eq!(data["estimatedImplementationDuration"], json!("18"));
        assert_eq!(data["changeImpactLevel"], json!("SIGNIFICANT"));
        assert_eq!(data["coreTeamSize"], json!("12"));
        assert_eq!(data["integrationRisk"], json!("HIGH"));
        assert_eq!(data["implementationRiskLevel"], json!("HIGH"));
        // 2 + 2 + 2
        assert_eq!(data["implementationOverallComplexity"], json!("HIGH"));
        assert_eq!(data["successLikelihood"], json!("MEDIUM"));
    }

    #[test]
    fn test_technology_startup_plan() {
        let data = apply(json!({}), "Technology Startup");

        assert_eq!(data["methodologyFramework"], json!("AGILE"));
        assert_eq!(data["rolloutStrategy"], json!("BIG_BANG"));
        assert_eq!(data["estimatedImplementationDuration"], json!("8"));
        assert_eq!(data["steeringCommitteeMeetingFrequency"], json!("BIWEEKLY"));
        assert_eq!(data["organizationalReadiness"], json!("HIGH"));
        assert_eq!(data["changeReadiness"], json!("HIGH"));
        assert_eq!(data["stakeholderBuyIn"], json!("STRONG"));
        assert_eq!(data["changeImpactLevel"], json!("TRANSFORMATIONAL"));
        assert_eq!(data["paybackPeriod"], json!("18"));
        assert_eq!(data["implementationRiskLevel"], json!("MEDIUM"));
        assert_eq!(data["implementationChangeReadiness"], json!("HIGH"));
    }
}
