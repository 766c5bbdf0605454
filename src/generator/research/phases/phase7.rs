use crate::generator::research::phase::{FieldDefaults, PhaseExtractor, contains_any, is_us};
use crate::types::profile::CompanyProfile;

/// Phase 7：风险与合规框架
#[derive(Default, Clone)]
pub struct RiskCompliance;

/// 按行业与国家推导适用的合规框架
fn compliance_frameworks(industry: &str, country_upper: &str) -> Vec<&'static str> {
    let mut frameworks = Vec::new();
    if industry.contains("financial") {
        frameworks.extend(["SOX", "BASEL_III"]);
    }
    if industry.contains("healthcare") {
        frameworks.extend(["HIPAA", "FDA"]);
    }
    if industry.contains("pharmaceutical") {
        frameworks.extend(["GxP", "FDA"]);
    }
    if industry.contains("public") {
        frameworks.push("SOX");
    }
    if is_us(country_upper) {
        frameworks.push("SOX");
    } else if matches!(country_upper, "UK" | "UNITED KINGDOM") {
        frameworks.push("UK_GAAP");
    }

    let mut unique = Vec::new();
    for framework in frameworks {
        if !unique.contains(&framework) {
            unique.push(framework);
        }
    }
    unique
}

fn data_privacy_regulation(country_upper: &str) -> Option<&'static str> {
    if is_us(country_upper) {
        Some("CCPA")
    } else if matches!(country_upper, "UK" | "UNITED KINGDOM") {
        Some("UK_GDPR")
    } else if matches!(country_upper, "EU" | "EUROPE") || country_upper.ends_with("EU") {
        Some("GDPR")
    } else {
        None
    }
}

impl PhaseExtractor for RiskCompliance {
    fn number(&self) -> u8 {
        7
    }

    fn name(&self) -> &'static str {
        "Risk & Compliance Framework"
    }

    fn template_stem(&self) -> &'static str {
        "risk-compliance"
    }

    fn builtin_template(&self) -> &'static str {
        include_str!("../../../../phases_data/phase7-risk-compliance.json")
    }

    fn focus(&self, profile: &CompanyProfile) -> String {
        format!(
            r#"
**PHASE 7 FOCUS**: Define the risk management, compliance, internal control and security framework for Oracle Fusion ERP.

**KEY EXTRACTION PRIORITIES**:
1. **Risk Management**: Framework, assessment frequency and risk tolerance
2. **Regulatory Compliance**: SOX, industry regulations and reporting obligations
3. **Internal Controls**: Key controls, segregation of duties and authorization
4. **Security Framework**: Role based access, encryption and authentication
5. **Audit Requirements**: Audit trail, internal and external audit
6. **Data Governance**: Data privacy, data quality and retention
7. **Monitoring**: Continuous control monitoring and compliance reporting

**INDUSTRY CONTEXT**: {industry} regulatory and risk landscape
**REGULATORY CONTEXT**: {country} compliance and data protection laws

This data will configure:
- Risk management and advanced controls
- Segregation of duties policies
- Security roles and data access
- Audit policies and retention
- Compliance monitoring and reporting
"#,
            industry = profile.industry,
            country = profile.country,
        )
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "riskManagementFramework",
            "complianceFramework",
            "internalControls",
            "segregationOfDutiesRequired",
            "auditTrailRequired",
        ]
    }

    fn apply_defaults(&self, fields: &mut FieldDefaults<'_>, profile: &CompanyProfile) {
        let industry = profile.industry.to_lowercase();
        let country = profile.country.to_uppercase();

        let risk_framework = if contains_any(&industry, &["financial", "banking", "insurance"]) {
            "ENTERPRISE_RISK_MANAGEMENT"
        } else {
            "STANDARD_RISK_MANAGEMENT"
        };
        fields.fill("riskManagementFramework", risk_framework);

        fields.fill_group(
            "riskAssessmentFrequency",
            &[
                ("riskAssessmentFrequency", "QUARTERLY"),
                ("riskMonitoringRequired", "true"),
                ("riskReportingRequired", "true"),
            ],
        );

        let strategic = if industry.contains("enterprise") {
            "ENABLED"
        } else {
            "DISABLED"
        };
        fields.fill_group(
            "operationalRiskManagement",
            &[
                ("operationalRiskManagement", "ENABLED"),
                ("financialRiskManagement", "ENABLED"),
                ("complianceRiskManagement", "ENABLED"),
                ("strategicRiskManagement", strategic),
            ],
        );

        let tolerance = if contains_any(&industry, &["financial", "healthcare", "pharmaceutical"]) {
            "LOW"
        } else if contains_any(&industry, &["technology", "startup"]) {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("riskToleranceLevel", tolerance);

        let frameworks = compliance_frameworks(&industry, &country);
        let framework_text = if frameworks.is_empty() {
            "STANDARD".to_string()
        } else {
            frameworks.join("|")
        };
        fields.fill("complianceFramework", framework_text);

        if fields.text("complianceFramework").contains("SOX") || industry.contains("public") {
            fields.fill_group(
                "soxComplianceRequired",
                &[
                    ("soxComplianceRequired", "true"),
                    ("soxControlTesting", "REQUIRED"),
                    ("soxDocumentation", "REQUIRED"),
                ],
            );
        } else {
            fields.fill("soxComplianceRequired", "false");
        }

        if contains_any(
            &industry,
            &["financial", "healthcare", "pharmaceutical", "public"],
        ) {
            fields.fill_group(
                "regulatoryReportingRequired",
                &[
                    ("regulatoryReportingRequired", "true"),
                    ("regulatoryReportingFrequency", "QUARTERLY"),
                ],
            );
        } else {
            fields.fill("regulatoryReportingRequired", "false");
        }

        fields.fill_group(
            "internalControls",
            &[
                ("internalControls", "ENABLED"),
                ("controlsTestingRequired", "true"),
                ("controlsDocumentationRequired", "true"),
            ],
        );
        fields.fill_group(
            "segregationOfDutiesRequired",
            &[
                ("segregationOfDutiesRequired", "true"),
                ("sodViolationMonitoring", "AUTOMATED"),
                ("sodExceptionApproval", "REQUIRED"),
            ],
        );

        let control_areas = if contains_any(&industry, &["financial", "public"]) {
            "FINANCIAL_REPORTING|REVENUE_RECOGNITION|PROCUREMENT|PAYROLL"
        } else {
            "FINANCIAL_REPORTING|PROCUREMENT|PAYROLL"
        };
        fields.fill("keyControlAreas", control_areas);

        fields.fill_group(
            "authorizationControls",
            &[
                ("authorizationControls", "MULTI_LEVEL"),
                ("authorizationMatrixRequired", "true"),
                ("spendingAuthorityLimits", "ENFORCED"),
            ],
        );

        let security = if contains_any(&industry, &["financial", "healthcare", "government"]) {
            "HIGH_SECURITY"
        } else {
            "STANDARD_SECURITY"
        };
        fields.fill("securityFramework", security);

        let mfa = if fields.text("securityFramework").contains("HIGH_SECURITY") {
            "true"
        } else {
            "false"
        };
        fields.fill_group(
            "roleBasedAccessControl",
            &[
                ("roleBasedAccessControl", "ENABLED"),
                ("minimumPasswordComplexity", "HIGH"),
                ("multiFactorAuthenticationRequired", mfa),
            ],
        );
        fields.fill_group(
            "dataEncryptionRequired",
            &[
                ("dataEncryptionRequired", "true"),
                ("encryptionStandard", "AES_256"),
                ("dataClassificationRequired", "true"),
            ],
        );
        fields.fill_group(
            "securityRoles",
            &[
                (
                    "securityRoles",
                    "SYSTEM_ADMINISTRATOR|FUNCTIONAL_USER|FINANCE_USER|PROCUREMENT_USER|READ_ONLY_USER",
                ),
                ("customRolesAllowed", "true"),
            ],
        );
        fields.fill_group(
            "auditTrailRequired",
            &[
                ("auditTrailRequired", "true"),
                ("auditLogRetentionPeriod", "7_YEARS"),
                ("auditLogIntegrityProtection", "ENABLED"),
            ],
        );

        let (monitoring, exceptions) = if contains_any(&industry, &["financial", "public", "regulated"]) {
            ("ENABLED", "REAL_TIME")
        } else {
            ("BASIC", "DAILY")
        };
        fields.fill_group(
            "continuousMonitoring",
            &[
                ("continuousMonitoring", monitoring),
                ("exceptionMonitoring", exceptions),
            ],
        );

        let external_audit = if industry.contains("public") { "true" } else { "false" };
        fields.fill_group(
            "externalAuditRequired",
            &[
                ("externalAuditRequired", external_audit),
                ("internalAuditRequired", "true"),
                ("auditFrequency", "ANNUAL"),
            ],
        );
        fields.fill_group(
            "complianceReporting",
            &[
                ("complianceReporting", "AUTOMATED"),
                ("complianceDashboard", "ENABLED"),
                ("complianceAlerts", "ENABLED"),
            ],
        );
        fields.fill_group(
            "dataGovernanceFramework",
            &[
                ("dataGovernanceFramework", "ENABLED"),
                ("dataQualityMonitoring", "ENABLED"),
                ("dataLineageTracking", "ENABLED"),
            ],
        );

        let (privacy, personal_data) = match data_privacy_regulation(&country) {
            Some(regulation) => (regulation, "ENABLED"),
            None => ("STANDARD", "STANDARD"),
        };
        fields.fill_group(
            "dataPrivacyProtection",
            &[
                ("dataPrivacyProtection", privacy),
                ("personalDataProtection", personal_data),
            ],
        );

        fields.fill_group(
            "dataRetentionPolicy",
            &[
                ("dataRetentionPolicy", "7_YEARS"),
                ("dataArchivingEnabled", "true"),
                ("dataDeletionProcedures", "AUTOMATED"),
            ],
        );

        let mut score = if contains_any(
            &industry,
            &["financial", "healthcare", "pharmaceutical", "public"],
        ) {
            2
        } else {
            1
        };
        if !is_us(&country) && !matches!(country.as_str(), "UK" | "UNITED KINGDOM" | "CANADA") {
            score += 1;
        }
        if fields.text("complianceFramework").split('|').count() > 2 {
            score += 1;
        }
        let compliance_complexity = match score {
            s if s >= 4 => "HIGH",
            s if s >= 2 => "MEDIUM",
            _ => "LOW",
        };
        fields.fill("complianceComplexity", compliance_complexity);

        let risk_complexity = if fields.is("riskManagementFramework", "ENTERPRISE_RISK_MANAGEMENT") {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("riskManagementComplexity", risk_complexity);

        let security_complexity = if fields.is("securityFramework", "HIGH_SECURITY") {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("securityImplementationComplexity", security_complexity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn apply(data: Value, industry: &str, country: &str) -> Map<String, Value> {
        let mut map = data.as_object().cloned().unwrap();
        let profile = CompanyProfile::new("Acme", industry, country);
        RiskCompliance.apply_defaults(&mut FieldDefaults::new(&mut map), &profile);
        map
    }

    #[test]
    fn test_compliance_frameworks_are_deduplicated() {
        assert_eq!(
            compliance_frameworks("public financial services", "US"),
            vec!["SOX", "BASEL_III"]
        );
        assert_eq!(compliance_frameworks("retail", "UK"), vec!["UK_GAAP"]);
        assert!(compliance_frameworks("retail", "BRAZIL").is_empty());
    }

    #[test]
    fn test_financial_us_defaults() {
        let data = apply(json!({}), "Financial Services", "United States");

        assert_eq!(data["riskManagementFramework"], json!("ENTERPRISE_RISK_MANAGEMENT"));
        assert_eq!(data["complianceFramework"], json!("SOX|BASEL_III"));
        assert_eq!(data["soxComplianceRequired"], json!("true"));
        assert_eq!(data["soxControlTesting"], json!("REQUIRED"));
        assert_eq!(data["regulatoryReportingRequired"], json!("true"));
        assert_eq!(data["multiFactorAuthenticationRequired"], json!("true"));
        assert_eq!(data["dataPrivacyProtection"], json!("CCPA"));
        assert_eq!(data["continuousMonitoring"], json!("ENABLED"));
        assert_eq!(data["complianceComplexity"], json!("MEDIUM"));
        assert_eq!(data["riskManagementComplexity"], json!("HIGH"));
    }

    #[test]
    fn test_retail_elsewhere_defaults() {
        let data = apply(json!({}), "Retail", "Brazil");

        assert_eq!(data["complianceFramework"], json!("STANDARD"));
        assert_eq!(data["soxComplianceRequired"], json!("false"));
        assert!(!data.contains_key("soxControlTesting"));
        assert_eq!(data["dataPrivacyProtection"], json!("STANDARD"));
        assert_eq!(data["personalDataProtection"], json!("STANDARD"));
        assert_eq!(data["complianceComplexity"], json!("MEDIUM"));
        assert_eq!(data["securityImplementationComplexity"], json!("MEDIUM"));
    }
}
