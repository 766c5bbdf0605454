use crate::generator::research::phase::{FieldDefaults, PhaseExtractor, contains_any, is_us};
use crate::types::profile::CompanyProfile;

/// Phase 8：集成与技术环境
#[derive(Default, Clone)]
pub struct IntegrationTechnology;

/// 行业常见的周边系统
struct IndustrySystems {
    crm: &'static str,
    ecommerce: &'static str,
    systems: &'static [&'static str],
}

const INDUSTRY_SYSTEMS: &[(&str, IndustrySystems)] = &[
    (
        "manufacturing",
        IndustrySystems {
            crm: "SALESFORCE",
            ecommerce: "B2B_PORTAL",
            systems: &["MES", "PLM", "CAD", "QUALITY_MANAGEMENT"],
        },
    ),
    (
        "retail",
        IndustrySystems {
            crm: "SALESFORCE",
            ecommerce: "SHOPIFY",
            systems: &["POS", "INVENTORY_MANAGEMENT", "MERCHANDISING"],
        },
    ),
    (
        "healthcare",
        IndustrySystems {
            crm: "SALESFORCE_HEALTH_CLOUD",
            ecommerce: "NONE",
            systems: &["EMR", "PACS", "LIS", "PHARMACY_SYSTEM"],
        },
    ),
    (
        "financial",
        IndustrySystems {
            crm: "SALESFORCE_FINANCIAL",
            ecommerce: "NONE",
            systems: &["CORE_BANKING", "TRADING_SYSTEM", "RISK_MANAGEMENT"],
        },
    ),
    (
        "technology",
        IndustrySystems {
            crm: "HUBSPOT",
            ecommerce: "NONE",
            systems: &["JIRA", "CONFLUENCE", "GIT", "CI_CD"],
        },
    ),
];

static DEFAULT_SYSTEMS: IndustrySystems = IndustrySystems {
    crm: "SALESFORCE",
    ecommerce: "NONE",
    systems: &["DOCUMENT_MANAGEMENT"],
};

fn systems_for(industry: &str) -> &'static IndustrySystems {
    INDUSTRY_SYSTEMS
        .iter()
        .find(|(key, _)| industry.contains(key))
        .map(|(_, systems)| systems)
        .unwrap_or(&DEFAULT_SYSTEMS)
}

impl PhaseExtractor for IntegrationTechnology {
    fn number(&self) -> u8 {
        8
    }

    fn name(&self) -> &'static str {
        "Integration & Technology Context"
    }

    fn template_stem(&self) -> &'static str {
        "integration-technology"
    }

    fn builtin_template(&self) -> &'static str {
        include_str!("../../../../phases_data/phase8-integration-technology.json")
    }

    fn focus(&self, profile: &CompanyProfile) -> String {
        format!(
            r#"
**PHASE 8 FOCUS**: Capture the integration architecture, surrounding systems and technology infrastructure for Oracle Fusion ERP.

**KEY EXTRACTION PRIORITIES**:
1. **Integration Architecture**: Hub and spoke, API first or point to point patterns
2. **Third-Party Systems**: CRM, e-commerce, warehouse and industry systems
3. **Data Integration**: ETL approach, master data and synchronization frequency
4. **Infrastructure**: Cloud deployment model, data residency and networking
5. **API Management**: Standards, versioning, security and rate limiting
6. **Monitoring**: System, performance and log monitoring
7. **Support Model**: Incident response and escalation procedures

**INDUSTRY CONTEXT**: {industry} system landscape and integration needs
**GEOGRAPHIC CONTEXT**: {country} data residency and infrastructure constraints

This data will configure:
- Oracle Integration Cloud connections
- Master data and synchronization rules
- API and web service endpoints
- Infrastructure and deployment options
- Monitoring and support processes
"#,
            industry = profile.industry,
            country = profile.country,
        )
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "integrationArchitecture",
            "dataIntegrationApproach",
            "apiManagementRequired",
            "systemIntegrationComplexity",
            "technologyInfrastructure",
        ]
    }

    fn apply_defaults(&self, fields: &mut FieldDefaults<'_>, profile: &CompanyProfile) {
        let industry = profile.industry.to_lowercase();
        let country = profile.country.to_uppercase();
        let enterprise = industry.contains("enterprise");
        let industry_systems = systems_for(&industry);

        let architecture = if contains_any(&industry, &["enterprise", "large", "multinational"]) {
            "HUB_AND_SPOKE"
        } else if contains_any(&industry, &["technology", "startup", "saas"]) {
            "API_FIRST"
        } else {
            "POINT_TO_POINT"
        };
        fields.fill("integrationArchitecture", architecture);

        let platform = if fields.is("integrationArchitecture", "HUB_AND_SPOKE") {
            "ORACLE_INTEGRATION_CLOUD"
        } else if fields.is("integrationArchitecture", "API_FIRST") {
            "REST_API_GATEWAY"
        } else {
            "FILE_BASED"
        };
        fields.fill("integrationPlatform", platform);

        let pattern = if industry.contains("manufacturing") {
            "REAL_TIME"
        } else if industry.contains("retail") {
            "NEAR_REAL_TIME"
        } else {
            "BATCH"
        };
        fields.fill("primaryIntegrationPattern", pattern);

        fields.fill_group(
            "dataFlowDirection",
            &[
                ("dataFlowDirection", "BIDIRECTIONAL"),
                ("dataVolumeExpected", if enterprise { "HIGH" } else { "MEDIUM" }),
            ],
        );

        fields.fill_group(
            "crmSystemRequired",
            &[
                ("crmSystemRequired", "true"),
                ("crmSystemType", industry_systems.crm),
            ],
        );

        if contains_any(&industry, &["retail", "b2c"]) {
            let platform = match industry_systems.ecommerce {
                "NONE" => "SHOPIFY",
                other => other,
            };
            fields.fill_group(
                "ecommerceIntegrationRequired",
                &[
                    ("ecommerceIntegrationRequired", "true"),
                    ("ecommercePlatform", platform),
                ],
            );
        } else {
            fields.fill("ecommerceIntegrationRequired", "false");
        }

        if contains_any(&industry, &["manufacturing", "retail"]) {
            fields.fill_group(
                "warehouseManagementSystem",
                &[
                    ("warehouseManagementSystem", "REQUIRED"),
                    ("wmsIntegrationType", "REAL_TIME"),
                ],
            );
        } else {
            fields.fill("warehouseManagementSystem", "NOT_REQUIRED");
        }

        let systems = if industry_systems.systems.is_empty() {
            "NONE".to_string()
        } else {
            industry_systems.systems.join("|")
        };
        fields.fill("industrySpecificSystems", systems);

        fields.fill_group(
            "legacySystemIntegration",
            &[
                ("legacySystemIntegration", "REQUIRED"),
                ("legacyMigrationApproach", "PHASED_MIGRATION"),
                ("dataCleansingRequired", "true"),
            ],
        );

        let approach = if contains_any(&industry, &["financial", "healthcare", "manufacturing"]) {
            "ETL_WITH_VALIDATION"
        } else {
            "STANDARD_ETL"
        };
        fields.fill("dataIntegrationApproach", approach);

        fields.fill_group(
            "masterDataManagement",
            &[
                ("masterDataManagement", "REQUIRED"),
                ("masterDataDomains", "CUSTOMER|SUPPLIER|ITEM|EMPLOYEE"),
                ("dataGovernanceFramework", "ENABLED"),
            ],
        );
        fields.fill_group(
            "dataQualityManagement",
            &[
                ("dataQualityManagement", "ENABLED"),
                ("dataValidationRules", "COMPREHENSIVE"),
                ("dataProfilingRequired", "true"),
            ],
        );

        let sync = if fields.is("primaryIntegrationPattern", "REAL_TIME") {
            "REAL_TIME"
        } else if fields.is("primaryIntegrationPattern", "NEAR_REAL_TIME") {
            "EVERY_15_MINUTES"
        } else {
            "NIGHTLY"
        };
        fields.fill("dataSynchronizationFrequency", sync);

        fields.fill_group(
            "dataErrorHandling",
            &[
                ("dataErrorHandling", "AUTOMATED_RETRY_WITH_MANUAL_FALLBACK"),
                ("errorNotificationEnabled", "true"),
                ("dataReconciliationRequired", "true"),
            ],
        );

        let infrastructure = if contains_any(&industry, &["technology", "startup", "saas"]) {
            "CLOUD_NATIVE"
        } else if contains_any(&industry, &["financial", "healthcare", "government"]) {
            "HYBRID_CLOUD"
        } else {
            "CLOUD_FIRST"
        };
        fields.fill("technologyInfrastructure", infrastructure);

        let deployment = if fields.is("technologyInfrastructure", "HYBRID_CLOUD") {
            "HYBRID"
        } else {
            "PUBLIC_CLOUD"
        };
        fields.fill("cloudDeploymentModel", deployment);

        let residency = if is_us(&country) {
            "US_ONLY"
        } else if country == "EU" {
            "EU_ONLY"
        } else {
            "FLEXIBLE"
        };
        fields.fill("dataResidencyRequirements", residency);

        fields.fill_group(
            "networkRequirements",
            &[
                ("networkRequirements", "DEDICATED_CONNECTION"),
                ("bandwidthRequirements", if enterprise { "HIGH" } else { "MEDIUM" }),
                ("networkSecurityRequired", "VPN_OR_PRIVATE_LINK"),
            ],
        );

        let api_management = contains_any(&industry, &["technology", "saas", "platform"]);
        fields.fill(
            "apiManagementRequired",
            if api_management { "true" } else { "false" },
        );
        if fields.text("apiManagementRequired") == "true" {
            fields.fill_group(
                "apiStandards",
                &[
                    ("apiStandards", "REST_JSON"),
                    ("apiVersioningStrategy", "URL_VERSIONING"),
                    ("apiDocumentationRequired", "true"),
                ],
            );
            fields.fill_group(
                "apiSecurityApproach",
                &[
                    ("apiSecurityApproach", "OAUTH_2_0"),
                    ("apiRateLimitingEnabled", "true"),
                    ("apiMonitoringRequired", "true"),
                ],
            );
        }

        fields.fill_group(
            "webServicesRequired",
            &[
                ("webServicesRequired", "true"),
                ("webServiceType", "REST_AND_SOAP"),
                ("webServiceSecurity", "TOKEN_BASED"),
            ],
        );
        fields.fill_group(
            "systemMonitoringRequired",
            &[
                ("systemMonitoringRequired", "true"),
                ("monitoringScope", "APPLICATION_AND_INFRASTRUCTURE"),
                ("alertingEnabled", "true"),
            ],
        );
        fields.fill_group(
            "performanceMonitoring",
            &[
                ("performanceMonitoring", "ENABLED"),
                ("performanceBaselining", "REQUIRED"),
                ("capacityPlanningRequired", "true"),
            ],
        );
        fields.fill_group(
            "loggingRequirements",
            &[
                ("loggingRequirements", "COMPREHENSIVE"),
                ("logRetentionPeriod", "1_YEAR"),
                ("logAnalyticsEnabled", "true"),
            ],
        );

        let response_time = if industry.contains("critical") {
            "4_HOURS"
        } else {
            "8_HOURS"
        };
        fields.fill_group(
            "supportProcedures",
            &[
                ("supportProcedures", "24x7_MONITORING"),
                ("incidentResponseTime", response_time),
                ("escalationProcedures", "DEFINED"),
            ],
        );

        let mut score = if fields.is("integrationArchitecture", "HUB_AND_SPOKE") {
            3
        } else if fields.is("integrationArchitecture", "API_FIRST") {
            2
        } else {
            1
        };
        score += if contains_any(&industry, &["manufacturing", "financial", "healthcare"]) {
            2
        } else {
            1
        };
        if fields.is("technologyInfrastructure", "HYBRID_CLOUD") {
            score += 2;
        } else if fields.is("technologyInfrastructure", "CLOUD_NATIVE") {
            score += 1;
        }
        if fields.text("industrySpecificSystems").split('|').count() > 3 {
            score += 2;
        }
        let integration_complexity = match score {
            s if s >= 7 => "HIGH",
            s if s >= 4 => "MEDIUM",
            _ => "LOW",
        };
        fields.fill("systemIntegrationComplexity", integration_complexity);

        let data_complexity = if fields.is("dataIntegrationApproach", "ETL_WITH_VALIDATION") {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("dataIntegrationComplexity", data_complexity);

        let risk = if fields.is("systemIntegrationComplexity", "HIGH") {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("technologyImplementationRisk", risk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn apply(data: Value, industry: &str, country: &str) -> Map<String, Value> {
        let mut map = data.as_object().cloned().unwrap();
        let profile = CompanyProfile::new("Acme", industry, country);
        IntegrationTechnology.apply_defaults(&mut FieldDefaults::new(&mut map), &profile);
        map
    }

    #[test]
    fn test_enterprise_manufacturing_is_high_complexity() {
        let data = apply(json!({}), "Enterprise Manufacturing", "United States");

        assert_eq!(data["integrationArchitecture"], json!("HUB_AND_SPOKE"));
        assert_eq!(data["integrationPlatform"], json!("ORACLE_INTEGRATION_CLOUD"));
        assert_eq!(data["crmSystemType"], json!("SALESFORCE"));
        assert_eq!(data["industrySpecificSystems"], json!("MES|PLM|CAD|QUALITY_MANAGEMENT"));
        assert_eq!(data["warehouseManagementSystem"], json!("REQUIRED"));
        assert_eq!(data["dataSynchronizationFrequency"], json!("REAL_TIME"));
        assert_eq!(data["dataResidencyRequirements"], json!("US_ONLY"));
        assert_eq!(data["systemIntegrationComplexity"], json!("HIGH"));
        assert_eq!(data["technologyImplementationRisk"], json!("HIGH"));
        assert!(!data.contains_key("apiStandards"));
    }

    #[test]
    fn test_saas_company_gets_api_defaults() {
        let data = apply(json!({}), "Technology SaaS", "Germany");

        assert_eq!(data["integrationArchitecture"], json!("API_FIRST"));
        assert_eq!(data["crmSystemType"], json!("HUBSPOT"));
        assert_eq!(data["technologyInfrastructure"], json!("CLOUD_NATIVE"));
        assert_eq!(data["apiManagementRequired"], json!("true"));
        assert_eq!(data["apiStandards"], json!("REST_JSON"));
        assert_eq!(data["apiSecurityApproach"], json!("OAUTH_2_0"));
        assert_eq!(data["ecommerceIntegrationRequired"], json!("false"));
        assert_eq!(data["dataResidencyRequirements"], json!("FLEXIBLE"));
        // 2 + 1 + 1 + 2
        assert_eq!(data["systemIntegrationComplexity"], json!("MEDIUM"));
    }
}
