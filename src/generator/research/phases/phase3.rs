use crate::generator::research::phase::{
    FieldDefaults, PhaseExtractor, contains_any, currency_for_country,
};
use crate::types::profile::CompanyProfile;

/// Phase 3：企业结构设计
#[derive(Default, Clone)]
pub struct EnterpriseStructure;

impl PhaseExtractor for EnterpriseStructure {
    fn number(&self) -> u8 {
        3
    }

    fn name(&self) -> &'static str {
        "Enterprise Structure Design"
    }

    fn template_stem(&self) -> &'static str {
        "enterprise-structure"
    }

    fn builtin_template(&self) -> &'static str {
        include_str!("../../../../phases_data/phase3-enterprise-structure.json")
    }

    fn focus(&self, profile: &CompanyProfile) -> String {
        format!(
            r#"
**PHASE 3 FOCUS**: Design the enterprise structure including legal entities, business units, and organizational hierarchy for Oracle Fusion ERP implementation.

**KEY EXTRACTION PRIORITIES**:
1. **Legal Entity Structure**: Parent-subsidiary relationships, ownership percentages, jurisdictions
2. **Business Organization**: Divisions, business units, profit centers, cost centers
3. **Geographic Structure**: Operating locations, regional management, consolidation needs
4. **Functional Organization**: Departments, reporting lines, management hierarchies
5. **Financial Structure**: Consolidation requirements, reporting currencies, elimination needs
6. **Operational Model**: Centralized vs decentralized, shared services, decision-making
7. **Reference Data Sets**: Business unit assignments, location mappings, hierarchies

**INDUSTRY CONTEXT**: {industry} companies typically have specific organizational patterns
**GEOGRAPHIC SCOPE**: {country} regulatory and operational requirements

This data will configure:
- Legal entity definitions in Oracle Fusion
- Business unit structures and assignments
- Reference data sets and hierarchies
- Consolidation and elimination rules
- Multi-currency and multi-entity reporting
"#,
            industry = profile.industry,
            country = profile.country,
        )
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "enterpriseName",
            "operationalModel",
            "organizationStructure",
            "legalEntityId",
            "legalEntityType",
            "functionalCurrency",
        ]
    }

    fn apply_defaults(&self, fields: &mut FieldDefaults<'_>, profile: &CompanyProfile) {
        let company = &profile.company;
        let industry = profile.industry.to_lowercase();
        let country = profile.country.to_uppercase();

        fields.fill("enterpriseName", format!("{} Enterprise", company));

        let operational_model = if contains_any(&industry, &["multinational", "global", "enterprise"]) {
            "FEDERATED"
        } else if contains_any(&industry, &["software", "technology"]) {
            "CENTRALIZED"
        } else {
            "HYBRID"
        };
        fields.fill("operationalModel", operational_model);

        let organization = if industry.contains("manufacturing") {
            "DIVISIONAL"
        } else if contains_any(&industry, &["consulting", "services"]) {
            "FUNCTIONAL"
        } else {
            "HYBRID"
        };
        fields.fill("organizationStructure", organization);

        fields.fill("legalEntityType", "CORPORATION");
        // 只映射主要英语国家与欧元区，其余默认USD
        let currency = currency_for_country(&country)
            .filter(|c| matches!(*c, "USD" | "GBP" | "CAD" | "AUD" | "EUR"))
            .unwrap_or("USD");
        fields.fill("functionalCurrency", currency);
        fields.fill("consolidationMethod", "FULL_CONSOLIDATION");

        let bu_name = format!("{} Primary BU", company);
        fields.fill_group(
            "financialBusinessUnitName",
            &[
                ("financialBusinessUnitName", bu_name.as_str()),
                ("financialBusinessUnitCode", "BU_001"),
                ("financialBusinessUnitShortName", "PRIMARY_BU"),
            ],
        );

        let rds_name = format!("{} Common RDS", company);
        fields.fill_group(
            "rdsName",
            &[
                ("rdsName", rds_name.as_str()),
                ("rdsCode", "COMMON_RDS"),
                ("rdsSetType", "COMMON"),
            ],
        );

        let organizational = if contains_any(&industry, &["enterprise", "multinational", "conglomerate"]) {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("organizationalComplexity", organizational);

        let legal = if fields.is("operationalModel", "FEDERATED") {
            "HIGH"
        } else if fields.is("operationalModel", "CENTRALIZED") {
            "LOW"
        } else {
            "MEDIUM"
        };
        fields.fill("legalStructureComplexity", legal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn apply(data: Value, industry: &str, country: &str) -> Map<String, Value> {
        let mut map = data.as_object().cloned().unwrap();
        let profile = CompanyProfile::new("Acme", industry, country);
        EnterpriseStructure.apply_defaults(&mut FieldDefaults::new(&mut map), &profile);
        map
    }

    #[test]
    fn test_defaults_use_company_profile() {
        let data = apply(json!({}), "Software", "Canada");

        assert_eq!(data["enterpriseName"], json!("Acme Enterprise"));
        assert_eq!(data["operationalModel"], json!("CENTRALIZED"));
        assert_eq!(data["organizationStructure"], json!("HYBRID"));
        assert_eq!(data["functionalCurrency"], json!("CAD"));
        assert_eq!(data["financialBusinessUnitName"], json!("Acme Primary BU"));
        assert_eq!(data["financialBusinessUnitCode"], json!("BU_001"));
        assert_eq!(data["rdsName"], json!("Acme Common RDS"));
        assert_eq!(data["legalStructureComplexity"], json!("LOW"));
    }

    #[test]
    fn test_unmapped_country_falls_back_to_usd() {
        let data = apply(json!({ "operationalModel": "FEDERATED" }), "Manufacturing", "Japan");

        assert_eq!(data["functionalCurrency"], json!("USD"));
        assert_eq!(data["organizationStructure"], json!("DIVISIONAL"));
        assert_eq!(data["legalStructureComplexity"], json!("HIGH"));
    }
}
