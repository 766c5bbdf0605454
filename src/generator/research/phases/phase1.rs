use crate::generator::research::phase::{FieldDefaults, PhaseExtractor, is_us};
use crate::types::profile::CompanyProfile;

/// Phase 1：公司发现与基础信息
#[derive(Default, Clone)]
pub struct CompanyDiscovery;

impl PhaseExtractor for CompanyDiscovery {
    fn number(&self) -> u8 {
        1
    }

    fn name(&self) -> &'static str {
        "Company Discovery & Basic Information"
    }

    fn template_stem(&self) -> &'static str {
        "company-discovery"
    }

    fn builtin_template(&self) -> &'static str {
        include_str!("../../../../phases_data/phase1-company-discovery.json")
    }

    fn focus(&self, profile: &CompanyProfile) -> String {
        format!(
            r#"
**PHASE 1 FOCUS**: Extract comprehensive company information to establish the foundational data for Oracle Fusion ERP configuration.

**KEY EXTRACTION PRIORITIES**:
1. **Legal Structure**: Full legal name, incorporation details, entity type
2. **Business Metrics**: Revenue range, employee count, industry classification
3. **Geographic Presence**: Headquarters address, operational locations
4. **Executive Leadership**: CEO, CFO, and key executive information
5. **Corporate Identity**: Mission, vision, values, business model
6. **Digital Presence**: Website information, online properties
7. **Financial Context**: Fiscal year, revenue streams, public/private status

**INDUSTRY CONTEXT**: {industry}
**GEOGRAPHIC CONTEXT**: {country}

This data will be used to configure:
- Legal entities in Oracle Fusion
- Enterprise structure design
- Chart of accounts framework
- Currency and localization settings
- Security and approval hierarchies
"#,
            industry = profile.industry,
            country = profile.country,
        )
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "companyName",
            "legalName",
            "website",
            "businessModel",
            "hqStreetAddress",
            "hqCity",
            "hqState",
            "hqCountry",
        ]
    }

    fn apply_defaults(&self, fields: &mut FieldDefaults<'_>, _profile: &CompanyProfile) {
        fields.fill("fiscalYearEnd", "December");

        let employee_range = fields.text("employeeRange");
        let large = employee_range.contains("500") || employee_range.contains("1000");

        fields.fill("entityType", if large { "C_CORP" } else { "CORPORATION" });
        fields.fill("businessModel", "B2B");

        if fields.is_missing("hqTimeZone") {
            let state = fields.text("hqState").to_uppercase();
            let country = fields.text("hqCountry").to_uppercase();
            let zone = if is_us(&country) {
                match state.as_str() {
                    "CA" | "CALIFORNIA" | "WA" | "WASHINGTON" | "OR" | "OREGON" => {
                        "America/Los_Angeles"
                    }
                    "TX" | "TEXAS" | "IL" | "ILLINOIS" => "America/Chicago",
                    _ => "America/New_York",
                }
            } else {
                "UTC"
            };
            fields.fill("hqTimeZone", zone);
        }

        fields.fill("publicCompany", "FALSE");
        fields.fill("legalEntitySetup", "REQUIRED");

        let multi_currency = if is_us(&fields.text("hqCountry").to_uppercase()) {
            "NOT_REQUIRED"
        } else {
            "REQUIRED"
        };
        fields.fill("multiCurrencyNeeds", multi_currency);
        fields.fill(
            "complianceRequirements",
            if large { "HIGH" } else { "MEDIUM" },
        );
    }
}
