use crate::generator::research::phase::{FieldDefaults, PhaseExtractor, contains_any};
use crate::types::profile::CompanyProfile;

/// Phase 4：科目表框架
#[derive(Default, Clone)]
pub struct ChartOfAccounts;

impl ChartOfAccounts {
    /// 按行业给出默认的自然科目与科目区间
    fn natural_account_defaults(industry: &str) -> Vec<(&'static str, &'static str)> {
        let mut values = Vec::new();
        if industry.contains("manufacturing") {
            values.extend([
                ("naturalAccountCode", "50000"),
                ("naturalAccountName", "Cost of Goods Sold"),
                ("currentAssetRange", "10000-19999"),
                ("revenueRange", "40000-49999"),
                ("cogsRange", "50000-59999"),
                ("sellingExpenseRange", "60000-69999"),
            ]);
        } else if contains_any(industry, &["software", "technology"]) {
            values.extend([
                ("naturalAccountCode", "60000"),
                ("naturalAccountName", "Research and Development"),
                ("currentAssetRange", "10000-19999"),
                ("revenueRange", "40000-49999"),
                ("sellingExpenseRange", "60000-69999"),
                ("adminExpenseRange", "70000-79999"),
            ]);
        } else if industry.contains("services") {
            values.extend([
                ("naturalAccountCode", "60000"),
                ("naturalAccountName", "Professional Services Expense"),
                ("currentAssetRange", "10000-19999"),
                ("revenueRange", "40000-49999"),
                ("generalExpenseRange", "70000-79999"),
            ]);
        } else {
            values.extend([
                ("naturalAccountCode", "60000"),
                ("naturalAccountName", "Operating Expenses"),
                ("currentAssetRange", "10000-19999"),
                ("revenueRange", "40000-49999"),
                ("adminExpenseRange", "70000-79999"),
            ]);
        }
        values
    }
}

impl PhaseExtractor for ChartOfAccounts {
    fn number(&self) -> u8 {
        4
    }

    fn name(&self) -> &'static str {
        "Chart of Accounts Framework"
    }

    fn template_stem(&self) -> &'static str {
        "chart-of-accounts"
    }

    fn builtin_template(&self) -> &'static str {
        include_str!("../../../../phases_data/phase4-chart-of-accounts.json")
    }

    fn focus(&self, profile: &CompanyProfile) -> String {
        format!(
            r#"
**PHASE 4 FOCUS**: Design the chart of accounts structure, segments, value sets and hierarchies for Oracle Fusion General Ledger.

**KEY EXTRACTION PRIORITIES**:
1. **COA Structure**: Segment count, segment order, delimiters and naming
2. **Balancing Segments**: Company, intercompany and legal entity balancing needs
3. **Natural Accounts**: Account ranges for assets, liabilities, revenue and expenses
4. **Cost Centers**: Departmental and functional cost center hierarchy
5. **Value Sets**: Validation types, value ranges and security rules
6. **Hierarchies**: Rollup structures for management and statutory reporting
7. **Future Segments**: Project, product or location segments for growth

**INDUSTRY CONTEXT**: {industry} reporting and cost tracking patterns
**REGULATORY CONTEXT**: {country} statutory accounting requirements

This data will configure:
- Chart of accounts structure and segments
- Value sets and segment values
- Account and cost center hierarchies
- Cross-validation rules
- Intercompany accounting setup
"#,
            industry = profile.industry,
            country = profile.country,
        )
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "coaStructureName",
            "segment1Name",
            "segment2Name",
            "segment3Name",
            "valueSet1Name",
            "valueSet2Name",
            "companyCode1",
            "naturalAccountCode",
        ]
    }

    fn apply_defaults(&self, fields: &mut FieldDefaults<'_>, profile: &CompanyProfile) {
        let company = &profile.company;
        let industry = profile.industry.to_lowercase();

        let coa_name = format!("{} Chart of Accounts", company);
        let coa_code = format!("{}_COA", company.to_uppercase().replace(' ', "_"));
        fields.fill_group(
            "coaStructureName",
            &[
                ("coaStructureName", coa_name.as_str()),
                ("coaStructureCode", coa_code.as_str()),
            ],
        );
        fields.fill("segmentDelimiter", "-");

        fields.fill_group(
            "segment1Name",
            &[
                ("segment1Name", "Company"),
                ("segment1Code", "COMPANY"),
                ("segment1Type", "PRIMARY_BALANCING_SEGMENT"),
                ("valueSet1Name", "Company Value Set"),
                ("valueSet1Code", "COMPANY_VS"),
                ("valueSet1ValidationType", "INDEPENDENT"),
            ],
        );

        let company_name = format!("{} Operating Entity", company);
        let company_description = format!("Primary operating entity for {}", company);
        fields.fill_group(
            "companyCode1",
            &[
                ("companyCode1", "01"),
                ("companyName1", company_name.as_str()),
                ("companyDescription1", company_description.as_str()),
            ],
        );

        fields.fill_group(
            "segment2Name",
            &[
                ("segment2Name", "Account"),
                ("segment2Code", "ACCOUNT"),
                ("segment2Type", "NATURAL_ACCOUNT_SEGMENT"),
                ("valueSet2Name", "Natural Account Value Set"),
                ("valueSet2Code", "ACCOUNT_VS"),
            ],
        );

        let range_end = if industry.contains("manufacturing") {
            "99999"
        } else {
            "89999"
        };
        fields.fill_group(
            "accountRangeStart",
            &[("accountRangeStart", "10000"), ("accountRangeEnd", range_end)],
        );

        fields.fill_group(
            "segment3Name",
            &[
                ("segment3Name", "Cost Center"),
                ("segment3Code", "COST_CENTER"),
                ("segment3Type", "COST_CENTER_SEGMENT"),
                ("valueSet3Name", "Cost Center Value Set"),
                ("valueSet3Code", "CC_VS"),
            ],
        );

        let cost_center_structure = if industry.contains("services") && !industry.contains("manufacturing") {
            "GEOGRAPHICAL"
        } else {
            "FUNCTIONAL"
        };
        fields.fill("costCenterStructureType", cost_center_structure);

        fields.fill_group(
            "costCenterCodeL1",
            &[
                ("costCenterCodeL1", "1000"),
                ("costCenterNameL1", "Corporate Administration"),
                ("costCenterType", "ADMINISTRATIVE"),
                ("costCenterCodeL2", "2000"),
                ("costCenterNameL2", "Operations"),
            ],
        );

        fields.fill_group(
            "naturalAccountCode",
            &Self::natural_account_defaults(&industry),
        );

        let ic_name = format!("{} IC Entity", company);
        fields.fill_group(
            "segment4Name",
            &[
                ("segment4Name", "Intercompany"),
                ("segment4Code", "INTERCOMPANY"),
                ("segment4Type", "INTERCOMPANY_SEGMENT"),
                ("valueSet4Name", "Intercompany Value Set"),
                ("icOrgCode", "01"),
                ("icOrgName", ic_name.as_str()),
            ],
        );

        fields.fill_group(
            "segment5Name",
            &[
                ("segment5Name", "Project"),
                ("segment5Code", "PROJECT"),
                ("segment5Type", "FUTURE_1_SEGMENT"),
                ("potentialUse1", "PROJECT_TRACKING"),
                ("implementationPhase", "PHASE_2"),
            ],
        );

        let hierarchy_name = format!("{} Company Hierarchy", company);
        fields.fill_group(
            "companyHierarchyName",
            &[
                ("companyHierarchyName", hierarchy_name.as_str()),
                ("companyHierarchyCode", "COMP_HIER"),
                ("rollupMethod", "AUTOMATIC"),
            ],
        );

        let segment_complexity =
            if contains_any(&industry, &["enterprise", "multinational", "conglomerate"]) {
                "HIGH"
            } else {
                "MEDIUM"
            };
        fields.fill("segmentComplexity", segment_complexity);

        let hierarchy_complexity = if contains_any(&industry, &["manufacturing", "financial"]) {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("hierarchyComplexity", hierarchy_complexity);
        fields.fill("validationRuleComplexity", "MEDIUM");
        fields.fill("migrationComplexity", "MEDIUM");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn apply(data: Value, industry: &str) -> Map<String, Value> {
        let mut map = data.as_object().cloned().unwrap();
        let profile = CompanyProfile::new("Acme Widgets", industry, "United States");
        ChartOfAccounts.apply_defaults(&mut FieldDefaults::new(&mut map), &profile);
        map
    }

    #[test]
    fn test_manufacturing_defaults() {
        let data = apply(json!({}), "Manufacturing");

        assert_eq!(data["coaStructureName"], json!("Acme Widgets Chart of Accounts"));
        assert_eq!(data["coaStructureCode"], json!("ACME_WIDGETS_COA"));
        assert_eq!(data["segmentDelimiter"], json!("-"));
        assert_eq!(data["accountRangeEnd"], json!("99999"));
        assert_eq!(data["naturalAccountCode"], json!("50000"));
        assert_eq!(data["cogsRange"], json!("50000-59999"));
        assert_eq!(data["hierarchyComplexity"], json!("HIGH"));
        assert_eq!(data["icOrgName"], json!("Acme Widgets IC Entity"));
    }

    #[test]
    fn test_services_keep_extracted_segments() {
        let data = apply(
            json!({ "segment1Name": "Entity", "naturalAccountCode": "61000" }),
            "Professional Services",
        );

        assert_eq!(data["segment1Name"], json!("Entity"));
        assert!(!data.contains_key("valueSet1Name"));
        assert_eq!(data["naturalAccountCode"], json!("61000"));
        assert!(!data.contains_key("generalExpenseRange"));
        assert_eq!(data["costCenterStructureType"], json!("GEOGRAPHICAL"));
        assert_eq!(data["accountRangeEnd"], json!("89999"));
    }
}
