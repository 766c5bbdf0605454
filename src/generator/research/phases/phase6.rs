use crate::generator::research::phase::{FieldDefaults, PhaseExtractor, contains_any};
use crate::types::profile::CompanyProfile;

/// Phase 6：流程与审批设计
#[derive(Default, Clone)]
pub struct ProcessWorkflow;

impl PhaseExtractor for ProcessWorkflow {
    fn number(&self) -> u8 {
        6
    }

    fn name(&self) -> &'static str {
        "Process & Workflow Design"
    }

    fn template_stem(&self) -> &'static str {
        "process-workflow"
    }

    fn builtin_template(&self) -> &'static str {
        include_str!("../../../../phases_data/phase6-process-workflow.json")
    }

    fn focus(&self, profile: &CompanyProfile) -> String {
        format!(
            r#"
**PHASE 6 FOCUS**: Design business processes, approval workflows and document controls for Oracle Fusion ERP.

**KEY EXTRACTION PRIORITIES**:
1. **Order to Cash**: Quotation, order entry, credit checks, invoicing and collections
2. **Procure to Pay**: Requisitions, purchase orders, receipts, matching and payments
3. **Record to Report**: Journal processing, period close and financial reporting
4. **Approval Workflows**: Hierarchy levels, approval limits and escalation rules
5. **Document Management**: Numbering schemes, retention and approval trail
6. **Business Rules**: Validations, default values and duplicate checking
7. **Process Maturity**: Automation level, close timeline and customization needs

**INDUSTRY CONTEXT**: {industry} process patterns and best practices
**OPERATIONAL CONTEXT**: {country} business practices and controls

This data will configure:
- Order to cash and procure to pay flows
- Approval rules and hierarchies
- Document sequencing
- Business rule validations
- Period close procedures
"#,
            industry = profile.industry,
            country = profile.country,
        )
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "orderToCashProcess",
            "procureToPay",
            "recordToReport",
            "approvalWorkflowEnabled",
            "documentNumberingScheme",
        ]
    }

    fn apply_defaults(&self, fields: &mut FieldDefaults<'_>, profile: &CompanyProfile) {
        let industry = profile.industry.to_lowercase();

        let quotation = if industry.contains("b2b") { "true" } else { "false" };
        fields.fill_group(
            "orderToCashProcess",
            &[
                ("orderToCashProcess", "ENABLED"),
                ("quotationRequired", quotation),
                ("creditCheckRequired", "true"),
                ("orderApprovalRequired", "true"),
            ],
        );

        let sales_order = if industry.contains("manufacturing") {
            "MAKE_TO_ORDER"
        } else if industry.contains("retail") {
            "MAKE_TO_STOCK"
        } else {
            "STANDARD"
        };
        fields.fill("salesOrderProcessing", sales_order);

        fields.fill_group(
            "invoicingProcess",
            &[
                ("invoicingProcess", "AUTOMATIC_ON_SHIPMENT"),
                ("invoiceApprovalRequired", "false"),
                ("invoiceNumberingAutomatic", "true"),
            ],
        );
        fields.fill_group(
            "customerCreditManagement",
            &[
                ("customerCreditManagement", "ENABLED"),
                ("creditLimitCheckTiming", "ORDER_ENTRY"),
                ("creditHoldProcess", "AUTOMATIC"),
            ],
        );

        fields.fill_group(
            "procureToPay",
            &[
                ("procureToPay", "ENABLED"),
                ("purchaseRequisitionRequired", "true"),
                ("purchaseOrderApprovalRequired", "true"),
                ("receiptRequiredForInvoicing", "true"),
            ],
        );

        let (purchasing, blanket) = if industry.contains("manufacturing") {
            ("THREE_WAY_MATCHING", "true")
        } else {
            ("STANDARD_PO", "false")
        };
        fields.fill_group(
            "purchasingProcess",
            &[
                ("purchasingProcess", purchasing),
                ("blanketOrdersEnabled", blanket),
            ],
        );

        fields.fill_group(
            "supplierManagement",
            &[
                ("supplierManagement", "ENABLED"),
                ("supplierApprovalWorkflow", "REQUIRED"),
                ("supplierPerformanceTracking", "true"),
            ],
        );

        let (po_limit, invoice_limit) = if contains_any(&industry, &["enterprise", "large"]) {
            ("50000", "25000")
        } else {
            ("10000", "5000")
        };
        fields.fill_group(
            "purchaseOrderApprovalLimit",
            &[
                ("purchaseOrderApprovalLimit", po_limit),
                ("invoiceApprovalLimit", invoice_limit),
            ],
        );

        fields.fill_group(
            "recordToReport",
            &[
                ("recordToReport", "ENABLED"),
                ("monthEndCloseProcess", "ENABLED"),
                ("journalApprovalRequired", "true"),
            ],
        );
        fields.fill_group(
            "generalLedgerProcess",
            &[
                ("generalLedgerProcess", "REAL_TIME_POSTING"),
                ("budgetControlEnabled", "true"),
                ("encumbranceAccountingEnabled", "false"),
            ],
        );
        fields.fill_group(
            "financialReporting",
            &[
                ("financialReporting", "AUTOMATED"),
                ("reportingFrequency", "MONTHLY"),
                ("consolidationRequired", "false"),
            ],
        );

        let close_timeline = if contains_any(&industry, &["public", "financial", "regulated"]) {
            "3_BUSINESS_DAYS"
        } else {
            "5_BUSINESS_DAYS"
        };
        fields.fill("monthEndCloseTimeline", close_timeline);

        fields.fill_group(
            "approvalWorkflowEnabled",
            &[
                ("approvalWorkflowEnabled", "true"),
                ("approvalMethod", "HIERARCHICAL"),
                ("escalationEnabled", "true"),
            ],
        );

        let levels = if industry.contains("enterprise") {
            "4"
        } else if industry.contains("mid-market") {
            "3"
        } else {
            "2"
        };
        fields.fill("approvalHierarchyLevels", levels);

        fields.fill_group(
            "level1ApprovalLimit",
            &[
                ("level1ApprovalLimit", "1000"),
                ("level1ApprovalTitle", "Manager"),
                ("level2ApprovalLimit", "10000"),
                ("level2ApprovalTitle", "Director"),
                ("level3ApprovalLimit", "50000"),
                ("level3ApprovalTitle", "VP"),
            ],
        );
        fields.fill_group(
            "escalationTimeframe",
            &[
                ("escalationTimeframe", "24_HOURS"),
                ("escalationMethod", "EMAIL_NOTIFICATION"),
                ("parallelApprovalEnabled", "false"),
            ],
        );

        fields.fill_group(
            "documentNumberingScheme",
            &[
                ("documentNumberingScheme", "AUTOMATIC"),
                ("documentNumberingPattern", "PREFIX-YYYYMMDD-####"),
            ],
        );
        fields.fill_group(
            "salesOrderNumbering",
            &[
                ("salesOrderNumbering", "SO-{YYYY}-{######}"),
                ("purchaseOrderNumbering", "PO-{YYYY}-{######}"),
                ("invoiceNumbering", "INV-{YYYY}-{######}"),
                ("receiptNumbering", "REC-{YYYY}-{######}"),
            ],
        );
        fields.fill_group(
            "documentRetentionPolicy",
            &[
                ("documentRetentionPolicy", "7_YEARS"),
                ("electronicDocumentStorage", "ENABLED"),
                ("documentApprovalTrail", "REQUIRED"),
            ],
        );

        fields.fill_group(
            "businessRulesEnabled",
            &[
                ("businessRulesEnabled", "true"),
                ("customValidationRules", "ENABLED"),
                ("mandatoryFieldValidation", "STRICT"),
            ],
        );
        fields.fill_group(
            "defaultValueRules",
            &[
                ("defaultValueRules", "ENABLED"),
                ("defaultCostCenter", "1000"),
                ("defaultAccount", "60000"),
            ],
        );
        fields.fill_group(
            "duplicateCheckingEnabled",
            &[
                ("duplicateCheckingEnabled", "true"),
                ("supplierDuplicateCheck", "NAME_AND_TAX_ID"),
                ("customerDuplicateCheck", "NAME_AND_ADDRESS"),
            ],
        );

        let process_complexity = if contains_any(
            &industry,
            &["manufacturing", "financial", "healthcare", "pharmaceutical"],
        ) {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("processComplexity", process_complexity);

        let level_count: u32 = fields
            .text("approvalHierarchyLevels")
            .trim()
            .parse()
            .unwrap_or(2);
        let workflow_complexity = match level_count {
            n if n >= 4 => "HIGH",
            3 => "MEDIUM",
            _ => "LOW",
        };
        fields.fill("workflowComplexity", workflow_complexity);

        let customization = if fields.is("processComplexity", "HIGH") {
            "EXTENSIVE"
        } else {
            "MODERATE"
        };
        fields.fill("customizationRequired", customization);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn apply(data: Value, industry: &str) -> Map<String, Value> {
        let mut map = data.as_object().cloned().unwrap();
        let profile = CompanyProfile::new("Acme", industry, "United States");
        ProcessWorkflow.apply_defaults(&mut FieldDefaults::new(&mut map), &profile);
        map
    }

    #[test]
    fn test_manufacturing_enterprise_defaults() {
        let data = apply(json!({}), "Enterprise Manufacturing");

        assert_eq!(data["salesOrderProcessing"], json!("MAKE_TO_ORDER"));
        assert_eq!(data["purchasingProcess"], json!("THREE_WAY_MATCHING"));
        assert_eq!(data["blanketOrdersEnabled"], json!("true"));
        assert_eq!(data["purchaseOrderApprovalLimit"], json!("50000"));
        assert_eq!(data["approvalHierarchyLevels"], json!("4"));
        assert_eq!(data["workflowComplexity"], json!("HIGH"));
        assert_eq!(data["processComplexity"], json!("HIGH"));
        assert_eq!(data["customizationRequired"], json!("EXTENSIVE"));
        assert_eq!(data["salesOrderNumbering"], json!("SO-{YYYY}-{######}"));
    }

    #[test]
    fn test_workflow_complexity_uses_extracted_levels() {
        let data = apply(json!({ "approvalHierarchyLevels": 3 }), "Retail");

        assert_eq!(data["approvalHierarchyLevels"], json!(3));
        assert_eq!(data["workflowComplexity"], json!("MEDIUM"));
        assert_eq!(data["salesOrderProcessing"], json!("MAKE_TO_STOCK"));
        assert_eq!(data["monthEndCloseTimeline"], json!("5_BUSINESS_DAYS"));
        assert_eq!(data["customizationRequired"], json!("MODERATE"));
    }
}
