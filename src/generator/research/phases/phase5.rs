use crate::generator::research::phase::{
    FieldDefaults, PhaseExtractor, contains_any, currency_for_country, is_us,
};
use crate::types::profile::CompanyProfile;

/// Phase 5：币种与本地化
#[derive(Default, Clone)]
pub struct CurrencyLocalization;

enum Locale {
    Us,
    Uk,
    Canada,
}

impl Locale {
    fn from_country(country_upper: &str) -> Self {
        match country_upper {
            "UK" | "UNITED KINGDOM" => Locale::Uk,
            "CANADA" => Locale::Canada,
            _ => Locale::Us,
        }
    }

    fn settings(&self) -> [(&'static str, &'static str); 9] {
        match self {
            Locale::Us => [
                ("dateFormat", "MM/dd/yyyy"),
                ("timeFormat", "hh:mm:ss a"),
                ("numberFormat", "1,234.56"),
                ("addressFormat", "US_STANDARD"),
                ("postalCodeFormat", "#####-####"),
                ("phoneNumberFormat", "(###) ###-####"),
                ("taxNumberFormat", "##-#######"),
                ("languageCode", "en-US"),
                ("countryCode", "US"),
            ],
            Locale::Uk => [
                ("dateFormat", "dd/MM/yyyy"),
                ("timeFormat", "HH:mm:ss"),
                ("numberFormat", "1,234.56"),
                ("addressFormat", "UK_STANDARD"),
                ("postalCodeFormat", "##### ###"),
                ("phoneNumberFormat", "+44 #### ######"),
                ("taxNumberFormat", "### #### ##"),
                ("languageCode", "en-GB"),
                ("countryCode", "GB"),
            ],
            Locale::Canada => [
                ("dateFormat", "dd/MM/yyyy"),
                ("timeFormat", "HH:mm:ss"),
                ("numberFormat", "1,234.56"),
                ("addressFormat", "CA_STANDARD"),
                ("postalCodeFormat", "### ###"),
                ("phoneNumberFormat", "(###) ###-####"),
                ("taxNumberFormat", "### ### ###"),
                ("languageCode", "en-CA"),
                ("countryCode", "CA"),
            ],
        }
    }
}

fn standard_vat_rate(country_upper: &str) -> &'static str {
    match country_upper {
        "UK" | "UNITED KINGDOM" => "20%",
        "GERMANY" => "19%",
        "FRANCE" => "20%",
        "SPAIN" => "21%",
        "ITALY" => "22%",
        "CANADA" => "5%",
        "AUSTRALIA" => "10%",
        _ => "20%",
    }
}

impl PhaseExtractor for CurrencyLocalization {
    fn number(&self) -> u8 {
        5
    }

    fn name(&self) -> &'static str {
        "Currency & Localization"
    }

    fn template_stem(&self) -> &'static str {
        "currency-localization"
    }

    fn builtin_template(&self) -> &'static str {
        include_str!("../../../../phases_data/phase5-currency-localization.json")
    }

    fn focus(&self, profile: &CompanyProfile) -> String {
        format!(
            r#"
**PHASE 5 FOCUS**: Configure currencies, exchange rates, localization formats, banking and tax settings for Oracle Fusion ERP.

**KEY EXTRACTION PRIORITIES**:
1. **Currency Setup**: Functional, reporting and transaction currencies
2. **Exchange Rates**: Rate types, sources, conversion and revaluation rules
3. **Localization Formats**: Date, time, number, address and phone formats
4. **Banking**: Bank accounts, payment methods and cash management
5. **Tax Configuration**: VAT/GST, sales tax, withholding tax and reporting frequency
6. **Statutory Reporting**: Local GAAP, statutory reports and audit trail
7. **Data Retention**: Legal retention periods and archiving requirements

**GEOGRAPHIC CONTEXT**: {country} localization and tax requirements
**INDUSTRY CONTEXT**: {industry} payment and banking practices

This data will configure:
- Currencies and conversion rate types
- Localization and regional settings
- Bank accounts and payment methods
- Tax regimes and tax rates
- Statutory reporting requirements
"#,
            industry = profile.industry,
            country = profile.country,
        )
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "primaryCurrency",
            "functionalCurrency",
            "reportingCurrency",
            "exchangeRateType",
            "currencyConversionLevel",
        ]
    }

    fn apply_defaults(&self, fields: &mut FieldDefaults<'_>, profile: &CompanyProfile) {
        let company = &profile.company;
        let industry = profile.industry.to_lowercase();
        let country = profile.country.to_uppercase();
        let us = is_us(&country);
        let uk = matches!(country.as_str(), "UK" | "UNITED KINGDOM");

        let currency = currency_for_country(&country).unwrap_or("USD");
        fields.fill("primaryCurrency", currency);
        fields.fill("functionalCurrency", currency);
        fields.fill("reportingCurrency", currency);
        fields.fill(
            "currencyPrecision",
            if matches!(currency, "JPY" | "KRW") { "0" } else { "2" },
        );

        let multi_currency =
            contains_any(&industry, &["multinational", "global", "international"]) || !us;
        fields.fill(
            "multiCurrencyEnabled",
            if multi_currency { "true" } else { "false" },
        );

        fields.fill_group(
            "exchangeRateType",
            &[
                ("exchangeRateType", "Corporate"),
                ("exchangeRateSource", "Manual Entry"),
                ("defaultExchangeRateType", "Corporate"),
            ],
        );

        let revaluation = fields.text("multiCurrencyEnabled");
        fields.fill_group(
            "currencyConversionLevel",
            &[
                ("currencyConversionLevel", "Balance"),
                ("translationMethod", "Current Rate Method"),
                ("revaluationRequired", revaluation.as_str()),
            ],
        );

        for (key, value) in Locale::from_country(&country).settings() {
            fields.fill(key, value);
        }

        let account_name = format!("{} Operating Account", company);
        fields.fill_group(
            "bankAccountNumber",
            &[
                ("bankAccountNumber", "****1234"),
                ("bankAccountName", account_name.as_str()),
                ("bankName", "Primary Bank"),
                ("bankCode", "BANK001"),
            ],
        );

        let payment_methods = if us {
            "ACH|Wire|Check|Credit Card"
        } else if uk {
            "BACS|CHAPS|Faster Payments|Credit Card"
        } else {
            "Wire Transfer|Credit Card|Local Transfer"
        };
        fields.fill("paymentMethods", payment_methods);

        fields.fill_group(
            "cashManagementEnabled",
            &[("cashManagementEnabled", "true"), ("cashPoolingEnabled", "false")],
        );

        if us {
            fields.fill_group(
                "vatGstApplicable",
                &[
                    ("vatGstApplicable", "false"),
                    ("salesTaxApplicable", "true"),
                    ("salesTaxCalculationLevel", "Line"),
                ],
            );
        } else {
            fields.fill_group(
                "vatGstApplicable",
                &[
                    ("vatGstApplicable", "true"),
                    ("standardVatRate", standard_vat_rate(&country)),
                    ("vatCalculationMethod", "Invoice"),
                ],
            );
        }

        let withholding = contains_any(&industry, &["international", "services", "consulting"]);
        fields.fill(
            "withholdingTaxApplicable",
            if withholding { "true" } else { "false" },
        );

        fields.fill_group(
            "taxReportingFrequency",
            &[
                ("taxReportingFrequency", "Monthly"),
                ("taxReportingMethod", "Electronic"),
            ],
        );
        fields.fill_group(
            "statutoryReportingRequired",
            &[
                ("statutoryReportingRequired", "true"),
                ("statutoryReportingFrequency", "Annual"),
            ],
        );
        fields.fill_group(
            "auditTrailRequired",
            &[("auditTrailRequired", "true"), ("dataRetentionPeriod", "7 years")],
        );
        fields.fill("localGaapCompliance", if us { "US GAAP" } else { "IFRS" });

        let localization = if us || uk || country == "CANADA" {
            "MEDIUM"
        } else {
            "HIGH"
        };
        fields.fill("localizationComplexity", localization);

        let multi_currency_complexity = if fields.text("multiCurrencyEnabled") == "true" {
            "HIGH"
        } else {
            "LOW"
        };
        fields.fill("multiCurrencyComplexity", multi_currency_complexity);

        let tax_complexity = if fields.text("vatGstApplicable") == "true"
            || fields.text("withholdingTaxApplicable") == "true"
        {
            "HIGH"
        } else {
            "MEDIUM"
        };
        fields.fill("taxComplexity", tax_complexity);
    }
}
