use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 合并后的公司档案：section名 -> 扁平字段表
pub type ConsolidatedProfile = Map<String, Value>;

/// 用户输入的公司基本信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyProfile {
    pub company: String,
    pub industry: String,
    pub country: String,
}

impl CompanyProfile {
    pub fn new(
        company: impl Into<String>,
        industry: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            company: company.into(),
            industry: industry.into(),
            country: country.into(),
        }
    }

    /// 行业，为空时返回给定的默认值
    pub fn industry_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.industry.trim().is_empty() {
            default
        } else {
            &self.industry
        }
    }

    /// 国家，为空时返回给定的默认值
    pub fn country_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.country.trim().is_empty() {
            default
        } else {
            &self.country
        }
    }
}

impl From<&crate::config::Config> for CompanyProfile {
    fn from(config: &crate::config::Config) -> Self {
        Self::new(&config.company, &config.industry, &config.country)
    }
}
