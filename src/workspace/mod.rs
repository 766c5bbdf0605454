//! 公司工作区：搜索缓存、phase输出、合并档案与导出文件的磁盘布局

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::Config;

/// 一个公司的磁盘工作区
///
/// ```text
/// {search_results_dir}/{slug}/phase{N}/search.json
/// {search_results_dir}/{slug}/phase{N}/phase{N}_extracted_data.json
/// {output_path}/{slug}/phase{N}.json
/// {output_path}/{slug}/consolidated.json
/// {output_path}/{slug}/filled_questionnaire.json
/// {output_path}/{slug}/conversation_{session}.json
/// ```
#[derive(Debug, Clone)]
pub struct CompanyWorkspace {
    slug: String,
    search_root: PathBuf,
    output_root: PathBuf,
}

impl CompanyWorkspace {
    pub fn new(config: &Config) -> Self {
        let slug = config.company_slug();
        Self {
            search_root: config.research.search_results_dir.join(&slug),
            output_root: config.output_path.join(&slug),
            slug,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn phase_search_dir(&self, phase: u8) -> PathBuf {
        self.search_root.join(format!("phase{}", phase))
    }

    pub fn search_results_path(&self, phase: u8) -> PathBuf {
        self.phase_search_dir(phase).join("search.json")
    }

    pub fn extracted_data_path(&self, phase: u8) -> PathBuf {
        self.phase_search_dir(phase)
            .join(format!("phase{}_extracted_data.json", phase))
    }

    pub fn phase_output_path(&self, phase: u8) -> PathBuf {
        self.output_root.join(format!("phase{}.json", phase))
    }

    pub fn consolidated_path(&self) -> PathBuf {
        self.output_root.join("consolidated.json")
    }

    pub fn questionnaire_path(&self) -> PathBuf {
        self.output_root.join("filled_questionnaire.json")
    }

    pub fn transcript_path(&self, session_id: &str) -> PathBuf {
        self.output_root
            .join(format!("conversation_{}.json", session_id))
    }

    /// 读取JSON文件；文件不存在时返回None
    pub async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let data = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(data))
    }

    /// 以缩进格式写入JSON文件，自动创建父目录
    pub async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, data: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(data)?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("💾 已写入 {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn workspace_in(dir: &TempDir) -> CompanyWorkspace {
        let mut config = Config {
            company: "Test Corp".to_string(),
            output_path: dir.path().join("output"),
            ..Default::default()
        };
        config.research.search_results_dir = dir.path().join("search_results");
        CompanyWorkspace::new(&config)
    }

    #[test]
    fn test_workspace_layout() {
        let dir = TempDir::new().unwrap();
        let workspace = workspace_in(&dir);

        assert_eq!(workspace.slug(), "test_corp");
        assert_eq!(
            workspace.search_results_path(3),
            dir.path().join("search_results/test_corp/phase3/search.json")
        );
        assert_eq!(
            workspace.extracted_data_path(3),
            dir.path()
                .join("search_results/test_corp/phase3/phase3_extracted_data.json")
        );
        assert_eq!(
            workspace.phase_output_path(9),
            dir.path().join("output/test_corp/phase9.json")
        );
        assert_eq!(
            workspace.consolidated_path(),
            dir.path().join("output/test_corp/consolidated.json")
        );
        assert_eq!(
            workspace.transcript_path("abc"),
            dir.path().join("output/test_corp/conversation_abc.json")
        );
    }

    #[tokio::test]
    async fn test_json_round_trip_creates_directories() {
        let dir = TempDir::new().unwrap();
        let workspace = workspace_in(&dir);
        let path = workspace.consolidated_path();

        let missing: Option<Value> = workspace.read_json(&path).await.unwrap();
        assert!(missing.is_none());

        workspace
            .write_json(&path, &json!({"companyProfile": {"companyName": "Test Corp"}}))
            .await
            .unwrap();

        let loaded: Value = workspace.read_json(&path).await.unwrap().unwrap();
        assert_eq!(loaded["companyProfile"]["companyName"], json!("Test Corp"));
    }

    #[tokio::test]
    async fn test_read_invalid_json_is_error() {
        let dir = TempDir::new().unwrap();
        let workspace = workspace_in(&dir);
        let path = workspace.phase_output_path(1);

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        assert!(workspace.read_json::<Value>(&path).await.is_err());
    }
}
