//! 举报存储
//! 只追加的日志式存储；读-改-写之间不做跨请求原子保护

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FcResult, FactCheckError};

/// 单条举报（时间顺序由追加顺序隐含）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub text: String,
}

/// 举报存储接口
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// 追加一条举报
    async fn append(&self, raw_text: &str) -> FcResult<()>;
}

/// JSON 文件举报存储
#[derive(Debug, Clone)]
pub struct JsonFileReportSink {
    path: PathBuf,
}

impl JsonFileReportSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取全部举报；文件不存在或内容损坏时视为空集合
    pub async fn load(&self) -> Vec<Report> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) => {
                debug!("举报存储不可读，视为空：{}，{}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<Report>>(&data) {
            Ok(reports) => reports,
            Err(e) => {
                warn!("举报存储内容损坏，按空集合继续：{}，{}", self.path.display(), e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ReportSink for JsonFileReportSink {
    async fn append(&self, raw_text: &str) -> FcResult<()> {
        let mut reports = self.load().await;
        reports.push(Report {
            text: raw_text.to_string(),
        });

        let data = serde_json::to_vec_pretty(&reports)?;
        tokio::fs::write(&self.path, data).await.map_err(|e| {
            FactCheckError::ReportStoreError(format!("写入 {} 失败：{}", self.path.display(), e))
        })?;

        debug!("举报已写入：{}，当前共{}条", self.path.display(), reports.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_preserves_prior_entries() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileReportSink::new(dir.path().join("reports.json"));

        sink.append("first").await.unwrap();
        sink.append("second").await.unwrap();

        let reports = sink.load().await;
        assert_eq!(
            reports,
            vec![
                Report { text: "first".to_string() },
                Report { text: "second".to_string() }
            ]
        );
    }

    #[tokio::test]
    async fn test_corrupt_store_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.json");
        tokio::fs::write(&path, b"{ definitely not a list").await.unwrap();

        let sink = JsonFileReportSink::new(path);
        sink.append("after corruption").await.unwrap();

        assert_eq!(sink.load().await, vec![Report { text: "after corruption".to_string() }]);
    }

    #[tokio::test]
    async fn test_unwritable_store_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileReportSink::new(dir.path().join("missing-dir").join("reports.json"));

        let err = sink.append("lost").await.unwrap_err();
        assert!(matches!(err, FactCheckError::ReportStoreError(_)));
    }
}
