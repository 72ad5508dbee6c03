//! 单帧深度伪造检测
//! 只取视频第一帧可解码画面，以该帧得分代表整段视频（不做时序分析）

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use image::RgbImage;
use tracing::{debug, info};

use super::capture::{CaptureGuard, FfmpegOpener, VideoOpener};
use super::inference::{HttpImageClassifier, ImageClassifier};
use crate::config::GlobalConfig;
use crate::error::{FcResult, FactCheckError};

/// 单帧分类结果
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClassification {
    pub label: String,
    /// 取值范围 [0, 1]
    pub confidence: f32,
}

impl fmt::Display for FrameClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deepfake Detection: {} ({:.2}% confidence)", self.label, self.confidence * 100.0)
    }
}

/// 帧分类器
#[derive(Clone)]
pub struct FrameClassifier {
    opener: Arc<dyn VideoOpener>,
    classifier: Arc<dyn ImageClassifier>,
    timeout: Duration,
}

impl FrameClassifier {
    pub fn new(opener: Arc<dyn VideoOpener>, classifier: Arc<dyn ImageClassifier>, timeout: Duration) -> Self {
        Self { opener, classifier, timeout }
    }

    /// 从全局配置构建（ffmpeg + HTTP 推理接口）
    pub fn from_config(config: &GlobalConfig) -> FcResult<Self> {
        Ok(Self::new(
            Arc::new(FfmpegOpener::new(
                config.ffmpeg_path.clone(),
                Duration::from_secs(config.frame_timeout),
            )),
            Arc::new(HttpImageClassifier::from_config(config)?),
            Duration::from_secs(config.frame_timeout),
        ))
    }

    /// 检测视频
    pub async fn classify_video(&self, video_path: &Path) -> FcResult<FrameClassification> {
        let opener = self.opener.clone();
        let path: PathBuf = video_path.to_path_buf();

        // 解码属于阻塞操作，放到阻塞线程池执行，并与推理共用同一超时
        let extraction = tokio::task::spawn_blocking(move || Self::extract_first_frame(opener.as_ref(), &path));
        let frame = tokio::time::timeout(self.timeout, extraction)
            .await
            .map_err(|_| FactCheckError::VideoError(format!("视频帧提取超时（{:?}）", self.timeout)))?
            .map_err(|e| FactCheckError::VideoError(format!("帧提取任务异常：{}", e)))??;

        debug!("视频帧提取成功：{}，尺寸={}x{}", video_path.display(), frame.width(), frame.height());

        let predictions = tokio::time::timeout(self.timeout, self.classifier.classify(&frame))
            .await
            .map_err(|_| FactCheckError::VideoError(format!("图像分类超时（{:?}）", self.timeout)))??;

        let top = predictions.into_iter().next().ok_or(FactCheckError::NoPrediction)?;
        let confidence = if top.score.is_finite() { top.score.clamp(0.0, 1.0) } else { 0.0 };

        info!("视频检测完成：{}，标签={}，置信度={:.4}", video_path.display(), top.label, confidence);
        Ok(FrameClassification {
            label: top.label,
            confidence,
        })
    }

    /// 打开视频并读取第一帧，读取完成后立即释放资源
    fn extract_first_frame(opener: &dyn VideoOpener, path: &Path) -> FcResult<RgbImage> {
        let mut guard = CaptureGuard::open(opener, path)?;
        let frame = guard.first_frame();
        guard.release();

        // 统一转换为分类器所需的 RGB8
        Ok(frame?.to_rgb8())
    }
}
