//! 图像分类推理
//! 请求为单帧图像，响应为按得分排序的 {label, score} 列表

use std::io::Cursor;
use std::time::Duration;
use async_trait::async_trait;
use image::{ImageFormat, RgbImage};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GlobalConfig;
use crate::error::{FcResult, FactCheckError};

/// 单个预测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// 图像分类器抽象
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// 返回有序预测列表，调用方只使用第一项
    async fn classify(&self, frame: &RgbImage) -> FcResult<Vec<Prediction>>;
}

/// HTTP 推理接口（Hugging Face Inference API 格式）
#[derive(Debug, Clone)]
pub struct HttpImageClassifier {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpImageClassifier {
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> FcResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            token,
        })
    }

    pub fn from_config(config: &GlobalConfig) -> FcResult<Self> {
        Self::new(
            &config.frame_model_url,
            config.frame_api_token.clone(),
            Duration::from_secs(config.frame_timeout),
        )
    }

    /// 将帧编码为 PNG
    fn encode_png(frame: &RgbImage) -> FcResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        frame
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| FactCheckError::VideoError(format!("帧编码失败：{}", e)))?;
        Ok(buffer.into_inner())
    }
}

#[async_trait]
impl ImageClassifier for HttpImageClassifier {
    async fn classify(&self, frame: &RgbImage) -> FcResult<Vec<Prediction>> {
        let body = Self::encode_png(frame)?;
        debug!("图像分类请求：URL={}，帧尺寸={}x{}，PNG大小={}字节", self.endpoint, frame.width(), frame.height(), body.len());

        let mut request = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "image/png")
            .body(body);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(FactCheckError::VideoError(format!(
                "图像分类接口返回状态码 {}：{}",
                status, error_text
            )));
        }

        response
            .json::<Vec<Prediction>>()
            .await
            .map_err(|e| FactCheckError::VideoError(format!("图像分类响应解析失败：{}", e)))
    }
}
