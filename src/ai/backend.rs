//! 生成式 AI 后端
//! 单次请求-响应调用，无重试；重试如有需要由上层传输层负责

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::GlobalConfig;
use crate::error::{FcResult, FactCheckError};

/// AI 请求：系统指令 + 用户内容
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub instructions: String,
    pub content: String,
}

/// AI 后端抽象（不透明的同步 RPC）
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// 返回后端的单个字符串响应
    async fn complete(&self, request: &ChatRequest) -> FcResult<String>;
}

// ===== OpenAI 兼容接口的线上结构 =====

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI 兼容的聊天补全后端
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiBackend {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>, timeout: Duration) -> FcResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    /// 从全局配置构建
    pub fn from_config(config: &GlobalConfig) -> FcResult<Self> {
        Self::new(
            &config.ai_base_url,
            &config.ai_model,
            config.ai_api_key.clone(),
            Duration::from_secs(config.ai_timeout),
        )
    }

    fn headers(&self) -> FcResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| FactCheckError::InvalidInput(format!("无效API密钥：{}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, request: &ChatRequest) -> FcResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = WireRequest {
            model: &self.model,
            messages: vec![
                WireMessage { role: "system", content: &request.instructions },
                WireMessage { role: "user", content: &request.content },
            ],
            temperature: 0.0,
        };

        debug!("AI请求：模型={}，URL={}", self.model, url);

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(FactCheckError::AiBackendFailure(format!(
                "接口返回状态码 {}：{}",
                status, error_text
            )));
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| FactCheckError::AiBackendFailure(format!("响应解析失败：{}", e)))?;

        wire.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| FactCheckError::AiBackendFailure("响应中没有可用内容".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(uri: &str) -> OpenAiBackend {
        OpenAiBackend::new(uri, "gpt-test", Some("sk-test".to_string()), Duration::from_secs(5)).unwrap()
    }

    fn request() -> ChatRequest {
        ChatRequest {
            instructions: "classify".to_string(),
            content: "ufo sighting".to_string(),
        }
    }

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-test",
                "messages": [
                    {"role": "system", "content": "classify"},
                    {"role": "user", "content": "ufo sighting"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "ConspiracyTheory"}}]
            })))
            .mount(&mock_server)
            .await;

        let content = backend(&mock_server.uri()).complete(&request()).await.unwrap();
        assert_eq!(content, "ConspiracyTheory");
    }

    #[tokio::test]
    async fn test_complete_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let err = backend(&mock_server.uri()).complete(&request()).await.unwrap_err();
        assert!(matches!(err, FactCheckError::AiBackendFailure(_)));
    }

    #[tokio::test]
    async fn test_complete_empty_choices() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&mock_server)
            .await;

        let err = backend(&mock_server.uri()).complete(&request()).await.unwrap_err();
        assert!(matches!(err, FactCheckError::AiBackendFailure(_)));
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = backend(&mock_server.uri()).complete(&request()).await.unwrap_err();
        assert!(matches!(err, FactCheckError::AiBackendFailure(_)));
    }
}
