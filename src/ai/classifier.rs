//! AI 分类适配器
//! 调用失败只记录日志并降级，永远不会把错误抛给调用方

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::backend::{ChatBackend, ChatRequest};
use super::prompt::{CATEGORICAL_INSTRUCTIONS, FREEFORM_INSTRUCTIONS};
use crate::error::{FcResult, FactCheckError};
use crate::rule::Category;
use crate::utils::TextNormalizer;

/// 自由分析模式下调用失败时返回的固定文案
pub const FREEFORM_ERROR_TEXT: &str = "⚠️ AI analysis is unavailable right now. Please try again later.";

/// 分类模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyMode {
    /// 在固定枚举中选择一个分类
    Categorical,
    /// 不分类，只给出简短事实分析
    Freeform,
}

/// AI 分类结果片段
#[derive(Debug, Clone, PartialEq)]
pub enum AiFragment {
    Category(Category),
    Analysis(String),
}

/// AI 分类适配器
#[derive(Clone)]
pub struct AiClassifier {
    backend: Arc<dyn ChatBackend>,
    timeout: Duration,
}

impl AiClassifier {
    pub fn new(backend: Arc<dyn ChatBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// 按模式分类
    pub async fn classify(&self, text: &str, mode: ClassifyMode) -> AiFragment {
        match mode {
            ClassifyMode::Categorical => AiFragment::Category(self.classify_category(text).await),
            ClassifyMode::Freeform => AiFragment::Analysis(self.analyze(text).await),
        }
    }

    /// 分类模式：结果一定属于固定枚举
    /// 无法识别的输出视为 NotFakeNews，调用失败视为 AnalysisError
    pub async fn classify_category(&self, text: &str) -> Category {
        let raw = match self.call(ClassifyMode::Categorical, CATEGORICAL_INSTRUCTIONS.as_str(), text).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(
                    "AI分类调用失败：阶段=categorical，输入={}，错误={}",
                    TextNormalizer::excerpt(text),
                    e
                );
                return Category::AnalysisError;
            }
        };

        let cleaned = TextNormalizer::strip_wrapping(&raw);
        match Category::parse_label(cleaned) {
            Some(category) => {
                debug!("AI分类结果：{}", category.as_str());
                category
            }
            None => {
                warn!(
                    "AI返回了无法识别的分类，按 NotFakeNews 处理：输出={}，输入={}",
                    TextNormalizer::excerpt(&raw),
                    TextNormalizer::excerpt(text)
                );
                Category::NotFakeNews
            }
        }
    }

    /// 自由分析模式：返回原始分析文本，失败时返回固定文案
    pub async fn analyze(&self, text: &str) -> String {
        match self.call(ClassifyMode::Freeform, FREEFORM_INSTRUCTIONS, text).await {
            Ok(analysis) => analysis.trim().to_string(),
            Err(e) => {
                error!(
                    "AI分析调用失败：阶段=freeform，输入={}，错误={}",
                    TextNormalizer::excerpt(text),
                    e
                );
                FREEFORM_ERROR_TEXT.to_string()
            }
        }
    }

    /// 单次后端调用，超时与传输失败同等处理
    async fn call(&self, mode: ClassifyMode, instructions: &str, text: &str) -> FcResult<String> {
        let request = ChatRequest {
            instructions: instructions.to_string(),
            content: text.to_string(),
        };

        match tokio::time::timeout(self.timeout, self.backend.complete(&request)).await {
            Ok(result) => result,
            Err(_) => Err(FactCheckError::AiBackendFailure(format!(
                "{:?} 调用超时（{:?}）",
                mode, self.timeout
            ))),
        }
    }
}
