//! 分类结果与出站消息模型

use std::fmt;
use url::Url;

use crate::rule::Category;

/// 分类结果来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    RuleMatch,
    AIClassifier,
    /// 仅有 AI 自由分析（`FactChecker::explain_text`，或调用 `merge` 时未给出分类）
    AIFreeform,
}

/// 单次请求的分类结果（每次请求新建，不缓存）
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub category: Category,
    pub media_ref: Option<Url>,
    pub canonical_reply: Option<String>,
    pub ai_analysis: Option<String>,
    pub source: ClassificationSource,
}

/// 出站消息：带配图的说明文字，或纯文本
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Photo { caption: String, media_ref: Url },
    Text { text: String },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        OutboundMessage::Text { text: text.into() }
    }

    /// 消息主体文字（说明文字或正文）
    pub fn body(&self) -> &str {
        match self {
            OutboundMessage::Photo { caption, .. } => caption,
            OutboundMessage::Text { text } => text,
        }
    }

    pub fn media_ref(&self) -> Option<&Url> {
        match self {
            OutboundMessage::Photo { media_ref, .. } => Some(media_ref),
            OutboundMessage::Text { .. } => None,
        }
    }
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundMessage::Photo { caption, media_ref } => write!(f, "{}\n🖼️ {}", caption, media_ref),
            OutboundMessage::Text { text } => write!(f, "{}", text),
        }
    }
}
