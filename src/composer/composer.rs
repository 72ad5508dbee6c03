//! 响应组装器：合并规则与 AI 结果，生成出站消息，并负责配图失败时的纯文本降级
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::message::{ClassificationResult, ClassificationSource, OutboundMessage};
use super::transport::MessageTransport;
use crate::compiler::{RuleEntry, RuleTable};
use crate::error::FcResult;
use crate::rule::Category;

/// 未检测到虚假信息
pub const NO_CATEGORY_TEXT: &str = "🤖 No fake news detected! Keep spreading facts.";
/// 分类失败
pub const ANALYSIS_ERROR_TEXT: &str = "⚠️ Sorry, I couldn't analyze this message right now. Please try again later.";
/// 配图发送失败时的前缀
pub const MEDIA_FALLBACK_PREFIX: &str = "⚠️ Error sending meme. Here’s the text instead:";

/// 投递结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 按原样投递
    Delivered,
    /// 配图失败，已降级为纯文本
    FellBackToText,
}

/// 响应组装器
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    table: Arc<RuleTable>,
}

impl ResponseComposer {
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self { table }
    }

    /// 合并规则命中结果与 AI 结果
    /// 规则命中具有最终决定权，AI 分析仅作补充
    pub fn merge(
        &self,
        rule: Option<&RuleEntry>,
        ai_category: Option<Category>,
        ai_analysis: Option<String>,
    ) -> ClassificationResult {
        if let Some(entry) = rule {
            return ClassificationResult {
                category: entry.category,
                media_ref: Some(entry.media_ref.clone()),
                canonical_reply: Some(entry.canonical_reply.clone()),
                ai_analysis,
                source: ClassificationSource::RuleMatch,
            };
        }

        let Some(category) = ai_category else {
            return ClassificationResult {
                category: Category::NotFakeNews,
                media_ref: None,
                canonical_reply: None,
                ai_analysis,
                source: ClassificationSource::AIFreeform,
            };
        };

        // AI 给出真实分类时，从规则表取该分类的配图与固定回复
        let template = if category.is_genuine() {
            self.table.lookup_category(category)
        } else {
            None
        };

        ClassificationResult {
            category,
            media_ref: template.map(|entry| entry.media_ref.clone()),
            canonical_reply: template.map(|entry| entry.canonical_reply.clone()),
            ai_analysis,
            source: ClassificationSource::AIClassifier,
        }
    }

    /// 生成出站消息（保证非空）
    pub fn compose(&self, result: &ClassificationResult) -> OutboundMessage {
        let body = Self::render(result);

        match (&result.media_ref, result.category.is_genuine()) {
            (Some(media_ref), true) => OutboundMessage::Photo {
                caption: body,
                media_ref: media_ref.clone(),
            },
            _ => OutboundMessage::Text { text: body },
        }
    }

    /// 渲染消息文字
    fn render(result: &ClassificationResult) -> String {
        let analysis = result
            .ai_analysis
            .as_deref()
            .map(str::trim)
            .filter(|analysis| !analysis.is_empty());

        match result.category {
            Category::AnalysisError => ANALYSIS_ERROR_TEXT.to_string(),
            Category::NotFakeNews => match analysis {
                Some(analysis) => format!("{}\n\n🧠 AI Insights: {}", NO_CATEGORY_TEXT, analysis),
                None => NO_CATEGORY_TEXT.to_string(),
            },
            category => {
                let mut body = format!("📚 Fake News Analysis\n\n🟠 Category: {}", category.display_name());
                if let Some(reply) = result.canonical_reply.as_deref().filter(|r| !r.trim().is_empty()) {
                    body.push_str(&format!("\n💬 Response: {}", reply));
                }
                if let Some(analysis) = analysis {
                    body.push_str(&format!("\n🧠 AI Insights: {}", analysis));
                }
                body
            }
        }
    }

    /// 配图投递失败时的纯文本降级消息，保留全部分类内容
    pub fn text_fallback(message: &OutboundMessage) -> OutboundMessage {
        match message {
            OutboundMessage::Photo { caption, .. } => {
                OutboundMessage::text(format!("{}\n\n{}", MEDIA_FALLBACK_PREFIX, caption))
            }
            OutboundMessage::Text { text } => OutboundMessage::text(text.clone()),
        }
    }

    /// 投递消息：配图失败必须降级为纯文本，不允许静默丢弃分类结果
    pub async fn deliver(
        transport: &dyn MessageTransport,
        message: &OutboundMessage,
    ) -> FcResult<DeliveryOutcome> {
        match message {
            OutboundMessage::Text { text } => {
                transport.send_text(text).await?;
                Ok(DeliveryOutcome::Delivered)
            }
            OutboundMessage::Photo { caption, media_ref } => {
                match transport.send_photo(media_ref, caption).await {
                    Ok(()) => {
                        debug!("配图消息投递成功：{}", media_ref);
                        Ok(DeliveryOutcome::Delivered)
                    }
                    Err(e) => {
                        warn!("配图投递失败，降级为纯文本：媒体={}，错误={}", media_ref, e);
                        let fallback = Self::text_fallback(message);
                        transport.send_text(fallback.body()).await.map_err(|text_err| {
                            error!("纯文本降级投递也失败：{}", text_err);
                            text_err
                        })?;
                        Ok(DeliveryOutcome::FellBackToText)
                    }
                }
            }
        }
    }
}
