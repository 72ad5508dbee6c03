//! `/report` 命令处理：校验输入后写入举报存储
use tracing::{error, info};

use super::sink::ReportSink;
use crate::composer::OutboundMessage;
use crate::error::{FcResult, FactCheckError};
use crate::utils::TextNormalizer;

pub const REPORT_USAGE_TEXT: &str =
    "⚠️ Please include the message that was classified incorrectly.\nUsage: /report <message>";
pub const REPORT_ACCEPTED_TEXT: &str = "✅ Thanks! Your report has been recorded and will be reviewed.";
pub const REPORT_FAILED_TEXT: &str = "⚠️ Sorry, your report could not be saved. Please try again later.";

/// 举报服务
pub struct ReportService;

impl ReportService {
    /// 校验举报内容：空白输入返回 `EmptyReport`
    pub fn validate(raw_args: &str) -> FcResult<&str> {
        let text = raw_args.trim();
        if text.is_empty() {
            return Err(FactCheckError::EmptyReport);
        }
        Ok(text)
    }

    /// 提交举报并生成面向用户的回复；空白输入不会触碰存储
    pub async fn submit(sink: &dyn ReportSink, raw_args: &str) -> OutboundMessage {
        let text = match Self::validate(raw_args) {
            Ok(text) => text,
            Err(_) => return OutboundMessage::text(REPORT_USAGE_TEXT),
        };

        match sink.append(text).await {
            Ok(()) => {
                info!("收到误判举报：{}", TextNormalizer::excerpt(text));
                OutboundMessage::text(REPORT_ACCEPTED_TEXT)
            }
            Err(e) => {
                error!("举报写入失败：输入={}，错误={}", TextNormalizer::excerpt(text), e);
                OutboundMessage::text(REPORT_FAILED_TEXT)
            }
        }
    }
}
