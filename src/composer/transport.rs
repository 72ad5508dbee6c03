//! 传输层接口
//! 实际收发由外部传输层实现，这里只约定投递结果的回传方式

use async_trait::async_trait;
use url::Url;

use crate::error::FcResult;

/// 消息传输层
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// 发送带配图的消息；失败时应返回 `MediaDeliveryFailure`
    async fn send_photo(&self, media_ref: &Url, caption: &str) -> FcResult<()>;

    /// 发送纯文本消息
    async fn send_text(&self, text: &str) -> FcResult<()>;
}
