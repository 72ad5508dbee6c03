//! 响应模块：结果合并、消息组装与投递降级
pub mod message;
pub mod transport;
pub mod composer;

pub use self::message::{ClassificationResult, ClassificationSource, OutboundMessage};
pub use self::transport::MessageTransport;
pub use self::composer::{
    DeliveryOutcome, ResponseComposer, ANALYSIS_ERROR_TEXT, MEDIA_FALLBACK_PREFIX, NO_CATEGORY_TEXT,
};
