//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum FactCheckError {
    // 规则相关错误
    #[error("规则加载失败：{0}")]
    RuleLoadError(String),
    #[error("规则解析失败：{0}")]
    RuleParseError(String),

    // 编译相关错误
    #[error("正则编译失败：{0}")]
    RegexCompileError(#[from] RegexError),

    // AI 后端错误（由分类适配器本地恢复，不会抛给调用方）
    #[error("AI后端调用失败：{0}")]
    AiBackendFailure(String),

    // 媒体投递错误（由响应组装器降级为纯文本）
    #[error("媒体投递失败：{0}")]
    MediaDeliveryFailure(String),

    // 视频检测错误
    #[error("无法读取视频帧：{0}")]
    UnreadableMedia(String),
    #[error("图像分类器未返回任何预测结果")]
    NoPrediction,
    #[error("视频分析失败：{0}")]
    VideoError(String),

    // 用户举报相关错误
    #[error("举报内容为空")]
    EmptyReport,
    #[error("举报存储失败：{0}")]
    ReportStoreError(String),

    // 网络相关错误
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("MessagePack序列化/反序列化失败：{0}")]
    MsgPackError(String),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

// 全局Result类型
pub type FcResult<T> = Result<T, FactCheckError>;
