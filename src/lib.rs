//! rsfactcheck - 基于规则与AI的虚假信息及深度伪造检测工具

// 导出全局错误类型
pub use self::error::{FactCheckError, FcResult};

// 导出配置模块
pub use self::config::{GlobalConfig, ConfigManager, CustomConfigBuilder};

// 导出规则模块核心接口
pub use self::rule::{Category, RuleDefinition, RuleLibrary, RuleLoader, RuleFileType};

// 导出编译模块核心接口
pub use self::compiler::{RuleEntry, RuleTable, RuleCompiler};

// 导出AI模块核心接口
pub use self::ai::{AiClassifier, AiFragment, ChatBackend, ClassifyMode, OpenAiBackend};

// 导出响应模块核心接口
pub use self::composer::{
    ClassificationResult, ClassificationSource, DeliveryOutcome, MessageTransport,
    OutboundMessage, ResponseComposer,
};

// 导出视频模块核心接口
pub use self::video::{FrameClassification, FrameClassifier, FfmpegOpener, HttpImageClassifier};

// 导出举报模块核心接口
pub use self::report::{JsonFileReportSink, ReportService, ReportSink};

// 导出检测模块核心接口
pub use self::detector::{FactChecker, RuleMatcher, WELCOME_TEXT};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod utils;
pub mod compiler;
pub mod ai;
pub mod composer;
pub mod video;
pub mod report;
pub mod detector;
