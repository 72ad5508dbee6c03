//! 检测模块：规则匹配与完整检测流程
pub mod matcher;
pub mod detector;

// 导出核心接口
pub use self::matcher::RuleMatcher;
pub use self::detector::{
    FactChecker,
    WELCOME_TEXT,
    UNREADABLE_VIDEO_TEXT,
    NO_PREDICTION_TEXT,
    VIDEO_FAILED_TEXT,
};
