//! AI 模块：生成式后端调用与分类适配
pub mod backend;
pub mod prompt;
pub mod classifier;

pub use self::backend::{ChatBackend, ChatRequest, OpenAiBackend};
pub use self::classifier::{AiClassifier, AiFragment, ClassifyMode, FREEFORM_ERROR_TEXT};
