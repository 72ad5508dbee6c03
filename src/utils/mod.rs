//! 工具模块：文本归一化等通用能力
pub mod text;

pub use self::text::TextNormalizer;
