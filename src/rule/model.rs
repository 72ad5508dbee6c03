//! 规则数据模型定义
//! 仅存储规则数据，无任何业务逻辑，支持序列化/反序列化

use std::fmt;
use serde::{Deserialize, Serialize};

/// 虚假信息分类（封闭枚举）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    ConspiracyTheory,
    FakeHealthNews,
    AIGeneratedMisinformation,
    FakeScienceClaim,
    PoliticalMisinformation,
    OldNewsReused,
    ClickbaitFakeNews,
    /// 终态：未检测到虚假信息
    NotFakeNews,
    /// 终态：分析失败
    AnalysisError,
}

impl Category {
    /// 可由 AI 后端返回的标签（含 NotFakeNews，不含 AnalysisError）
    pub const PROMPT_LABELS: [Category; 8] = [
        Category::ConspiracyTheory,
        Category::FakeHealthNews,
        Category::AIGeneratedMisinformation,
        Category::FakeScienceClaim,
        Category::PoliticalMisinformation,
        Category::OldNewsReused,
        Category::ClickbaitFakeNews,
        Category::NotFakeNews,
    ];

    /// 枚举标识（与序列化格式一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ConspiracyTheory => "ConspiracyTheory",
            Category::FakeHealthNews => "FakeHealthNews",
            Category::AIGeneratedMisinformation => "AIGeneratedMisinformation",
            Category::FakeScienceClaim => "FakeScienceClaim",
            Category::PoliticalMisinformation => "PoliticalMisinformation",
            Category::OldNewsReused => "OldNewsReused",
            Category::ClickbaitFakeNews => "ClickbaitFakeNews",
            Category::NotFakeNews => "NotFakeNews",
            Category::AnalysisError => "AnalysisError",
        }
    }

    /// 面向用户的展示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::ConspiracyTheory => "Conspiracy Theory",
            Category::FakeHealthNews => "Fake Health News",
            Category::AIGeneratedMisinformation => "AI-Generated Misinformation",
            Category::FakeScienceClaim => "Fake Science Claim",
            Category::PoliticalMisinformation => "Political Misinformation",
            Category::OldNewsReused => "Old News Reused",
            Category::ClickbaitFakeNews => "Clickbait & Fake News",
            Category::NotFakeNews => "Not Fake News",
            Category::AnalysisError => "Analysis Error",
        }
    }

    /// 是否为真实命中的分类（非终态）
    pub fn is_genuine(&self) -> bool {
        !matches!(self, Category::NotFakeNews | Category::AnalysisError)
    }

    /// 宽松解析 AI 返回的标签：忽略大小写、空白与标点
    /// 仅识别 PROMPT_LABELS 中的标签，其它输出返回 None
    pub fn parse_label(raw: &str) -> Option<Category> {
        let key = fold_label(raw);
        if key.is_empty() {
            return None;
        }

        Self::PROMPT_LABELS.iter().copied().find(|category| {
            fold_label(category.as_str()) == key || fold_label(category.display_name()) == key
        })
    }
}

fn fold_label(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// 原始规则定义（从 JSON / MessagePack 解析）
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RuleDefinition {
    /// 匹配表达式：以 `|` 分隔的短语（正则语法）
    pub pattern: String,
    pub category: Category,
    /// 配图地址
    #[serde(alias = "meme")]
    pub media_ref: String,
    /// 固定回复
    #[serde(alias = "text")]
    pub canonical_reply: String,
}

/// 完整规则库（顺序即优先级）
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(transparent)]
pub struct RuleLibrary {
    pub rules: Vec<RuleDefinition>,
}
