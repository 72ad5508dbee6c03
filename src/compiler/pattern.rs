//! 编译后规则模型
//! 正则编译后的结构，加载后只读

use regex::Regex;
use url::Url;

use crate::rule::Category;

/// 编译后的规则条目
#[derive(Debug, Clone)]
pub struct RuleEntry {
    /// 原始匹配表达式（归一化后）
    pub pattern: String,
    /// 带词边界的编译结果
    pub regex: Regex,
    pub category: Category,
    pub media_ref: Url,
    pub canonical_reply: String,
}

impl RuleEntry {
    /// 对已归一化文本做匹配判断
    pub fn is_match(&self, normalized_text: &str) -> bool {
        self.regex.is_match(normalized_text)
    }
}

/// 编译后的规则表（顺序即优先级，先命中者胜出）
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    entries: Vec<RuleEntry>,
}

impl RuleTable {
    pub fn new(entries: Vec<RuleEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 查找某分类的第一条规则（用于为 AI 分类结果补充配图与回复）
    pub fn lookup_category(&self, category: Category) -> Option<&RuleEntry> {
        self.entries.iter().find(|entry| entry.category == category)
    }
}
