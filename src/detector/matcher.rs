//! 规则匹配器：按规则表顺序匹配文本，先命中者胜出
use std::sync::Arc;
use tracing::debug;

use crate::compiler::{RuleEntry, RuleTable};
use crate::utils::TextNormalizer;

/// 规则匹配器（无副作用，可并发调用）
#[derive(Debug, Clone)]
pub struct RuleMatcher {
    table: Arc<RuleTable>,
}

impl RuleMatcher {
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<RuleTable> {
        &self.table
    }

    /// 返回第一条命中的规则；无命中返回 None（不是错误）
    pub fn find_match(&self, text: &str) -> Option<&RuleEntry> {
        let normalized = TextNormalizer::normalize(text);

        let hit = self
            .table
            .entries()
            .iter()
            .find(|entry| entry.is_match(&normalized));

        if let Some(entry) = hit {
            debug!(
                "规则命中：分类={}，规则={}，输入={}",
                entry.category.as_str(),
                entry.pattern,
                TextNormalizer::excerpt(text)
            );
        }

        hit
    }
}
