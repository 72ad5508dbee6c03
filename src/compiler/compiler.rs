//! 规则编译器核心
//! 仅负责将原始规则编译为带词边界的可执行正则

use std::time::Instant;
use regex::{Regex, RegexBuilder};
use tracing::debug;
use url::Url;

use super::pattern::{RuleEntry, RuleTable};
use crate::rule::{Category, RuleDefinition, RuleLibrary};
use crate::error::{FcResult, FactCheckError};
use crate::utils::TextNormalizer;

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// 编译规则库，任意一条规则非法即整体失败
    pub fn compile(rule_lib: &RuleLibrary) -> FcResult<RuleTable> {
        let start = Instant::now();
        let mut entries = Vec::with_capacity(rule_lib.rules.len());

        for (index, definition) in rule_lib.rules.iter().enumerate() {
            let entry = Self::compile_rule(definition).map_err(|e| {
                FactCheckError::RuleParseError(format!("第{}条规则（{}）非法：{}", index + 1, definition.pattern, e))
            })?;
            entries.push(entry);
        }

        debug!("✅ 规则编译完成，共{}条，耗时{:?}", entries.len(), start.elapsed());
        Ok(RuleTable::new(entries))
    }

    /// 编译单条规则
    fn compile_rule(definition: &RuleDefinition) -> FcResult<RuleEntry> {
        if !definition.category.is_genuine() {
            return Err(FactCheckError::InvalidInput(format!(
                "规则分类不能是终态分类 {}",
                definition.category.as_str()
            )));
        }

        let pattern = Self::normalize_pattern(&definition.pattern)?;
        let regex = Self::compile_bounded(&pattern)?;
        let media_ref = Url::parse(definition.media_ref.trim())?;

        if definition.canonical_reply.trim().is_empty() {
            return Err(FactCheckError::InvalidInput("固定回复不能为空".to_string()));
        }

        Ok(RuleEntry {
            pattern,
            regex,
            category: definition.category,
            media_ref,
            canonical_reply: definition.canonical_reply.clone(),
        })
    }

    /// 归一化表达式：只折叠排版引号并去掉空分支，大小写交给 `case_insensitive` 处理
    fn normalize_pattern(raw_pattern: &str) -> FcResult<String> {
        let normalized = TextNormalizer::fold_quote_marks(raw_pattern);
        let alternatives: Vec<&str> = normalized
            .split('|')
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .collect();

        if alternatives.is_empty() {
            return Err(FactCheckError::InvalidInput("匹配表达式为空".to_string()));
        }

        Ok(alternatives.join("|"))
    }

    /// 为整组候选短语加上词边界：短语两侧必须是文本边缘或非单词字符
    /// 例："5g" 不会命中 "5gram"
    pub fn compile_bounded(pattern: &str) -> FcResult<Regex> {
        let bounded = format!(r"(?:^|\W)(?:{})(?:\W|$)", pattern);
        let regex = RegexBuilder::new(&bounded)
            .case_insensitive(true)
            .build()?;
        Ok(regex)
    }
}

/// 便于测试与外部构建规则表的辅助函数
pub fn rule_definition(pattern: &str, category: Category, media_ref: &str, reply: &str) -> RuleDefinition {
    RuleDefinition {
        pattern: pattern.to_string(),
        category,
        media_ref: media_ref.to_string(),
        canonical_reply: reply.to_string(),
    }
}
