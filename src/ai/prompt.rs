//! AI 提示词构建
use once_cell::sync::Lazy;

use crate::rule::Category;

/// 分类模式系统指令（枚举列表固定写入提示词）
pub static CATEGORICAL_INSTRUCTIONS: Lazy<String> = Lazy::new(|| {
    let labels = Category::PROMPT_LABELS
        .iter()
        .map(|category| format!("- {}", category.as_str()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a fact-checking assistant. Classify the user's message into exactly one of the \
         following misinformation categories:\n{}\n\
         Reply with the category label only, exactly as written above. \
         If the message does not contain misinformation, reply with NotFakeNews.",
        labels
    )
});

/// 自由分析模式系统指令
pub const FREEFORM_INSTRUCTIONS: &str =
    "You are a fact-checking assistant. Write a short, factual analysis (at most three sentences) \
     of the user's message: point out any misleading or unsupported claims and what is actually known. \
     Do not assign a category label.";
