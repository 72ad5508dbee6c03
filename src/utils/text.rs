//! 文本处理工具
//! 负责输入文本归一化、日志摘录截断以及 AI 输出清洗

/// 日志中保留的输入摘录最大字节数
pub const EXCERPT_MAX_BYTES: usize = 80;

/// 文本归一化工具
pub struct TextNormalizer;

impl TextNormalizer {
    /// 转为小写，并把排版引号折叠为 ASCII 引号
    pub fn normalize(text: &str) -> String {
        Self::fold_quotes(text).flat_map(char::to_lowercase).collect()
    }

    /// 仅折叠排版引号，不改变大小写（用于正则表达式，避免 `\S` 变成 `\s`）
    pub fn fold_quote_marks(text: &str) -> String {
        Self::fold_quotes(text).collect()
    }

    fn fold_quotes(text: &str) -> impl Iterator<Item = char> + '_ {
        text.chars().map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02BC}' | '`' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            other => other,
        })
    }

    /// 在字符边界处截断到最多 `max_bytes` 字节
    pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
        if s.len() <= max_bytes {
            return s;
        }
        let mut end = max_bytes;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }

    /// 生成日志用输入摘录（单行）
    pub fn excerpt(text: &str) -> String {
        let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let cut = Self::truncate_to_char_boundary(&flat, EXCERPT_MAX_BYTES);
        if cut.len() < flat.len() {
            format!("{}…", cut)
        } else {
            flat
        }
    }

    /// 去除 AI 输出外层的代码块与引号
    pub fn strip_wrapping(response: &str) -> &str {
        response
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```text")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
            .trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_folds_quotes() {
        assert_eq!(TextNormalizer::normalize("They DON\u{2019}T Want"), "they don't want");
        assert_eq!(TextNormalizer::normalize("\u{201C}UFO\u{201D}"), "\"ufo\"");
    }

    #[test]
    fn test_fold_quote_marks_keeps_case() {
        assert_eq!(TextNormalizer::fold_quote_marks("Don\u{2019}t \\S+"), "Don't \\S+");
    }

    #[test]
    fn test_truncate_to_char_boundary() {
        let text = "Hello 世界";
        let truncated = TextNormalizer::truncate_to_char_boundary(text, 8);
        assert!(truncated.len() <= 8);
        assert!(text.starts_with(truncated));
        assert_eq!(TextNormalizer::truncate_to_char_boundary("Hello", 100), "Hello");
    }

    #[test]
    fn test_excerpt_flattens_and_marks_cut() {
        assert_eq!(TextNormalizer::excerpt("a\n  b\tc"), "a b c");
        let long = "word ".repeat(40);
        let excerpt = TextNormalizer::excerpt(&long);
        assert!(excerpt.ends_with('…'));
        assert!(excerpt.len() <= EXCERPT_MAX_BYTES + '…'.len_utf8());
    }

    #[test]
    fn test_strip_wrapping() {
        assert_eq!(TextNormalizer::strip_wrapping("```\nConspiracyTheory\n```"), "ConspiracyTheory");
        assert_eq!(TextNormalizer::strip_wrapping("  \"NotFakeNews\" "), "NotFakeNews");
        assert_eq!(TextNormalizer::strip_wrapping("FakeHealthNews"), "FakeHealthNews");
    }
}
