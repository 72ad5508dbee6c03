//! 规则加载管理器
//! 负责从内置规则、本地 JSON 或 MessagePack 文件加载规则库

use std::path::Path;
use tracing::debug;

use super::model::RuleLibrary;
use crate::error::{FcResult, FactCheckError};
use crate::config::GlobalConfig;

/// 内置规则表（九条规则，顺序即优先级）
const EMBEDDED_RULES: &str = include_str!("../../data/default_rules.json");

/// 规则文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFileType {
    /// JSON 数组
    Json,
    /// MessagePack 序列化的规则库
    MsgPack,
}

impl RuleFileType {
    /// 根据扩展名推断规则文件类型
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(RuleFileType::Json),
            "mp" | "msgpack" => Some(RuleFileType::MsgPack),
            _ => None,
        }
    }
}

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 加载规则库（配置了路径则读取本地文件，否则使用内置规则）
    pub async fn load(config: &GlobalConfig) -> FcResult<RuleLibrary> {
        let Some(path) = &config.rule_path else {
            let rule_lib = Self::load_embedded()?;
            debug!("使用内置规则库，规则数：{}", rule_lib.rules.len());
            return Ok(rule_lib);
        };

        let rule_lib = Self::load_from_file(path).await?;
        debug!("从 {} 加载规则库成功，规则数：{}", path.display(), rule_lib.rules.len());
        Ok(rule_lib)
    }

    /// 解析内置规则表
    pub fn load_embedded() -> FcResult<RuleLibrary> {
        Self::parse(EMBEDDED_RULES.as_bytes(), RuleFileType::Json)
    }

    /// 从本地文件加载规则库
    pub async fn load_from_file(path: &Path) -> FcResult<RuleLibrary> {
        let rule_type = RuleFileType::from_path(path).ok_or_else(|| {
            FactCheckError::RuleLoadError(format!("不支持的规则文件类型：{}", path.display()))
        })?;

        let data = tokio::fs::read(path).await.map_err(|e| {
            FactCheckError::RuleLoadError(format!("读取规则文件 {} 失败：{}", path.display(), e))
        })?;

        Self::parse(&data, rule_type)
    }

    /// 按文件类型解析规则数据
    pub fn parse(data: &[u8], rule_type: RuleFileType) -> FcResult<RuleLibrary> {
        let rule_lib: RuleLibrary = match rule_type {
            RuleFileType::Json => serde_json::from_slice(data)
                .map_err(|e| FactCheckError::RuleParseError(format!("JSON规则解析失败：{}", e)))?,
            RuleFileType::MsgPack => rmp_serde::from_slice(data)
                .map_err(|e| FactCheckError::MsgPackError(format!("反序列化失败：{}", e)))?,
        };

        if rule_lib.rules.is_empty() {
            return Err(FactCheckError::RuleLoadError("规则库为空".to_string()));
        }

        Ok(rule_lib)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::rule::model::Category;
    use std::io::Write;

    #[test]
    fn test_embedded_rules_keep_declared_order() {
        let rule_lib = RuleLoader::load_embedded().unwrap();
        assert_eq!(rule_lib.rules.len(), 9);
        assert_eq!(rule_lib.rules[0].category, Category::ConspiracyTheory);
        assert_eq!(rule_lib.rules[8].category, Category::ClickbaitFakeNews);
    }

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(RuleFileType::from_path(Path::new("rules.JSON")), Some(RuleFileType::Json));
        assert_eq!(RuleFileType::from_path(Path::new("rules.mp")), Some(RuleFileType::MsgPack));
        assert_eq!(RuleFileType::from_path(Path::new("rules.yaml")), None);
        assert_eq!(RuleFileType::from_path(Path::new("rules")), None);
    }

    #[tokio::test]
    async fn test_load_msgpack_file() {
        // 内置规则序列化为 MessagePack 后重新加载
        let rule_lib = RuleLoader::load_embedded().unwrap();
        let bytes = rmp_serde::to_vec(&rule_lib).unwrap();

        let mut file = tempfile::Builder::new().suffix(".mp").tempfile().unwrap();
        file.write_all(&bytes).unwrap();

        let config = ConfigManager::custom().rule_path(file.path().to_path_buf()).build();
        let loaded = RuleLoader::load(&config).await.unwrap();
        assert_eq!(loaded, rule_lib);
    }

    #[tokio::test]
    async fn test_missing_file_is_load_error() {
        let config = ConfigManager::custom()
            .rule_path("/nonexistent/rules.json".into())
            .build();
        let err = RuleLoader::load(&config).await.unwrap_err();
        assert!(matches!(err, FactCheckError::RuleLoadError(_)));
    }

    #[test]
    fn test_empty_and_malformed_rule_data() {
        assert!(matches!(
            RuleLoader::parse(b"[]", RuleFileType::Json),
            Err(FactCheckError::RuleLoadError(_))
        ));
        assert!(matches!(
            RuleLoader::parse(b"{not json", RuleFileType::Json),
            Err(FactCheckError::RuleParseError(_))
        ));
        assert!(matches!(
            RuleLoader::parse(b"\xc1", RuleFileType::MsgPack),
            Err(FactCheckError::MsgPackError(_))
        ));
    }
}
