//! 全局配置管理,存储所有可配置项
//! 配置在启动时构建一次，之后以引用方式传入各组件，运行期不可修改

use std::path::PathBuf;

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 规则表路径（None 时使用内置规则表）
    pub rule_path: Option<PathBuf>,
    // 用户举报存储路径
    pub report_path: PathBuf,
    // AI后端地址（OpenAI 兼容接口）
    pub ai_base_url: String,
    // AI模型名称
    pub ai_model: String,
    // AI接口密钥
    pub ai_api_key: Option<String>,
    // AI调用超时（单位：秒）
    pub ai_timeout: u64,
    // 规则命中后是否追加 AI 自由分析
    pub enrich_rule_matches: bool,
    // AI 判定为非虚假信息时是否追加 AI 自由分析
    pub freeform_on_no_category: bool,
    // 图像分类推理接口
    pub frame_model_url: String,
    // 图像分类接口令牌
    pub frame_api_token: Option<String>,
    // 图像分类超时（单位：秒）
    pub frame_timeout: u64,
    // ffmpeg 可执行文件路径
    pub ffmpeg_path: PathBuf,
    // 是否启用详细日志
    pub verbose: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            rule_path: None,
            report_path: PathBuf::from("reports.json"),
            ai_base_url: "https://api.openai.com/v1".to_string(),
            ai_model: "gpt-4o-mini".to_string(),
            ai_api_key: None,
            ai_timeout: 30,
            enrich_rule_matches: false,
            freeform_on_no_category: false,
            frame_model_url: "https://api-inference.huggingface.co/models/prithivMLmods/Deep-Fake-Detector-Model".to_string(),
            frame_api_token: None,
            frame_timeout: 60,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            verbose: false,
        }
    }
}

impl GlobalConfig {
    /// 本库日志的默认过滤指令（由 `verbose` 决定级别）
    pub fn log_directive(&self) -> &'static str {
        if self.verbose { "rsfactcheck=debug" } else { "rsfactcheck=info" }
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GlobalConfig::default(),
        }
    }

    pub fn rule_path(mut self, path: PathBuf) -> Self {
        self.config.rule_path = Some(path);
        self
    }

    pub fn report_path(mut self, path: PathBuf) -> Self {
        self.config.report_path = path;
        self
    }

    pub fn ai_base_url(mut self, url: String) -> Self {
        self.config.ai_base_url = url;
        self
    }

    pub fn ai_model(mut self, model: String) -> Self {
        self.config.ai_model = model;
        self
    }

    pub fn ai_api_key(mut self, key: Option<String>) -> Self {
        self.config.ai_api_key = key;
        self
    }

    pub fn ai_timeout(mut self, timeout: u64) -> Self {
        self.config.ai_timeout = timeout;
        self
    }

    pub fn enrich_rule_matches(mut self, enabled: bool) -> Self {
        self.config.enrich_rule_matches = enabled;
        self
    }

    pub fn freeform_on_no_category(mut self, enabled: bool) -> Self {
        self.config.freeform_on_no_category = enabled;
        self
    }

    pub fn frame_model_url(mut self, url: String) -> Self {
        self.config.frame_model_url = url;
        self
    }

    pub fn frame_api_token(mut self, token: Option<String>) -> Self {
        self.config.frame_api_token = token;
        self
    }

    pub fn frame_timeout(mut self, timeout: u64) -> Self {
        self.config.frame_timeout = timeout;
        self
    }

    pub fn ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.config.ffmpeg_path = path;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
