//! 检测器核心：串联规则匹配、AI 分类、视频帧检测与举报，输出面向用户的消息
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::matcher::RuleMatcher;
use crate::ai::{AiClassifier, OpenAiBackend};
use crate::compiler::{RuleCompiler, RuleTable};
use crate::composer::{ClassificationResult, DeliveryOutcome, MessageTransport, OutboundMessage, ResponseComposer};
use crate::config::GlobalConfig;
use crate::error::{FcResult, FactCheckError};
use crate::report::{ReportService, ReportSink};
use crate::rule::{Category, RuleLoader};
use crate::utils::TextNormalizer;
use crate::video::FrameClassifier;

/// `/start` 欢迎语
pub const WELCOME_TEXT: &str = "🤖 Welcome! I can help detect deepfakes and fake news.\n\n\
📹 Send a video to check for deepfakes.\n\
📰 Send a message to check for misinformation.\n\n\
Use /report <message> if you find an incorrect classification.";

pub const UNREADABLE_VIDEO_TEXT: &str = "⚠️ Unable to read video frame. The file might be corrupt.";
pub const NO_PREDICTION_TEXT: &str = "⚠️ No prediction could be made.";
pub const VIDEO_FAILED_TEXT: &str = "⚠️ Sorry, I couldn't analyze this video right now. Please try again later.";

/// 虚假信息检测器
#[derive(Clone)]
pub struct FactChecker {
    matcher: RuleMatcher,
    composer: ResponseComposer,
    ai: AiClassifier,
    frames: FrameClassifier,
    enrich_rule_matches: bool,
    freeform_on_no_category: bool,
}

impl FactChecker {
    /// 创建检测器
    pub async fn new(config: &GlobalConfig) -> FcResult<Self> {
        let start = Instant::now();

        // 1. 加载并编译规则表，任一规则无效则启动失败
        let rule_lib = RuleLoader::load(config).await?;
        let table = Arc::new(RuleCompiler::compile(&rule_lib)?);

        // 2. 构建外部协作方
        let backend = OpenAiBackend::from_config(config)?;
        let ai = AiClassifier::new(Arc::new(backend), Duration::from_secs(config.ai_timeout));
        let frames = FrameClassifier::from_config(config)?;

        info!("检测器初始化完成：规则{}条，耗时{:?}", table.len(), start.elapsed());
        Ok(Self::from_parts(table, ai, frames, config))
    }

    /// 由已构建的组件组装检测器
    pub fn from_parts(table: Arc<RuleTable>, ai: AiClassifier, frames: FrameClassifier, config: &GlobalConfig) -> Self {
        Self {
            matcher: RuleMatcher::new(table.clone()),
            composer: ResponseComposer::new(table),
            ai,
            frames,
            enrich_rule_matches: config.enrich_rule_matches,
            freeform_on_no_category: config.freeform_on_no_category,
        }
    }

    pub fn table(&self) -> &Arc<RuleTable> {
        self.matcher.table()
    }

    /// 文本分类：规则优先，无命中时交给 AI 分类
    pub async fn classify_text(&self, text: &str) -> ClassificationResult {
        if let Some(entry) = self.matcher.find_match(text) {
            let analysis = if self.enrich_rule_matches {
                Some(self.ai.analyze(text).await)
            } else {
                None
            };
            return self.composer.merge(Some(entry), None, analysis);
        }

        debug!("规则未命中，转入AI分类：{}", TextNormalizer::excerpt(text));
        let category = self.ai.classify_category(text).await;

        let analysis = if category == Category::NotFakeNews && self.freeform_on_no_category {
            Some(self.ai.analyze(text).await)
        } else {
            None
        };

        self.composer.merge(None, Some(category), analysis)
    }

    /// 仅做 AI 自由分析：跳过规则与分类，结果来源为 `AIFreeform`
    pub async fn explain_text(&self, text: &str) -> ClassificationResult {
        let analysis = self.ai.analyze(text).await;
        self.composer.merge(None, None, Some(analysis))
    }

    /// 将分类结果组装为待投递消息
    pub fn compose(&self, result: &ClassificationResult) -> OutboundMessage {
        self.composer.compose(result)
    }

    /// 文本检测，返回待投递消息
    pub async fn check_text(&self, text: &str) -> OutboundMessage {
        let result = self.classify_text(text).await;
        self.compose(&result)
    }

    /// 视频检测，所有失败都转换为用户可读的提示
    pub async fn check_video(&self, video_path: &Path) -> OutboundMessage {
        match self.frames.classify_video(video_path).await {
            Ok(classification) => OutboundMessage::text(classification.to_string()),
            Err(e) => OutboundMessage::text(Self::video_failure_text(video_path, &e)),
        }
    }

    fn video_failure_text(video_path: &Path, err: &FactCheckError) -> &'static str {
        match err {
            FactCheckError::UnreadableMedia(reason) => {
                info!("视频不可读：{}，{}", video_path.display(), reason);
                UNREADABLE_VIDEO_TEXT
            }
            FactCheckError::NoPrediction => {
                info!("视频无预测结果：{}", video_path.display());
                NO_PREDICTION_TEXT
            }
            other => {
                error!("视频检测失败：阶段=frame，文件={}，错误={}", video_path.display(), other);
                VIDEO_FAILED_TEXT
            }
        }
    }

    /// 处理 `/report` 命令
    pub async fn submit_report(&self, sink: &dyn ReportSink, raw_args: &str) -> OutboundMessage {
        ReportService::submit(sink, raw_args).await
    }

    /// 投递消息（配图失败时降级为纯文本）
    pub async fn respond(&self, transport: &dyn MessageTransport, message: &OutboundMessage) -> FcResult<DeliveryOutcome> {
        ResponseComposer::deliver(transport, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ChatBackend, ChatRequest};
    use crate::composer::{ClassificationSource, NO_CATEGORY_TEXT};
    use crate::config::ConfigManager;
    use crate::report::REPORT_USAGE_TEXT;
    use crate::video::{FrameSource, ImageClassifier, Prediction, VideoOpener};
    use async_trait::async_trait;
    use image::{DynamicImage, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use url::Url;

    /// 返回固定回复并统计调用次数的后端
    struct FixedBackend {
        reply: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatBackend for FixedBackend {
        async fn complete(&self, _request: &ChatRequest) -> FcResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct StaticSource(Option<DynamicImage>);

    impl FrameSource for StaticSource {
        fn read_frame(&mut self) -> FcResult<Option<DynamicImage>> {
            Ok(self.0.take())
        }

        fn release(&mut self) {}
    }

    struct StaticOpener(Option<DynamicImage>);

    impl VideoOpener for StaticOpener {
        fn open(&self, _path: &Path) -> FcResult<Box<dyn FrameSource>> {
            Ok(Box::new(StaticSource(self.0.clone())))
        }
    }

    struct StaticImageClassifier(Vec<Prediction>);

    #[async_trait]
    impl ImageClassifier for StaticImageClassifier {
        async fn classify(&self, _frame: &RgbImage) -> FcResult<Vec<Prediction>> {
            Ok(self.0.clone())
        }
    }

    struct Fixture {
        checker: FactChecker,
        backend: Arc<FixedBackend>,
    }

    fn fixture(reply: &str, frame: Option<DynamicImage>, predictions: Vec<Prediction>, config: &GlobalConfig) -> Fixture {
        let table = Arc::new(RuleCompiler::compile(&RuleLoader::load_embedded().unwrap()).unwrap());
        let backend = Arc::new(FixedBackend {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        });
        let ai = AiClassifier::new(backend.clone(), Duration::from_secs(5));
        let frames = FrameClassifier::new(
            Arc::new(StaticOpener(frame)),
            Arc::new(StaticImageClassifier(predictions)),
            Duration::from_secs(5),
        );
        Fixture {
            checker: FactChecker::from_parts(table, ai, frames, config),
            backend,
        }
    }

    fn text_fixture(reply: &str) -> Fixture {
        fixture(reply, None, Vec::new(), &ConfigManager::get_default())
    }

    #[tokio::test]
    async fn test_rule_match_skips_ai() {
        let f = text_fixture("PoliticalMisinformation");

        let message = f.checker.check_text("aliens are hiding the truth about area 51").await;

        assert!(message.body().contains("Conspiracy Theory"));
        assert!(message.media_ref().is_some());
        assert_eq!(f.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rule_match_with_enrichment() {
        let config = ConfigManager::custom().enrich_rule_matches(true).build();
        let f = fixture("Most UFO sightings have ordinary explanations.", None, Vec::new(), &config);

        let result = f.checker.classify_text("ufo spotted over the desert").await;

        assert_eq!(result.category, Category::ConspiracyTheory);
        assert_eq!(result.ai_analysis.as_deref(), Some("Most UFO sightings have ordinary explanations."));
        assert_eq!(f.backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_match_falls_through_to_categorical() {
        let f = text_fixture("NotFakeNews");

        let message = f.checker.check_text("the weather was nice today").await;

        assert_eq!(message, OutboundMessage::text(NO_CATEGORY_TEXT));
        assert_eq!(f.backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ai_category_borrows_rule_media() {
        let f = text_fixture("FakeScienceClaim");

        let result = f.checker.classify_text("the moon is made of cheese").await;
        let expected = f.checker.table().lookup_category(Category::FakeScienceClaim).unwrap();

        assert_eq!(result.category, Category::FakeScienceClaim);
        assert_eq!(result.media_ref.as_ref(), Some(&expected.media_ref));
        assert!(matches!(f.checker.composer.compose(&result), OutboundMessage::Photo { .. }));
    }

    #[tokio::test]
    async fn test_freeform_on_no_category() {
        let config = ConfigManager::custom().freeform_on_no_category(true).build();
        let f = fixture("NotFakeNews", None, Vec::new(), &config);

        let result = f.checker.classify_text("the weather was nice today").await;

        // 固定后端对两次调用返回相同内容
        assert_eq!(result.category, Category::NotFakeNews);
        assert_eq!(result.ai_analysis.as_deref(), Some("NotFakeNews"));
        assert_eq!(f.backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_explain_text_uses_freeform_only() {
        let f = text_fixture("Area 51 is a real air force facility.");

        // 即使规则会命中，也只返回自由分析
        let result = f.checker.explain_text("aliens are hiding the truth about area 51").await;

        assert_eq!(result.source, ClassificationSource::AIFreeform);
        assert_eq!(result.category, Category::NotFakeNews);
        assert_eq!(result.ai_analysis.as_deref(), Some("Area 51 is a real air force facility."));
        assert_eq!(f.backend.calls.load(Ordering::SeqCst), 1);

        let message = f.checker.compose(&result);
        assert!(message.body().contains("🧠 AI Insights: Area 51 is a real air force facility."));
    }

    #[tokio::test]
    async fn test_video_messages() {
        let config = ConfigManager::get_default();
        let frame = DynamicImage::ImageRgb8(RgbImage::new(4, 4));

        let ok = fixture("", Some(frame.clone()), vec![Prediction { label: "Real".to_string(), score: 0.5 }], &config);
        assert_eq!(
            ok.checker.check_video(Path::new("clip.mp4")).await,
            OutboundMessage::text("Deepfake Detection: Real (50.00% confidence)")
        );

        let unreadable = fixture("", None, Vec::new(), &config);
        assert_eq!(
            unreadable.checker.check_video(Path::new("notes.txt")).await,
            OutboundMessage::text(UNREADABLE_VIDEO_TEXT)
        );

        let empty = fixture("", Some(frame), Vec::new(), &config);
        assert_eq!(
            empty.checker.check_video(Path::new("clip.mp4")).await,
            OutboundMessage::text(NO_PREDICTION_TEXT)
        );
    }

    #[tokio::test]
    async fn test_blank_report_and_photo_fallback() {
        struct CountingSink(AtomicUsize);

        #[async_trait]
        impl ReportSink for CountingSink {
            async fn append(&self, _raw_text: &str) -> FcResult<()> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        struct PhotoFailTransport(Mutex<Vec<String>>);

        #[async_trait]
        impl MessageTransport for PhotoFailTransport {
            async fn send_photo(&self, _media_ref: &Url, _caption: &str) -> FcResult<()> {
                Err(FactCheckError::MediaDeliveryFailure("404".to_string()))
            }

            async fn send_text(&self, text: &str) -> FcResult<()> {
                self.0.lock().unwrap().push(text.to_string());
                Ok(())
            }
        }

        let f = text_fixture("NotFakeNews");
        let sink = CountingSink(AtomicUsize::new(0));
        assert_eq!(f.checker.submit_report(&sink, "  ").await, OutboundMessage::text(REPORT_USAGE_TEXT));
        assert_eq!(sink.0.load(Ordering::SeqCst), 0);

        let transport = PhotoFailTransport(Mutex::new(Vec::new()));
        let message = f.checker.check_text("5g is dangerous for your health").await;
        let outcome = f.checker.respond(&transport, &message).await.unwrap();

        assert_eq!(outcome, DeliveryOutcome::FellBackToText);
        let texts = transport.0.lock().unwrap();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains(message.body()));
    }
}
