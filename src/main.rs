//! rsfactcheck 命令行入口
//! 控制台充当消息传输层：出站消息直接打印到标准输出

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use url::Url;

use rsfactcheck::{
    ConfigManager, FactCheckError, FactChecker, FcResult, JsonFileReportSink, MessageTransport,
    OutboundMessage, WELCOME_TEXT,
};

#[derive(Parser)]
#[command(name = "rsfactcheck")]
#[command(about = "Misinformation and deepfake checker")]
#[command(version)]
struct Cli {
    /// Rule table (.json / .mp / .msgpack); embedded rules when omitted
    #[arg(long, global = true, env = "RSFACTCHECK_RULES")]
    rules: Option<PathBuf>,

    /// Report store path
    #[arg(long, global = true, env = "RSFACTCHECK_REPORTS", default_value = "reports.json")]
    reports: PathBuf,

    /// OpenAI-compatible API base url
    #[arg(long, global = true, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    api_base: String,

    /// Chat model name
    #[arg(long, global = true, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, global = true, env = "HF_API_TOKEN", hide_env_values = true)]
    hf_token: Option<String>,

    /// Append AI analysis to rule matches
    #[arg(long, global = true)]
    enrich: bool,

    /// Ask the AI for a short analysis when nothing suspicious is found
    #[arg(long, global = true)]
    explain: bool,

    /// Probe media urls before attaching them
    #[arg(long, global = true)]
    verify_media: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the welcome message
    Start,
    /// Check a text message
    Check { text: String },
    /// Ask the AI for a short analysis only, skipping rules and categories
    ExplainText { text: String },
    /// Check the first frame of a video for deepfakes
    Video { path: PathBuf },
    /// Report an incorrect classification
    Report { text: Vec<String> },
    /// List the loaded rule table
    Rules,
}

/// 控制台传输层
struct ConsoleTransport {
    http: Option<reqwest::Client>,
}

impl ConsoleTransport {
    fn new(verify_media: bool) -> Result<Self> {
        let http = if verify_media {
            Some(reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?)
        } else {
            None
        };
        Ok(Self { http })
    }
}

#[async_trait]
impl MessageTransport for ConsoleTransport {
    async fn send_photo(&self, media_ref: &Url, caption: &str) -> FcResult<()> {
        if let Some(http) = &self.http {
            let response = http
                .head(media_ref.clone())
                .send()
                .await
                .map_err(|e| FactCheckError::MediaDeliveryFailure(e.to_string()))?;
            if !response.status().is_success() {
                return Err(FactCheckError::MediaDeliveryFailure(format!(
                    "{} 返回 {}",
                    media_ref,
                    response.status()
                )));
            }
            debug!("配图可访问：{}", media_ref);
        }

        println!("{}\n🖼️ {}", caption, media_ref);
        Ok(())
    }

    async fn send_text(&self, text: &str) -> FcResult<()> {
        println!("{}", text);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = ConfigManager::custom()
        .report_path(cli.reports.clone())
        .ai_base_url(cli.api_base.clone())
        .ai_model(cli.model.clone())
        .ai_api_key(cli.api_key.clone())
        .frame_api_token(cli.hf_token.clone())
        .enrich_rule_matches(cli.enrich)
        .freeform_on_no_category(cli.explain)
        .verbose(cli.verbose);
    if let Some(rules) = &cli.rules {
        builder = builder.rule_path(rules.clone());
    }
    let config = builder.build();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_directive().parse()?))
        .with_writer(std::io::stderr)
        .init();

    let checker = FactChecker::new(&config).await?;
    let transport = ConsoleTransport::new(cli.verify_media)?;

    let message = match cli.command {
        Commands::Start => OutboundMessage::text(WELCOME_TEXT),
        Commands::Check { text } => checker.check_text(&text).await,
        Commands::ExplainText { text } => {
            let result = checker.explain_text(&text).await;
            checker.compose(&result)
        }
        Commands::Video { path } => checker.check_video(&path).await,
        Commands::Report { text } => {
            let sink = JsonFileReportSink::new(config.report_path.clone());
            checker.submit_report(&sink, &text.join(" ")).await
        }
        Commands::Rules => {
            for (index, entry) in checker.table().entries().iter().enumerate() {
                println!("{:>2}. [{}] {}", index + 1, entry.category.as_str(), entry.pattern);
            }
            return Ok(());
        }
    };

    let outcome = checker.respond(&transport, &message).await?;
    info!("消息已投递：{:?}", outcome);
    Ok(())
}
