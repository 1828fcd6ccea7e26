//! docinfer - 批量文档推理
//!
//! 组合根：加载配置、初始化日志、构建依赖并执行一次批次

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use docinfer::application::{BatchContext, BatchCoordinator, InferenceEnginePort};
use docinfer::config::{load_config_from_path, load_prompt, load_schema, print_config, LogConfig};
use docinfer::infrastructure::adapters::{FakeInferenceClient, InputDirectory, JsonFileResultSink};
use docinfer::infrastructure::{ConsoleProgress, VertexGeminiClient};

/// Batch document inference through Gemini on Vertex AI
#[derive(Debug, Parser)]
#[command(name = "docinfer", version, about)]
struct Cli {
    /// 配置文件路径（默认搜索 config/config.yaml、config.toml 等）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 不调用 Vertex AI，所有文件返回 `{}`
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},docinfer={}", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config_from_path(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("docinfer - batch document inference");
    print_config(&config);

    // Prompt 与 schema
    let prompt = load_prompt(&config.prompt.prompt_path)?;
    let schema = load_schema(&config.prompt.schema_path)?;
    let generation = Arc::new(config.generation_config(&prompt, Some(schema)));

    // 推理引擎
    let engine: Arc<dyn InferenceEnginePort> = if cli.dry_run {
        tracing::warn!("Dry run: Vertex AI will not be called");
        Arc::new(FakeInferenceClient::with_defaults())
    } else {
        Arc::new(VertexGeminiClient::new(config.vertex_client_config())?)
    };

    // 输入文件
    let files = InputDirectory::new(&config.input.folder_path)
        .list(config.input.sample)
        .await?;

    let ctx = BatchContext::new(
        engine,
        config.model.model.clone(),
        prompt.user.clone(),
        generation,
        config.retry_policy(),
        config.batch.conc_tasks,
    )
    .arc();
    let coordinator =
        BatchCoordinator::new(ctx, config.batch.max_failed, Arc::new(ConsoleProgress::new()));
    let sink = JsonFileResultSink::new(&config.output.results_path, &config.output.failed_path);

    let run_id = Uuid::new_v4();
    let results = coordinator
        .run_and_persist(files, &sink)
        .instrument(tracing::info_span!("batch", run_id = %run_id))
        .await?;

    let summary = results.summary();
    println!("\n{}", summary);
    tracing::info!(
        run_id = %run_id,
        succeeded = summary.succeeded,
        failed = summary.failed,
        aborted = summary.aborted,
        "Run complete"
    );

    Ok(())
}
