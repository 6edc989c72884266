use std::path::PathBuf;
use std::sync::Arc;

use askdb_agents::{config, DirectPipeline};
use askdb_llm_sdk::openai::OpenAiClient;
use askdb_tools::ToolExecutor;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Single-shot question-to-SQL-to-answer pipeline", long_about = None)]
struct Args {
    /// Question to answer
    question: Option<String>,

    /// Path to the SQLite database
    #[arg(long)]
    db_path: String,

    /// Path to a TOML config file containing API keys
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model to use, overriding the config
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(false),
        )
        .init();

    let args = Args::parse();

    let Some(question) = args.question else {
        eprintln!("Usage: pipeline-runner --db-path <DB_PATH> <QUESTION>");
        std::process::exit(1);
    };

    let file_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::Config::default(),
    };
    let provider = config::resolve_provider_config(&file_config)?;

    let mut client = OpenAiClient::new(provider.api_key)?;
    if let Some(base_url) = provider.base_url {
        client = client.with_base_url(base_url);
    }
    if let Some(model) = args.model.clone().or(provider.model) {
        client = client.with_model(model);
    }
    let client: Arc<dyn askdb_llm_sdk::client::LlmClient> = Arc::new(client);

    let tool_executor = Arc::new(ToolExecutor::new(&args.db_path));

    let mut pipeline = DirectPipeline::new(client, tool_executor);
    if let Some(model) = args.model {
        pipeline = pipeline.with_model(model);
    }

    let result = pipeline.run(&question).await?;

    println!("Query:\n{}\n", result.query);
    println!("{}\n", askdb_tools::markdown::rows_to_table(&result.rows));
    println!("Answer:\n{}", result.answer);

    Ok(())
}
