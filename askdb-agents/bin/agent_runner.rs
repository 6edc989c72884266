use std::path::PathBuf;
use std::sync::Arc;

use askdb_agents::{config, AgentError, SqlAgent, SqlAgentConfig};
use askdb_llm_sdk::openai::OpenAiClient;
use askdb_tools::ToolExecutor;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Answer natural-language questions over a SQLite database", long_about = None)]
struct Args {
    /// Question to answer
    question: String,

    /// Path to the SQLite database
    #[arg(long)]
    db_path: String,

    /// Path to a TOML config file containing API keys
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model to use, overriding the config
    #[arg(long)]
    model: Option<String>,

    /// Maximum number of LLM calls before giving up
    #[arg(long, default_value_t = 15)]
    max_cycles: usize,
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

    let agent_config = SqlAgentConfig {
        model: args.model,
        max_cycles: args.max_cycles,
        ..SqlAgentConfig::default()
    };
    let agent = SqlAgent::new(client, tool_executor, agent_config).await?;

    println!("Question: {}\n", args.question);

    let result = match agent.run(&args.question).await {
        Ok(result) => result,
        Err(AgentError::DidNotConverge { cycles, partial }) => {
            eprintln!("Agent did not converge within {} cycles", cycles);
            *partial
        }
        Err(e) => return Err(e.into()),
    };

    for (index, query) in result.queries.iter().enumerate() {
        println!("--- Query {} ---", index + 1);
        println!("{}\n", query.query);
        println!("{}\n", askdb_tools::markdown::rows_to_table(&query.rows));
    }

    if !result.final_answer.is_empty() {
        println!("--- Answer ---\n{}", result.final_answer);
    }

    Ok(())
}
