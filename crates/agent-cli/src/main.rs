//! Scholar Agent CLI
//!
//! Connects to the tool server, discovers its tools and chats with Gemini,
//! which may call them.

mod repl;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{AgentBuilder, ModelProvider, Session, ToolInvoker};
use agent_runtime::{
    GeminiConfig, GeminiProvider, McpClient, ToolServerConfig, config::DEFAULT_TOOL_SERVER_URL,
};

#[derive(Parser, Debug)]
#[command(name = "scholar-agent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Tool server MCP endpoint
    #[arg(long, env = "MCP_SERVER_URL", default_value = DEFAULT_TOOL_SERVER_URL)]
    server_url: String,

    /// Gemini model (defaults to GEMINI_MODEL or gemini-2.5-flash)
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Ask a single question and exit
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Refuse new messages once the transcript holds this many turns
    #[arg(long, default_value_t = 500)]
    max_turns: usize,

    /// System instruction for the model
    #[arg(long)]
    system_prompt: Option<String>,

    /// Verbose logging
    #[arg(long, short = 'd')]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut gemini = GeminiConfig::from_env()?;
    if let Some(model) = cli.model.clone() {
        gemini.model = model;
    }
    let model = gemini.model.clone();
    let provider = Arc::new(GeminiProvider::from_config(gemini)?);
    if !provider.health_check().await? {
        anyhow::bail!("Gemini model '{model}' is not available; check GEMINI_API_KEY and GEMINI_MODEL");
    }

    let client = Arc::new(
        McpClient::connect(ToolServerConfig::new(&cli.server_url))
            .await
            .with_context(|| format!("Failed to connect to MCP server at {}", cli.server_url))?,
    );
    let invoker = ToolInvoker::connect(client.clone())
        .await
        .context("Failed to discover tools")?;

    println!("Connected to server with tools: {:?}", invoker.registry().names());

    let mut builder = AgentBuilder::new()
        .provider(provider)
        .invoker(invoker)
        .model(model)
        .max_transcript_turns(Some(cli.max_turns));
    if let Some(prompt) = cli.system_prompt {
        builder = builder.system_prompt(prompt);
    }
    let mut session = Session::new(Arc::new(builder.build()?));
    tracing::info!(session = %session.id(), "Session started");

    let result = if let Some(prompt) = cli.prompt {
        if repl::ask(&mut session, &prompt).await {
            Ok(())
        } else {
            Err(anyhow::anyhow!("The question could not be answered"))
        }
    } else {
        let result = repl::chat_loop(&mut session).await;
        println!("\nConversation History:");
        println!("{}", repl::history_json(&session));
        result
    };

    tracing::info!(
        session = %session.id(),
        turns = session.turn_count(),
        seconds = session.duration().num_seconds(),
        "Session ended"
    );
    if let Err(e) = client.close().await {
        tracing::warn!(error = %e, "Failed to close the tool server session");
    }

    result
}
