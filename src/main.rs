/// blockflow: workflow graph editor core for visual DeFi automation
///
/// Command-line entry point. Lists the block catalog, lints workflow graph
/// files locally, validates them against the backend, and starts executions
/// while tailing their event stream.

use anyhow::{Context, Result};
use blockflow::{
    api::{ExecutionEvent, WorkflowClient},
    blocks::BlockCatalog,
    config::Config,
    workflow::{lint_graph, WorkflowGraph},
};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "blockflow", about = "Visual DeFi workflow builder toolkit", version)]
struct Cli {
    /// JSON config file; environment defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the block catalog by category.
    Blocks {
        /// Only show blocks usable on this chain (e.g. BASE)
        #[arg(long)]
        chain: Option<String>,
    },
    /// Check a canvas graph file for structural problems without the backend.
    Lint {
        /// Path to a `{nodes, edges}` canvas graph JSON file.
        path: PathBuf,
    },
    /// Validate a canvas graph file against the backend.
    Validate {
        path: PathBuf,
    },
    /// Execute a saved workflow and follow its event stream.
    Run {
        #[arg(long)]
        workflow_id: String,
        /// JSON file with the initial input
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let catalog = Arc::new(BlockCatalog::builtin().context("invalid built-in block table")?);

    match cli.command {
        Command::Blocks { chain } => {
            for category in catalog.get_categories() {
                let blocks: Vec<_> = category
                    .blocks
                    .into_iter()
                    .filter(|b| chain.as_deref().map_or(true, |c| b.supports_chain(c)))
                    .collect();
                if blocks.is_empty() {
                    continue;
                }
                println!("{} ({})", category.label, category.id);
                for block in blocks {
                    println!(
                        "  {:<18} {:<14} → {}",
                        block.id,
                        block.node_type,
                        block.resolved_backend_type()
                    );
                }
            }
        }
        Command::Lint { path } => {
            let graph: WorkflowGraph = read_json(&path)?;
            let issues = lint_graph(&graph);
            if issues.is_empty() {
                println!("✅ {}: no structural issues", path.display());
            }
            for issue in &issues {
                println!("❌ [{}] {}", issue.kind.code(), issue.message());
                if !issue.node_ids.is_empty() {
                    println!("   nodes: {}", issue.node_ids.join(", "));
                }
            }
            if !issues.is_empty() {
                anyhow::bail!("{} structural issue(s) found", issues.len());
            }
        }
        Command::Validate { path } => {
            let graph: WorkflowGraph = read_json(&path)?;
            let client = WorkflowClient::new(&config.api, Arc::clone(&catalog))?;
            let report = client.validate_workflow(&graph).await?;
            println!("{}", report.message);
            if !report.valid {
                anyhow::bail!("workflow is invalid");
            }
        }
        Command::Run { workflow_id, input } => {
            let initial_input = match input {
                Some(path) => read_json(&path)?,
                None => Value::Object(Default::default()),
            };
            let client = WorkflowClient::new(&config.api, Arc::clone(&catalog))?;
            let handle = client.execute_workflow(&workflow_id, initial_input).await?;
            println!("execution {} ({})", handle.execution_id, handle.status);

            let mut stream = client
                .subscribe_execution(&handle.execution_id, handle.subscription_token.as_deref())
                .await?;
            while let Some(event) = stream.next_event().await? {
                match event {
                    ExecutionEvent::SignatureRequired(request) => println!(
                        "✍️ node {} waits for a Safe signature over {}",
                        request.node_id, request.safe_tx_hash
                    ),
                    ExecutionEvent::Completed(data) => println!("✅ completed: {}", data),
                    ExecutionEvent::Failed(data) => println!("❌ failed: {}", data),
                    ExecutionEvent::Close => println!("stream closed"),
                    ExecutionEvent::Other { event, data } => println!("{}: {}", event, data),
                }
            }
        }
    }

    Ok(())
}
