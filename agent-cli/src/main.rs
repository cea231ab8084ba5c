//! `agent-cli`: the operator surface over the memory layer and the durable
//! workflow runtime, in the shape of the teacher's `memory-cli`: one `Cli`
//! struct with global flags, one `Commands` enum of subcommand groups, each
//! routed to a `handle_X_command` function.

mod commands;
mod config;
mod context;
mod llm;
mod output;

use std::path::PathBuf;

use agent_workflow::OverlapPolicy;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use commands::eval::{handle_run_command as handle_eval_run_command, EvalSubject};
use commands::memory::{handle_save_command, handle_search_command, handle_stats_command};
use commands::schedule::{handle_add_command, handle_list_command, handle_pause_command, handle_unpause_command};
use commands::serve::handle_serve_command;
use commands::workflow::{handle_cancel_command, handle_resume_command, handle_run_command};
use config::CliConfig;
use context::RuntimeContext;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "agent-cli")]
#[command(about = "Operator CLI for the agent execution platform")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file path; defaults to ./agent-platform.toml if present.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Boot the status/trigger HTTP surface.
    Serve {
        /// Overrides the configured bind address.
        #[arg(long)]
        bind_address: Option<String>,
    },
    /// Memory-layer operations: save, search, stats.
    Memory {
        #[command(subcommand)]
        command: MemoryCommands,
    },
    /// Start, resume, or cancel a workflow execution.
    Workflow {
        #[command(subcommand)]
        command: WorkflowCommands,
    },
    /// Schedule management.
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
    /// Run a dataset through a reasoning graph and report accuracy metrics.
    Eval {
        /// Which graph to evaluate.
        #[arg(long, value_enum)]
        subject: EvalSubject,
        /// Path to a JSON dataset file.
        #[arg(long)]
        dataset: PathBuf,
    },
}

#[derive(Subcommand)]
enum MemoryCommands {
    /// Embed and store one document.
    Save {
        collection: String,
        content: String,
        /// Metadata as a JSON object matching the collection's schema.
        #[arg(long, default_value = "{}")]
        metadata: String,
    },
    /// Semantic search within a collection.
    Search {
        collection: String,
        query: String,
        #[arg(long, default_value_t = 10)]
        top_k: usize,
    },
    /// Aggregate cache/collection/embedding statistics.
    Stats,
}

#[derive(Subcommand)]
enum WorkflowCommands {
    /// Start a new workflow execution.
    Run {
        workflow_type: String,
        /// Workflow input as a JSON value.
        input: String,
    },
    /// Resume an existing execution from its recorded history.
    Resume { workflow_type: String, run_id: Uuid },
    /// Request cancellation of an in-flight execution.
    Cancel { run_id: Uuid },
}

#[derive(Subcommand)]
enum ScheduleCommands {
    /// Register a new schedule.
    Add {
        workflow_type: String,
        /// A 6-field cron expression or an `HH:MM` daily shorthand.
        expr: String,
        #[arg(long, value_enum, default_value = "skip")]
        overlap_policy: OverlapPolicyArg,
    },
    /// List every registered schedule.
    List,
    /// Pause a schedule; it stops firing until unpaused.
    Pause { id: Uuid },
    /// Resume a paused schedule.
    Unpause { id: Uuid },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OverlapPolicyArg {
    Skip,
    BufferOne,
    AllowAll,
}

impl From<OverlapPolicyArg> for OverlapPolicy {
    fn from(value: OverlapPolicyArg) -> Self {
        match value {
            OverlapPolicyArg::Skip => OverlapPolicy::Skip,
            OverlapPolicyArg::BufferOne => OverlapPolicy::BufferOne,
            OverlapPolicyArg::AllowAll => OverlapPolicy::AllowAll,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let max_level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(max_level).init();

    let config = CliConfig::load(cli.config.as_deref())?;
    let ctx = RuntimeContext::bootstrap(&config).await?;

    match cli.command {
        Commands::Serve { bind_address } => {
            let bind_address = bind_address.unwrap_or(config.bind_address.clone());
            handle_serve_command(&ctx, &bind_address).await
        }
        Commands::Memory { command } => match command {
            MemoryCommands::Save { collection, content, metadata } => {
                handle_save_command(&ctx, &collection, &content, &metadata, cli.format).await
            }
            MemoryCommands::Search { collection, query, top_k } => {
                handle_search_command(&ctx, &collection, &query, top_k, cli.format).await
            }
            MemoryCommands::Stats => handle_stats_command(&ctx, cli.format).await,
        },
        Commands::Workflow { command } => match command {
            WorkflowCommands::Run { workflow_type, input } => {
                handle_run_command(&ctx, &workflow_type, &input, cli.format).await
            }
            WorkflowCommands::Resume { workflow_type, run_id } => {
                handle_resume_command(&ctx, &workflow_type, run_id, cli.format).await
            }
            WorkflowCommands::Cancel { run_id } => handle_cancel_command(&ctx, run_id).await,
        },
        Commands::Schedule { command } => match command {
            ScheduleCommands::Add { workflow_type, expr, overlap_policy } => {
                handle_add_command(&ctx, &workflow_type, &expr, overlap_policy.into()).await
            }
            ScheduleCommands::List => handle_list_command(&ctx, cli.format),
            ScheduleCommands::Pause { id } => handle_pause_command(&ctx, id),
            ScheduleCommands::Unpause { id } => handle_unpause_command(&ctx, id),
        },
        Commands::Eval { subject, dataset } => handle_eval_run_command(&ctx, subject, &dataset, cli.format).await,
    }
}
