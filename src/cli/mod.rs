//! Command-line interface for operating the dealflow engine.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::http::ReqwestWebhookTransport;
use crate::adapters::sqlite::{
    initialize_database, SqliteActivitySink, SqliteAutomationRepository, SqliteEntityStore,
    SqliteExecutionRepository, SqliteNotificationSink, SqliteResearchQueue,
    SqliteSequenceService, SqliteTagStore,
};
use crate::adapters::ConfigLoader;
use crate::domain::models::config::Config;
use crate::domain::models::event::EntityType;
use crate::domain::ports::AutomationRepository;
use crate::services::{
    ActionExecutor, Dispatcher, DryRunEvaluator, LoopGuard, TimeTriggerPoller,
};

#[derive(Parser)]
#[command(name = "dealflow", about = "CRM automation rule engine", version)]
pub struct Cli {
    /// Emit machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or upgrade the database schema
    Migrate,
    /// Run the time-trigger poller once (the scheduler's entry point)
    Poll {
        /// Maximum candidate entities per automation
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Preview whether an automation's conditions hold for a live entity
    DryRun {
        #[arg(long)]
        automation: Uuid,
        #[arg(long)]
        entity_type: String,
        #[arg(long)]
        entity_id: Uuid,
        #[arg(long)]
        project: Uuid,
    },
    /// List automation definitions for a project
    List {
        #[arg(long)]
        project: Uuid,
    },
}

pub fn handle_error(err: anyhow::Error, json: bool) {
    if json {
        eprintln!("{}", serde_json::json!({"error": err.to_string()}));
    } else {
        eprintln!("error: {err:#}");
    }
    std::process::exit(1);
}

async fn open_database(config: &Config) -> Result<SqlitePool> {
    let url = format!("sqlite:{}", config.database.path);
    initialize_database(&url)
        .await
        .context("failed to open database")
}

/// Wire the engine from a pool plus config.
fn build_engine(
    pool: &SqlitePool,
    config: &Config,
) -> Result<(Arc<Dispatcher>, TimeTriggerPoller)> {
    let automations = Arc::new(SqliteAutomationRepository::new(pool.clone()));
    let entities = Arc::new(SqliteEntityStore::new(pool.clone()));

    let executor = Arc::new(ActionExecutor::new(
        entities.clone(),
        Arc::new(SqliteNotificationSink::new(pool.clone())),
        Arc::new(SqliteTagStore::new(pool.clone())),
        Arc::new(SqliteActivitySink::new(pool.clone())),
        Arc::new(SqliteResearchQueue::new(pool.clone())),
        Arc::new(SqliteSequenceService::new(pool.clone())),
        Arc::new(
            ReqwestWebhookTransport::new(Duration::from_secs(config.engine.webhook_timeout_secs))
                .context("failed to build webhook transport")?,
        ),
    ));

    let guard = Arc::new(LoopGuard::new(
        config.engine.max_chain_depth,
        Duration::from_secs(config.engine.cooldown_secs),
    ));

    let dispatcher = Arc::new(Dispatcher::new(
        automations.clone(),
        Arc::new(SqliteExecutionRepository::new(pool.clone())),
        executor,
        guard,
    ));

    let poller = TimeTriggerPoller::new(automations, entities, dispatcher.clone());
    Ok((dispatcher, poller))
}

pub async fn execute(cli: Cli) -> Result<()> {
    let config = ConfigLoader::load()?;

    match cli.command {
        Commands::Migrate => {
            let _pool = open_database(&config).await?;
            if cli.json {
                println!("{}", serde_json::json!({"migrated": true}));
            } else {
                println!("database ready at {}", config.database.path);
            }
        }

        Commands::Poll { limit } => {
            let pool = open_database(&config).await?;
            let (_dispatcher, poller) = build_engine(&pool, &config)?;
            let limit = limit.unwrap_or(config.engine.poll_batch_limit);
            let summary = poller.process_time_triggers(limit).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "processed {} automations, {} new matches, {} errors",
                    summary.processed, summary.matched, summary.errors
                );
                for detail in &summary.details {
                    match &detail.error {
                        Some(error) => println!("  {}: error: {error}", detail.name),
                        None => println!(
                            "  {}: {} candidates, {} new",
                            detail.name, detail.candidates, detail.new_matches
                        ),
                    }
                }
            }
        }

        Commands::DryRun {
            automation,
            entity_type,
            entity_id,
            project,
        } => {
            let entity_type = EntityType::from_str(&entity_type)
                .with_context(|| format!("unknown entity type '{entity_type}'"))?;
            let pool = open_database(&config).await?;
            let evaluator = DryRunEvaluator::new(
                Arc::new(SqliteAutomationRepository::new(pool.clone())),
                Arc::new(SqliteEntityStore::new(pool)),
            );
            let report = evaluator
                .dry_run(automation, entity_type, entity_id, project)
                .await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "would_trigger: {}, conditions_met: {}, actions: {}",
                    report.would_trigger,
                    report.conditions_met,
                    report.actions.len()
                );
            }
        }

        Commands::List { project } => {
            let pool = open_database(&config).await?;
            let repo = SqliteAutomationRepository::new(pool);
            let definitions = repo.list(project).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&definitions)?);
            } else {
                let mut table = Table::new();
                table.set_header(["id", "name", "trigger", "conditions", "actions", "enabled"]);
                for def in &definitions {
                    table.add_row([
                        def.id.to_string(),
                        def.name.clone(),
                        def.trigger.trigger_type().to_string(),
                        def.conditions.len().to_string(),
                        def.actions.len().to_string(),
                        def.enabled.to_string(),
                    ]);
                }
                println!("{table}");
            }
        }
    }

    Ok(())
}
