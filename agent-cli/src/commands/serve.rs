//! `agent-cli serve`: boots the status/trigger HTTP surface and the
//! schedule poller that actually drives it (spec §4.5).

use std::sync::Arc;
use std::time::Duration;

use agent_tools::{router, AppState, WorkflowRegistry};
use agent_workflow::{Scheduler, Status, WorkflowEventStore, WorkflowExecutor};
use anyhow::Result;
use chrono::Utc;

use crate::context::RuntimeContext;

/// How often the poller checks for due firings. Coarser than this and a
/// schedule's cron minute-resolution firings start to slip; finer buys
/// nothing since `Scheduler::due` is itself minute/second-resolution.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub async fn handle_serve_command(ctx: &RuntimeContext, bind_address: &str) -> Result<()> {
    let state = AppState {
        memory: ctx.memory.clone(),
        executor: ctx.executor.clone(),
        store: ctx.store.clone(),
        registry: ctx.registry.clone(),
        scheduler: ctx.scheduler.clone(),
        monitor: ctx.monitor.clone(),
    };
    spawn_schedule_poller(
        Arc::clone(&ctx.scheduler),
        Arc::clone(&ctx.registry),
        Arc::clone(&ctx.executor),
        Arc::clone(&ctx.store),
    );
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    tracing::info!(%bind_address, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Polls `scheduler` for due firings and starts each one as a detached
/// workflow execution, marking the schedule's in-flight slot free again
/// once that execution reaches a terminal status. Without this loop a
/// registered `Schedule` only ever sits in the table — nothing ever starts
/// the workflow it names.
fn spawn_schedule_poller(
    scheduler: Arc<Scheduler>,
    registry: Arc<WorkflowRegistry>,
    executor: Arc<WorkflowExecutor>,
    store: Arc<dyn WorkflowEventStore>,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(POLL_INTERVAL);
        loop {
            interval.tick().await;
            for (schedule_id, workflow_type, fire_time) in scheduler.due(Utc::now()) {
                let Some(workflow) = registry.get(&workflow_type) else {
                    tracing::warn!(%schedule_id, %workflow_type, "schedule fired for an unregistered workflow type");
                    scheduler.mark_completed(schedule_id);
                    continue;
                };
                // spec §4.5: each firing gets its own workflow id, distinct
                // from the run_id `start_detached` assigns, so repeat
                // firings of the same schedule are distinguishable.
                let workflow_id = format!("{schedule_id}-{}", fire_time.timestamp());
                tokio::spawn(run_firing(
                    schedule_id,
                    workflow_id,
                    workflow,
                    Arc::clone(&executor),
                    Arc::clone(&store),
                    Arc::clone(&scheduler),
                ));
            }
        }
    });
}

/// Starts one schedule firing and waits for it to finish before releasing
/// the schedule's in-flight slot, so `OverlapPolicy` sees an accurate
/// picture of what's still running.
async fn run_firing(
    schedule_id: uuid::Uuid,
    workflow_id: String,
    workflow: Arc<dyn agent_tools::DynWorkflow>,
    executor: Arc<WorkflowExecutor>,
    store: Arc<dyn WorkflowEventStore>,
    scheduler: Arc<Scheduler>,
) {
    let run_id = match workflow.start_detached(executor, serde_json::json!({}), Some(workflow_id)).await {
        Ok((run_id, _workflow_id)) => run_id,
        Err(err) => {
            tracing::error!(%schedule_id, %err, "scheduled workflow failed to start");
            scheduler.mark_completed(schedule_id);
            return;
        }
    };
    loop {
        tokio::time::sleep(POLL_INTERVAL).await;
        match store.load_execution(run_id).await {
            Ok(Some(execution)) if execution.status == Status::Running => continue,
            Ok(_) | Err(_) => break,
        }
    }
    scheduler.mark_completed(schedule_id);
}
