//! `agent-cli schedule`: register, list, pause, and unpause schedules
//! against the in-process [`agent_workflow::Scheduler`].

use agent_workflow::OverlapPolicy;
use anyhow::{anyhow, Result};
use serde::Serialize;
use uuid::Uuid;

use crate::context::RuntimeContext;
use crate::output::{print_output, Output, OutputFormat};

#[derive(Debug, Serialize)]
struct ScheduleList {
    schedules: Vec<ScheduleRow>,
}

#[derive(Debug, Serialize)]
struct ScheduleRow {
    id: Uuid,
    workflow_type: String,
    overlap_policy: OverlapPolicy,
    paused: bool,
}

impl Output for ScheduleList {
    fn write_human(&self) -> String {
        if self.schedules.is_empty() {
            return "no schedules registered".to_string();
        }
        let mut lines = Vec::with_capacity(self.schedules.len());
        for row in &self.schedules {
            lines.push(format!(
                "{} {} overlap={:?} paused={}",
                row.id, row.workflow_type, row.overlap_policy, row.paused
            ));
        }
        lines.join("\n")
    }
}

pub async fn handle_add_command(
    ctx: &RuntimeContext,
    workflow_type: &str,
    expr: &str,
    overlap_policy: OverlapPolicy,
) -> Result<()> {
    let id = ctx.scheduler.add_schedule(workflow_type, expr, overlap_policy)?;
    println!("registered schedule {id}");
    Ok(())
}

pub fn handle_list_command(ctx: &RuntimeContext, format: OutputFormat) -> Result<()> {
    let schedules = ctx
        .scheduler
        .list()
        .into_iter()
        .map(|s| ScheduleRow { id: s.id, workflow_type: s.workflow_type, overlap_policy: s.overlap_policy, paused: s.paused })
        .collect();
    print_output(&ScheduleList { schedules }, format)
}

pub fn handle_pause_command(ctx: &RuntimeContext, id: Uuid) -> Result<()> {
    if !ctx.scheduler.contains(id) {
        return Err(anyhow!("no such schedule: {id}"));
    }
    ctx.scheduler.pause(id);
    println!("paused {id}");
    Ok(())
}

pub fn handle_unpause_command(ctx: &RuntimeContext, id: Uuid) -> Result<()> {
    if !ctx.scheduler.contains(id) {
        return Err(anyhow!("no such schedule: {id}"));
    }
    ctx.scheduler.unpause(id);
    println!("unpaused {id}");
    Ok(())
}
