//! `agent-cli workflow`: start/resume workflows by type name through the
//! registry's type-erased interface, the same path `POST /workflows/{type}`
//! takes.

use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::context::RuntimeContext;
use crate::output::{print_output, Output, OutputFormat};

#[derive(Debug, Serialize)]
struct RunReport {
    workflow_type: String,
    run_id: Uuid,
    output: Value,
}

impl Output for RunReport {
    fn write_human(&self) -> String {
        format!("started {} run {}\noutput: {}", self.workflow_type, self.run_id, self.output)
    }
}

#[derive(Debug, Serialize)]
struct ResumeReport {
    workflow_type: String,
    run_id: Uuid,
    output: Value,
}

impl Output for ResumeReport {
    fn write_human(&self) -> String {
        format!("resumed {} run {}\noutput: {}", self.workflow_type, self.run_id, self.output)
    }
}

pub async fn handle_run_command(
    ctx: &RuntimeContext,
    workflow_type: &str,
    input_json: &str,
    format: OutputFormat,
) -> Result<()> {
    let workflow = ctx
        .registry
        .get(workflow_type)
        .ok_or_else(|| anyhow!("unknown workflow type: {workflow_type}"))?;
    let input: Value = serde_json::from_str(input_json)?;
    let (run_id, output) = workflow.start(&ctx.executor, input).await?;
    print_output(&RunReport { workflow_type: workflow_type.to_string(), run_id, output }, format)
}

pub async fn handle_resume_command(
    ctx: &RuntimeContext,
    workflow_type: &str,
    run_id: Uuid,
    format: OutputFormat,
) -> Result<()> {
    let workflow = ctx
        .registry
        .get(workflow_type)
        .ok_or_else(|| anyhow!("unknown workflow type: {workflow_type}"))?;
    let output = workflow.resume(&ctx.executor, run_id).await?;
    print_output(&ResumeReport { workflow_type: workflow_type.to_string(), run_id, output }, format)
}

pub async fn handle_cancel_command(ctx: &RuntimeContext, run_id: Uuid) -> Result<()> {
    ctx.executor.cancel(run_id).await?;
    println!("cancelled {run_id}");
    Ok(())
}
