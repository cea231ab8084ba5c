//! Scenario S6: a workflow resumed after a simulated crash
//! replays its recorded history and reaches the same decisions, without
//! re-running the activity side effect a second time.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use agent_activities::{Activity, ActivityContext, ActivityError};
use agent_workflow::{InMemoryWorkflowEventStore, Workflow, WorkflowContext, WorkflowError, WorkflowExecutor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An activity that counts how many times it actually runs, to prove
/// replay does not re-execute it.
struct CountingActivity {
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl Activity for CountingActivity {
    type Input = u64;
    type Output = u64;

    fn activity_type(&self) -> &'static str {
        "test.counting"
    }

    async fn run(&self, _ctx: &ActivityContext, input: Self::Input) -> Result<Self::Output, ActivityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(input * 2)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DoubleInput {
    value: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct DoubleOutput {
    doubled: u64,
}

struct DoublingWorkflow {
    activity: CountingActivity,
}

#[async_trait]
impl Workflow for DoublingWorkflow {
    type Input = DoubleInput;
    type Output = DoubleOutput;

    fn workflow_type() -> &'static str {
        "doubling_workflow"
    }

    async fn run(&self, ctx: &mut WorkflowContext, input: Self::Input) -> Result<Self::Output, WorkflowError> {
        let activity_ctx = ActivityContext::new("doubling-call");
        let policy = agent_workflow::ActivityRetryPolicy::default();
        let doubled = ctx.run_activity(&self.activity, &activity_ctx, input.value, &policy).await?;
        Ok(DoubleOutput { doubled })
    }
}

#[tokio::test]
async fn resumed_execution_replays_without_rerunning_the_activity() {
    let store = Arc::new(InMemoryWorkflowEventStore::new());
    let calls = Arc::new(AtomicU32::new(0));
    let workflow = DoublingWorkflow { activity: CountingActivity { calls: Arc::clone(&calls) } };
    let executor = WorkflowExecutor::new(store.clone());

    let (id, output) = executor.start(&workflow, DoubleInput { value: 21 }).await.expect("start succeeds");
    assert_eq!(output, DoubleOutput { doubled: 42 });
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Simulate a crash: a fresh executor over the same durable store resumes
    // the completed execution's history. Calling `resume` on an already
    // completed run still replays its one recorded activity result rather
    // than re-invoking the activity.
    let resumed_executor = WorkflowExecutor::new(store);
    let resumed_output = resumed_executor.resume(&workflow, id).await.expect("resume succeeds");
    assert_eq!(resumed_output, DoubleOutput { doubled: 42 });
    assert_eq!(calls.load(Ordering::SeqCst), 1, "replay must not re-execute the activity");
}

#[tokio::test]
async fn cancel_marks_execution_cancelled() {
    let store = Arc::new(InMemoryWorkflowEventStore::new());
    let calls = Arc::new(AtomicU32::new(0));
    let workflow = DoublingWorkflow { activity: CountingActivity { calls } };
    let executor = WorkflowExecutor::new(store.clone());

    let (id, _) = executor.start(&workflow, DoubleInput { value: 1 }).await.expect("start succeeds");
    executor.cancel(id).await.expect("cancel succeeds");

    let execution = store.load_execution(id).await.expect("load succeeds").expect("execution exists");
    assert_eq!(execution.status, agent_workflow::Status::Cancelled);
}

struct StallingActivity;

#[async_trait]
impl Activity for StallingActivity {
    type Input = ();
    type Output = ();

    fn activity_type(&self) -> &'static str {
        "test.stalling"
    }

    async fn run(&self, _ctx: &ActivityContext, (): Self::Input) -> Result<Self::Output, ActivityError> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        Ok(())
    }
}

struct StallingWorkflow {
    activity: StallingActivity,
}

#[async_trait]
impl Workflow for StallingWorkflow {
    type Input = ();
    type Output = ();

    fn workflow_type() -> &'static str {
        "stalling_workflow"
    }

    async fn run(&self, ctx: &mut WorkflowContext, (): Self::Input) -> Result<Self::Output, WorkflowError> {
        let activity_ctx = ActivityContext::new("stall-call");
        let policy = agent_workflow::ActivityRetryPolicy::default();
        ctx.run_activity(&self.activity, &activity_ctx, (), &policy).await
    }
}

#[tokio::test(start_paused = true)]
async fn workflow_execution_timeout_marks_execution_timed_out() {
    let store = Arc::new(InMemoryWorkflowEventStore::new());
    let workflow = StallingWorkflow { activity: StallingActivity };
    let executor = WorkflowExecutor::new(store.clone());

    let result = executor
        .start_with_timeout(&workflow, (), Some(std::time::Duration::from_secs(5)))
        .await;

    assert!(matches!(result, Err(WorkflowError::TimedOut)));
}

/// An activity that announces it has started, then blocks until released —
/// lets a test land a `cancel()` call at a known point mid-execution.
struct BlockingActivity {
    started: Arc<tokio::sync::Notify>,
    release: Arc<tokio::sync::Notify>,
}

#[async_trait]
impl Activity for BlockingActivity {
    type Input = ();
    type Output = ();

    fn activity_type(&self) -> &'static str {
        "test.blocking"
    }

    async fn run(&self, _ctx: &ActivityContext, (): Self::Input) -> Result<Self::Output, ActivityError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

struct CallCounterActivity {
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl Activity for CallCounterActivity {
    type Input = ();
    type Output = ();

    fn activity_type(&self) -> &'static str {
        "test.call_counter"
    }

    async fn run(&self, _ctx: &ActivityContext, (): Self::Input) -> Result<Self::Output, ActivityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct TwoStepWorkflow {
    first: BlockingActivity,
    second: CallCounterActivity,
}

#[async_trait]
impl Workflow for TwoStepWorkflow {
    type Input = ();
    type Output = ();

    fn workflow_type() -> &'static str {
        "two_step_workflow"
    }

    async fn run(&self, ctx: &mut WorkflowContext, (): Self::Input) -> Result<Self::Output, WorkflowError> {
        let policy = agent_workflow::ActivityRetryPolicy::default();
        ctx.run_activity(&self.first, &ActivityContext::new("first-call"), (), &policy).await?;
        ctx.run_activity(&self.second, &ActivityContext::new("second-call"), (), &policy).await
    }
}

#[tokio::test]
async fn cancel_reaches_a_spawned_execution_before_its_next_activity() {
    let store = Arc::new(InMemoryWorkflowEventStore::new());
    let started = Arc::new(tokio::sync::Notify::new());
    let release = Arc::new(tokio::sync::Notify::new());
    let second_calls = Arc::new(AtomicU32::new(0));
    let workflow = Arc::new(TwoStepWorkflow {
        first: BlockingActivity { started: Arc::clone(&started), release: Arc::clone(&release) },
        second: CallCounterActivity { calls: Arc::clone(&second_calls) },
    });
    let executor = Arc::new(WorkflowExecutor::new(store.clone()));

    let (id, _workflow_id) =
        Arc::clone(&executor).spawn_start(Arc::clone(&workflow), (), None).await.expect("spawn_start succeeds");

    // Wait until the spawned task is blocked inside its first activity,
    // cancel while it's still there, then let the first activity finish —
    // the second activity's checkpoint must observe the cancellation and
    // never actually run.
    started.notified().await;
    executor.cancel(id).await.expect("cancel succeeds");
    release.notify_one();

    for _ in 0..1000 {
        let execution = store.load_execution(id).await.expect("load succeeds").expect("execution exists");
        if execution.status != agent_workflow::Status::Running {
            assert_eq!(execution.status, agent_workflow::Status::Cancelled);
            assert_eq!(second_calls.load(Ordering::SeqCst), 0, "cancellation must preempt the second activity");
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("spawned execution never reached a terminal status");
}
