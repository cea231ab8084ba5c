//! Per-component health tracking, generalized from the teacher's
//! `monitoring::types::MonitoringStats`/`HealthStatus` (per-agent task
//! metrics) to per-component status: memory, workflow runtime, embedding
//! provider, vector store, cache.

use std::collections::BTreeMap;

use agent_memory::HealthSink;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// A component's current health, in the three states spec §6 names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Down,
}

/// One component's reported status.
#[derive(Debug, Clone, Serialize)]
pub struct ActorStatus {
    pub name: String,
    pub status: HealthState,
    pub last_activity: DateTime<Utc>,
}

/// The `/actors/status` response body.
#[derive(Debug, Clone, Serialize)]
pub struct ActorsStatusResponse {
    pub actors: Vec<ActorStatus>,
    pub updated_at: DateTime<Utc>,
}

struct ComponentState {
    status: HealthState,
    last_activity: DateTime<Utc>,
}

/// Tracks the health of every external collaborator the service depends on.
/// Callers record activity as operations succeed or fail; `/health` and
/// `/actors/status` read a consistent snapshot.
pub struct AgentMonitor {
    components: RwLock<BTreeMap<String, ComponentState>>,
}

impl Default for AgentMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentMonitor {
    /// Registers the five components spec §6 names, all starting healthy.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        let components = ["memory", "workflow_runtime", "embedding_provider", "vector_store", "cache"]
            .into_iter()
            .map(|name| (name.to_string(), ComponentState { status: HealthState::Healthy, last_activity: now }))
            .collect();
        Self { components: RwLock::new(components) }
    }

    /// Records that `component` just completed an operation successfully,
    /// clearing any prior degraded/down status.
    pub fn record_activity(&self, component: &str) {
        self.set_status(component, HealthState::Healthy);
    }

    /// Records a non-fatal failure: the component still answers but not
    /// reliably (spec: graph nodes and activities treat `Transient`
    /// failures as degradation, not outright failure).
    pub fn record_degraded(&self, component: &str) {
        self.set_status(component, HealthState::Degraded);
    }

    /// Records a fatal failure: the component is unreachable.
    pub fn record_down(&self, component: &str) {
        self.set_status(component, HealthState::Down);
    }

    fn set_status(&self, component: &str, status: HealthState) {
        let mut guard = self.components.write();
        guard
            .entry(component.to_string())
            .and_modify(|state| {
                state.status = status;
                state.last_activity = Utc::now();
            })
            .or_insert_with(|| ComponentState { status, last_activity: Utc::now() });
    }

    /// A consistent snapshot of every tracked component's status.
    #[must_use]
    pub fn snapshot(&self) -> ActorsStatusResponse {
        let guard = self.components.read();
        let actors = guard
            .iter()
            .map(|(name, state)| ActorStatus { name: name.clone(), status: state.status, last_activity: state.last_activity })
            .collect();
        ActorsStatusResponse { actors, updated_at: Utc::now() }
    }
}

impl HealthSink for AgentMonitor {
    fn record_healthy(&self, component: &str) {
        self.record_activity(component);
    }

    fn record_degraded(&self, component: &str) {
        AgentMonitor::record_degraded(self, component);
    }

    fn record_down(&self, component: &str) {
        AgentMonitor::record_down(self, component);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_monitor_reports_all_components_healthy() {
        let monitor = AgentMonitor::new();
        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.actors.len(), 5);
        assert!(snapshot.actors.iter().all(|a| a.status == HealthState::Healthy));
    }

    #[test]
    fn degraded_then_recovered_component_reports_healthy_again() {
        let monitor = AgentMonitor::new();
        monitor.record_degraded("vector_store");
        let mid = monitor.snapshot();
        let vector_store = mid.actors.iter().find(|a| a.name == "vector_store").expect("tracked");
        assert_eq!(vector_store.status, HealthState::Degraded);

        monitor.record_activity("vector_store");
        let after = monitor.snapshot();
        let vector_store = after.actors.iter().find(|a| a.name == "vector_store").expect("tracked");
        assert_eq!(vector_store.status, HealthState::Healthy);
    }
}
