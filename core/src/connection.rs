//! # Connection Resolver
//!
//! Derives the semantic relationships of one event: its structural parent,
//! an inferred child, the chronological successor, and cross-execution
//! metadata used for navigation.
//!
//! Resolvers are pure. They run once per windowed event on every rebuild, so
//! each call must stay O(1) against the full [`History`].

use crate::event::{EventId, History, HistoryEvent};
use serde::{Deserialize, Serialize};

/// Lifecycle phase encoded in an event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventStatus {
    Scheduled,
    Initiated,
    Started,
    Completed,
    Failed,
    TimedOut,
    Canceled,
    Terminated,
}

impl EventStatus {
    const SUFFIXES: [(&'static str, EventStatus); 8] = [
        ("Scheduled", EventStatus::Scheduled),
        ("Initiated", EventStatus::Initiated),
        ("Started", EventStatus::Started),
        ("Completed", EventStatus::Completed),
        ("Failed", EventStatus::Failed),
        ("TimedOut", EventStatus::TimedOut),
        ("Canceled", EventStatus::Canceled),
        ("Terminated", EventStatus::Terminated),
    ];

    /// Read the status off an event type such as `ActivityTaskTimedOut`.
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        Self::SUFFIXES
            .iter()
            .find(|(suffix, _)| event_type.ends_with(suffix))
            .map(|(_, status)| *status)
    }
}

/// Navigation target for a child workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRoute {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub workflow_id: String,
    pub run_id: String,
}

/// The run that started the workflow being viewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentExecution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub workflow_id: String,
    pub run_id: String,
}

/// Relationships of one event. Recomputed per call, never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connections {
    pub parent: Option<EventId>,
    pub inferred_child: Option<EventId>,
    pub chronological_child: Option<EventId>,
    pub previous_execution_run_id: Option<String>,
    pub parent_workflow_execution: Option<ParentExecution>,
    pub new_execution_run_id: Option<String>,
    pub status: Option<EventStatus>,
    pub child_route: Option<ChildRoute>,
}

/// Resolves the [`Connections`] of an event against the full history.
pub trait ConnectionResolver: Send + Sync {
    fn resolve(&self, event: &HistoryEvent, history: &History) -> Connections;
}

impl<F> ConnectionResolver for F
where
    F: Fn(&HistoryEvent, &History) -> Connections + Send + Sync,
{
    fn resolve(&self, event: &HistoryEvent, history: &History) -> Connections {
        self(event, history)
    }
}

/// Event types after which the decider is scheduled again.
const HANDS_BACK_TO_DECIDER: &[&str] = &[
    "WorkflowExecutionStarted",
    "WorkflowExecutionSignaled",
    "WorkflowExecutionCancelRequested",
    "ActivityTaskCompleted",
    "ActivityTaskFailed",
    "ActivityTaskTimedOut",
    "ActivityTaskCanceled",
    "TimerFired",
    "ChildWorkflowExecutionStarted",
    "ChildWorkflowExecutionCompleted",
    "ChildWorkflowExecutionFailed",
    "ChildWorkflowExecutionTimedOut",
    "ChildWorkflowExecutionCanceled",
    "ChildWorkflowExecutionTerminated",
    "StartChildWorkflowExecutionFailed",
    "DecisionTaskFailed",
    "DecisionTaskTimedOut",
    "ExternalWorkflowExecutionSignaled",
    "SignalExternalWorkflowExecutionFailed",
    "ExternalWorkflowExecutionCancelRequested",
    "RequestCancelExternalWorkflowExecutionFailed",
];

/// Default rules for decision-task driven workflow histories.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowResolver;

impl WorkflowResolver {
    pub fn new() -> Self {
        Self
    }

    fn parent(event: &HistoryEvent, history: &History) -> Option<EventId> {
        let details = &event.details;
        [
            &details.started_event_id,
            &details.scheduled_event_id,
            &details.initiated_event_id,
            &details.decision_task_completed_event_id,
        ]
        .into_iter()
        .flatten()
        .next()
        .filter(|id| history.contains(id.as_str()))
        .cloned()
    }

    fn inferred_child(event: &HistoryEvent, history: &History) -> Option<EventId> {
        if !HANDS_BACK_TO_DECIDER.contains(&event.event_type.as_str()) {
            return None;
        }
        history
            .next_decision_after(event.event_id.as_str())
            .map(|next| next.event_id.clone())
    }

    fn child_route(event: &HistoryEvent) -> Option<ChildRoute> {
        if !event.event_type.starts_with("ChildWorkflowExecution") {
            return None;
        }
        event
            .details
            .workflow_execution
            .as_ref()
            .map(|execution| ChildRoute {
                domain: event.details.domain.clone(),
                workflow_id: execution.workflow_id.clone(),
                run_id: execution.run_id.clone(),
            })
    }
}

impl ConnectionResolver for WorkflowResolver {
    fn resolve(&self, event: &HistoryEvent, history: &History) -> Connections {
        let details = &event.details;
        let is_start = event.event_type == "WorkflowExecutionStarted";
        let is_continued = event.event_type == "WorkflowExecutionContinuedAsNew";

        Connections {
            parent: Self::parent(event, history),
            inferred_child: Self::inferred_child(event, history),
            chronological_child: history
                .next_after(event.event_id.as_str())
                .map(|next| next.event_id.clone()),
            previous_execution_run_id: details
                .continued_execution_run_id
                .clone()
                .filter(|_| is_start),
            parent_workflow_execution: details
                .parent_workflow_execution
                .as_ref()
                .filter(|_| is_start)
                .map(|execution| ParentExecution {
                    domain: details.parent_workflow_domain.clone(),
                    workflow_id: execution.workflow_id.clone(),
                    run_id: execution.run_id.clone(),
                }),
            new_execution_run_id: details.new_execution_run_id.clone().filter(|_| is_continued),
            status: EventStatus::from_event_type(&event.event_type),
            child_route: Self::child_route(event),
        }
    }
}
