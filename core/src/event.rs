//! # History Events
//!
//! The input side of the engine: a chronologically ordered list of workflow
//! history events, plus the [`History`] index that makes every connection
//! lookup O(1) against the full list.

use crate::error::{GraphError, GraphResult};
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::Path;

/// Event type that receives inferred edges from events handing control back
/// to the decider.
pub const DECISION_TASK_SCHEDULED: &str = "DecisionTaskScheduled";

/// Identifier of a history event.
///
/// Histories carry ids as integers or strings; both compare by their string
/// form, so `7` and `"7"` name the same event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => EventId(text),
            RawId::Signed(n) => EventId(n.to_string()),
            RawId::Unsigned(n) => EventId(n.to_string()),
        })
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EventId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A `(workflowId, runId)` pair naming one workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecution {
    pub workflow_id: String,
    pub run_id: String,
}

/// Link and execution fields carried by an event.
///
/// Only the Connection Resolver reads these; layout never does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_event_id: Option<EventId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_event_id: Option<EventId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiated_event_id: Option<EventId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_task_completed_event_id: Option<EventId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continued_execution_run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_execution_run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_workflow_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_workflow_execution: Option<WorkflowExecution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_execution: Option<WorkflowExecution>,
}

/// One record of a workflow's execution history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    pub event_id: EventId,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: EventDetails,
}

impl HistoryEvent {
    pub fn new(
        event_id: impl Into<EventId>,
        event_type: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            timestamp,
            details: EventDetails::default(),
        }
    }

    pub fn with_details(mut self, details: EventDetails) -> Self {
        self.details = details;
        self
    }
}

/// A chronologically ordered event list with precomputed lookups.
///
/// Built once per history load in O(n). Afterwards lookups by id, "next
/// event" and "next decision scheduled" are all O(1).
#[derive(Debug, Clone, Default)]
pub struct History {
    events: Vec<HistoryEvent>,
    positions: AHashMap<EventId, usize>,
    next_decision: Vec<Option<usize>>,
}

impl History {
    pub fn new(events: Vec<HistoryEvent>) -> Self {
        let mut positions = AHashMap::with_capacity(events.len());
        for (position, event) in events.iter().enumerate() {
            // Ids are unique by contract; on a duplicate the first occurrence wins.
            positions.entry(event.event_id.clone()).or_insert(position);
        }

        let mut next_decision = vec![None; events.len()];
        let mut upcoming = None;
        for position in (0..events.len()).rev() {
            next_decision[position] = upcoming;
            if events[position].event_type == DECISION_TASK_SCHEDULED {
                upcoming = Some(position);
            }
        }

        Self {
            events,
            positions,
            next_decision,
        }
    }

    /// Parse a JSON array of events.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        let events: Vec<HistoryEvent> = serde_json::from_str(json)?;
        Ok(Self::new(events))
    }

    /// Read and parse a JSON history file.
    pub fn load(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| GraphError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEvent> {
        self.position_of(id).map(|position| &self.events[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// The event immediately after `id` in list order.
    pub fn next_after(&self, id: &str) -> Option<&HistoryEvent> {
        let position = self.position_of(id)?;
        self.events.get(position + 1)
    }

    /// The first `DecisionTaskScheduled` event strictly after `id`.
    pub fn next_decision_after(&self, id: &str) -> Option<&HistoryEvent> {
        let position = self.position_of(id)?;
        self.next_decision[position].map(|next| &self.events[next])
    }
}

impl From<Vec<HistoryEvent>> for History {
    fn from(events: Vec<HistoryEvent>) -> Self {
        Self::new(events)
    }
}
