//! Synthetic histories for benchmarks.

use chrono::{DateTime, TimeZone, Utc};
use chronograph_core::prelude::*;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0)
        .single()
        .unwrap_or_default()
}

fn link(event: HistoryEvent, details: EventDetails) -> HistoryEvent {
    event.with_details(details)
}

/// A workflow running `activities` activities one after another, each
/// driven by its own decision task. Six events per activity.
pub fn activity_history(activities: u64) -> History {
    let mut events = vec![
        HistoryEvent::new(1u64, "WorkflowExecutionStarted", at(0)),
        HistoryEvent::new(2u64, "DecisionTaskScheduled", at(0)),
    ];
    let mut scheduled = 2u64;
    let mut clock = 0i64;

    for _ in 0..activities {
        let started = scheduled + 1;
        let completed = started + 1;
        let activity = completed + 1;
        let activity_started = activity + 1;
        let activity_done = activity_started + 1;
        let next_decision = activity_done + 1;
        clock += 1;

        events.push(link(
            HistoryEvent::new(started, "DecisionTaskStarted", at(clock)),
            EventDetails {
                scheduled_event_id: Some(scheduled.into()),
                ..Default::default()
            },
        ));
        events.push(link(
            HistoryEvent::new(completed, "DecisionTaskCompleted", at(clock)),
            EventDetails {
                scheduled_event_id: Some(scheduled.into()),
                started_event_id: Some(started.into()),
                ..Default::default()
            },
        ));
        events.push(link(
            HistoryEvent::new(activity, "ActivityTaskScheduled", at(clock)),
            EventDetails {
                decision_task_completed_event_id: Some(completed.into()),
                ..Default::default()
            },
        ));
        clock += 1;
        events.push(link(
            HistoryEvent::new(activity_started, "ActivityTaskStarted", at(clock)),
            EventDetails {
                scheduled_event_id: Some(activity.into()),
                ..Default::default()
            },
        ));
        clock += 3;
        events.push(link(
            HistoryEvent::new(activity_done, "ActivityTaskCompleted", at(clock)),
            EventDetails {
                scheduled_event_id: Some(activity.into()),
                started_event_id: Some(activity_started.into()),
                ..Default::default()
            },
        ));
        events.push(HistoryEvent::new(next_decision, "DecisionTaskScheduled", at(clock)));
        scheduled = next_decision;
    }

    History::new(events)
}
