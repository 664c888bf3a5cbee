use anyhow::Result;
use chronograph_core::{GraphConfig, GraphSession, History};

/// One row of `walk` output.
#[derive(Debug, PartialEq)]
pub struct WalkStep {
    pub selected: String,
    pub window: Option<(usize, usize)>,
    pub redraw: bool,
    pub elements: usize,
}

pub fn run_walk_command(history: History, config: GraphConfig, selections: &[String]) -> Result<()> {
    for step in walk(history, config, selections) {
        let window = step
            .window
            .map(|(from, to)| format!("[{from}, {to})"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "selected={} window={} redraw={} elements={}",
            step.selected, window, step.redraw, step.elements
        );
    }
    Ok(())
}

fn walk(history: History, config: GraphConfig, selections: &[String]) -> Vec<WalkStep> {
    let mut session = GraphSession::new(config).with_history(history);
    selections
        .iter()
        .map(|selected| {
            let output = session.select(selected);
            WalkStep {
                selected: selected.clone(),
                window: output.window.map(|w| (w.from, w.to)),
                redraw: output.should_redraw,
                elements: output.elements.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(len: u64) -> History {
        let events: Vec<String> = (1..=len)
            .map(|n| {
                format!(
                    r#"{{"eventId": {n}, "eventType": "MarkerRecorded", "timestamp": "2024-03-01T10:{:02}:00Z"}}"#,
                    n % 60
                )
            })
            .collect();
        History::from_json(&format!("[{}]", events.join(","))).unwrap()
    }

    #[test]
    fn test_walk_reports_reuse() {
        let config = GraphConfig::default().with_window_size(10);
        let selections: Vec<String> = ["20", "21", "40"].iter().map(|s| s.to_string()).collect();

        let steps = walk(markers(50), config, &selections);

        assert_eq!(steps[0].window, Some((14, 24)));
        assert!(steps[0].redraw);
        assert_eq!(steps[0].elements, 10);
        assert!(!steps[1].redraw);
        assert_eq!(steps[1].elements, 0);
        assert!(steps[2].redraw);
        assert_eq!(steps[2].window, Some((34, 44)));
    }
}
