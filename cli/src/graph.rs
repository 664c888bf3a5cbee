use anyhow::{Context, Result};
use chronograph_core::{GraphConfig, GraphOutput, GraphSession, History};
use std::path::Path;

/// Render the graph around `selected` and write it as JSON.
pub fn run_graph_command(
    history: History,
    config: GraphConfig,
    selected: &str,
    output: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let rendered = render(history, config, selected);
    if rendered.selected_index.is_none() {
        tracing::warn!(%selected, "Event not found, showing the start of the history");
    }

    let json = if pretty {
        serde_json::to_string_pretty(&rendered)
    } else {
        serde_json::to_string(&rendered)
    }
    .context("Failed to serialize graph")?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            println!("Graph saved to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn render(history: History, config: GraphConfig, selected: &str) -> GraphOutput {
    GraphSession::new(config)
        .with_history(history)
        .select(selected)
}
