//! # Window Selector
//!
//! Picks the contiguous slice of the history that gets materialized into a
//! graph, and decides whether the previously rendered slice is still good
//! enough for a new selection.
//!
//! A selection near the center of the current window (inside the hysteresis
//! band) keeps the window as is, so nudging the selection by a few events does
//! not trigger a rebuild. Windows touching either end of the history extend
//! the band to that end.

use crate::config::WindowConfig;
use crate::event::History;
use serde::{Deserialize, Serialize};

/// Half-open index range `[from, to)` into the full event list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub from: usize,
    pub to: usize,
}

impl Window {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.from..self.to).contains(&index)
    }

    pub fn center(&self) -> f64 {
        (self.from + self.to) as f64 / 2.0
    }
}

/// Inclusive range of indices that may reuse a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReuseBand {
    pub from: f64,
    pub to: f64,
}

impl ReuseBand {
    pub fn contains(&self, index: usize) -> bool {
        let index = index as f64;
        self.from <= index && index <= self.to
    }
}

/// Outcome of a window decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSelection {
    /// The window to render: the previous one when reused, otherwise new.
    pub window: Window,
    /// True when the previous window was kept and nothing needs rebuilding.
    pub reused: bool,
    /// Position of the selected event, `None` when the id is unknown.
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct WindowSelector {
    config: WindowConfig,
}

impl WindowSelector {
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Window of at most `size` events around `index`.
    ///
    /// An unknown selection (`None`) is placed before the first event, which
    /// clamps the window to the head of the history.
    ///
    /// The half size rounds down, so for odd sizes the selection sits one
    /// event left of center. Rounding up would leave a window of size 1 one
    /// event before the selection instead of on it.
    pub fn candidate(&self, len: usize, index: Option<usize>) -> Window {
        let half = self.config.size / 2;
        let from = index.map_or(0, |index| index.saturating_sub(half));
        let to = len.min(from + self.config.size);
        Window::new(from.min(to), to)
    }

    /// Band around the center of `previous` within which it is reused.
    pub fn reuse_band(&self, previous: &Window, len: usize) -> ReuseBand {
        let center = previous.center();
        let delta = self.config.reuse_delta();
        ReuseBand {
            from: if previous.from == 0 { 0.0 } else { center - delta },
            to: if previous.to >= len {
                len as f64
            } else {
                center + delta
            },
        }
    }

    /// Decide the window for `selected_id`.
    ///
    /// Returns `None` for an empty history: there is nothing to render and
    /// no redraw is needed.
    pub fn select(
        &self,
        history: &History,
        selected_id: &str,
        previous: Option<Window>,
    ) -> Option<WindowSelection> {
        if history.is_empty() {
            return None;
        }

        let index = history.position_of(selected_id);
        if index.is_none() {
            tracing::debug!(selected = %selected_id, "Selected event not in history");
        }

        if let (Some(previous), Some(position)) = (previous, index) {
            let band = self.reuse_band(&previous, history.len());
            if band.contains(position) {
                tracing::debug!(
                    index = position,
                    from = previous.from,
                    to = previous.to,
                    "Selection within reuse band, keeping window"
                );
                return Some(WindowSelection {
                    window: previous,
                    reused: true,
                    index,
                });
            }
        }

        let window = self.candidate(history.len(), index);
        tracing::debug!(
            ?index,
            from = window.from,
            to = window.to,
            "Window rebuilt"
        );
        Some(WindowSelection {
            window,
            reused: false,
            index,
        })
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::event::HistoryEvent;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn history(len: usize) -> History {
        History::new(
            (1..=len as u64)
                .map(|n| HistoryEvent::new(n, "MarkerRecorded", Utc.timestamp_opt(n as i64, 0).unwrap()))
                .collect(),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_window_is_bounded(
            len in 1usize..400,
            size in 1usize..300,
            selected in 0usize..500,
        ) {
            let history = history(len);
            let selector = WindowSelector::new(WindowConfig { size, reuse_tightness: 0.6 });
            let selection = selector
                .select(&history, &selected.to_string(), None)
                .unwrap();
            let window = selection.window;

            prop_assert!(window.from <= window.to);
            prop_assert!(window.to <= len);
            prop_assert!(window.len() <= size);
            if let Some(index) = selection.index {
                prop_assert!(window.contains(index));
            }
        }

        #[test]
        fn prop_rebuild_contains_selection(
            len in 2usize..400,
            size in 2usize..200,
            first in 0usize..400,
            second in 0usize..400,
        ) {
            let history = history(len);
            let selector = WindowSelector::new(WindowConfig { size, reuse_tightness: 0.6 });
            let first_id = (first % len + 1).to_string();
            let second_id = (second % len + 1).to_string();

            let previous = selector.select(&history, &first_id, None).unwrap().window;
            let selection = selector.select(&history, &second_id, Some(previous)).unwrap();
            let index = selection.index.unwrap();

            if selection.reused {
                prop_assert_eq!(selection.window, previous);
                prop_assert!(selector.reuse_band(&previous, len).contains(index));
            } else {
                prop_assert!(selection.window.contains(index));
            }
        }
    }
}
