//! Chronograph Core
//!
//! Turns a chronologically ordered workflow history into a positioned
//! node/edge graph around a selected event:
//!
//! - [`window`]: which slice of the history to show, and when to keep it
//! - [`connection`]: how events relate (parent, inferred child, successor)
//! - [`builder`]: nodes and typed edges for a window
//! - [`layout`]: level × time coordinates for every node
//! - [`session`]: the stateful wrapper tying the above together
//!
//! The engine is synchronous and does no I/O beyond the optional file
//! loaders on [`History`] and [`GraphConfig`].

pub mod builder;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod graph;
pub mod layout;
pub mod session;
pub mod window;

pub use builder::GraphBuilder;
pub use config::GraphConfig;
pub use connection::{ConnectionResolver, Connections, WorkflowResolver};
pub use error::{GraphError, GraphResult};
pub use event::{EventId, History, HistoryEvent};
pub use graph::{Edge, EdgeType, Element, Graph, Node, Position};
pub use layout::{LayoutBounds, LayoutEngine};
pub use session::{GraphOutput, GraphSession, SharedSession, render_window};
pub use window::{Window, WindowSelection, WindowSelector};

pub mod prelude {
    pub use crate::config::{EdgeConfig, GraphConfig, LayoutConfig, WindowConfig};
    pub use crate::connection::{
        ChildRoute, ConnectionResolver, Connections, EventStatus, ParentExecution,
        WorkflowResolver,
    };
    pub use crate::event::{EventDetails, EventId, History, HistoryEvent, WorkflowExecution};
    pub use crate::graph::{Edge, EdgeType, Element, Graph, Node, Position};
    pub use crate::session::{GraphOutput, GraphSession, SharedSession};
    pub use crate::window::Window;
}
