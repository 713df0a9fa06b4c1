//! Country detail graph.
//!
//! Modules:
//! - `node`: per-query state machine with guarded transitions
//! - `orchestrator`: root/dependent sequencing, stale-subject guard and change notification

mod node;
mod orchestrator;

pub use node::{NodeState, NodeStatus, QueryNode, TransitionError};
pub use orchestrator::{DetailEvent, DetailOrchestrator, DetailSnapshot, NodeKind};
