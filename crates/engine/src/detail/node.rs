use std::fmt;
use std::sync::Arc;

use atlas_types::AtlasError;
use serde::Serialize;
use thiserror::Error;

use crate::cache::QueryResult;

/// Lifecycle of one query in the detail graph.
#[derive(Debug)]
pub enum NodeState<T> {
    /// Not requested, either because the dependency has not succeeded or the
    /// query is disabled.
    Inactive,
    Loading,
    Success(Arc<T>),
    Error(AtlasError),
}

impl<T> Clone for NodeState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Inactive => Self::Inactive,
            Self::Loading => Self::Loading,
            Self::Success(value) => Self::Success(Arc::clone(value)),
            Self::Error(error) => Self::Error(error.clone()),
        }
    }
}

impl<T> Default for NodeState<T> {
    fn default() -> Self {
        Self::Inactive
    }
}

impl<T> NodeState<T> {
    pub fn status(&self) -> NodeStatus {
        match self {
            Self::Inactive => NodeStatus::Inactive,
            Self::Loading => NodeStatus::Loading,
            Self::Success(_) => NodeStatus::Success,
            Self::Error(_) => NodeStatus::Error,
        }
    }

    pub fn value(&self) -> Option<&Arc<T>> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AtlasError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Inactive,
    Loading,
    Success,
    Error,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inactive => "inactive",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("dependency has not succeeded")]
    DependencyNotReady,
    #[error("cannot {action} a node that is {from}")]
    Invalid { action: &'static str, from: NodeStatus },
}

/// A query node with guarded transitions.
///
/// ```text
/// Inactive/Success/Error --start--> Loading --settle--> Success | Error
/// Inactive/Success/Error --fail_precondition--> Error
/// any --reset--> Inactive
/// ```
#[derive(Debug)]
pub struct QueryNode<T> {
    state: NodeState<T>,
}

impl<T> Default for QueryNode<T> {
    fn default() -> Self {
        Self { state: NodeState::Inactive }
    }
}

impl<T> QueryNode<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &NodeState<T> {
        &self.state
    }

    pub fn status(&self) -> NodeStatus {
        self.state.status()
    }

    /// Move to `Loading`. Only allowed once the dependency has succeeded and
    /// while no request is outstanding.
    pub fn start(&mut self, dependency_ready: bool) -> Result<(), TransitionError> {
        if !dependency_ready {
            return Err(TransitionError::DependencyNotReady);
        }
        if matches!(self.state, NodeState::Loading) {
            return Err(TransitionError::Invalid {
                action: "start",
                from: NodeStatus::Loading,
            });
        }
        self.state = NodeState::Loading;
        Ok(())
    }

    /// Apply the outcome of the outstanding request.
    pub fn settle(&mut self, outcome: QueryResult<T>) -> Result<(), TransitionError> {
        if !matches!(self.state, NodeState::Loading) {
            return Err(TransitionError::Invalid {
                action: "settle",
                from: self.state.status(),
            });
        }
        self.state = match outcome {
            Ok(value) => NodeState::Success(value),
            Err(error) => NodeState::Error(error),
        };
        Ok(())
    }

    /// Fail without issuing a request because an input the query needs is missing.
    pub fn fail_precondition(&mut self, dependency_ready: bool, error: AtlasError) -> Result<(), TransitionError> {
        if !dependency_ready {
            return Err(TransitionError::DependencyNotReady);
        }
        if matches!(self.state, NodeState::Loading) {
            return Err(TransitionError::Invalid {
                action: "fail",
                from: NodeStatus::Loading,
            });
        }
        self.state = NodeState::Error(error);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.state = NodeState::Inactive;
    }
}
