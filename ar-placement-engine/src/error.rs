use std::fmt;

use thiserror::Error;

use crate::tools::placement::session::SessionState;

/// Scene collaborator operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneOp {
    Create,
    Destroy,
    GetTransform,
    SetTransform,
}

impl fmt::Display for SceneOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Destroy => "destroy",
            Self::GetTransform => "get transform",
            Self::SetTransform => "set transform",
        };
        f.write_str(name)
    }
}

/// Errors raised by the placement pipeline.
///
/// None of these are fatal: callers convert them into a status report and
/// keep ticking.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("no camera or sensor state available to resolve placement")]
    UnresolvablePlacement,

    #[error("unknown placement mode: {0}")]
    InvalidMode(String),

    #[error("surface sensor negotiation failed: {0}")]
    SensorNegotiationFailure(String),

    #[error("scene {op} failed: {reason}")]
    SceneOperationFailure { op: SceneOp, reason: String },

    #[error("session cannot handle '{event}' while {from:?}")]
    InvalidSessionTransition {
        from: SessionState,
        event: &'static str,
    },
}

impl PlacementError {
    pub fn scene(op: SceneOp, reason: impl Into<String>) -> Self {
        Self::SceneOperationFailure {
            op,
            reason: reason.into(),
        }
    }
}

pub type PlacementResult<T> = Result<T, PlacementError>;
