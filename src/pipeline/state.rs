//! Pure pipeline state machine
//!
//! ```text
//! ┌──────┐ Start ┌──────────────┐ Partitioned{n>0} ┌──────────────────────┐
//! │ Idle ├──────▶│ Partitioning ├─────────────────▶│ RegroupingChunk(1/n) │◀─┐
//! └──────┘       └──────┬───────┘                  └──────────┬───────────┘  │
//!                       │ Partitioned{0}                      │ ChunkRegrouped
//!                       ▼                                     │ (i < n) ─────┘
//!                  ┌─────────┐◀───────────────────────────────┘ (i == n)
//!                  │ Joining │
//!                  └────┬────┘
//!                       │ Joined
//!                       ▼
//!                   ┌──────┐
//!                   │ Done │
//!                   └──────┘
//! ```
//!
//! `Fail` moves any of `Partitioning`, `RegroupingChunk` or `Joining` to the
//! terminal `Failed` state. `Done` and `Failed` accept no further events.

use std::fmt;

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Partitioning,
    /// Regrouping chunk `index` (1-based) of `total`
    RegroupingChunk { index: usize, total: usize },
    Joining,
    Done,
    Failed { reason: String },
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed { .. })
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "Idle"),
            PipelineState::Partitioning => write!(f, "Partitioning"),
            PipelineState::RegroupingChunk { index, total } => {
                write!(f, "RegroupingChunk({index}/{total})")
            }
            PipelineState::Joining => write!(f, "Joining"),
            PipelineState::Done => write!(f, "Done"),
            PipelineState::Failed { reason } => write!(f, "Failed({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Start,
    Partitioned { chunks: usize },
    ChunkRegrouped,
    Joined,
    Fail { reason: String },
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineEvent::Start => write!(f, "Start"),
            PipelineEvent::Partitioned { chunks } => write!(f, "Partitioned({chunks})"),
            PipelineEvent::ChunkRegrouped => write!(f, "ChunkRegrouped"),
            PipelineEvent::Joined => write!(f, "Joined"),
            PipelineEvent::Fail { .. } => write!(f, "Fail"),
        }
    }
}

/// Compute the state that follows `state` on `event`
pub fn apply_transition(
    state: &PipelineState,
    event: PipelineEvent,
) -> PipelineResult<PipelineState> {
    match (state, event) {
        (PipelineState::Idle, PipelineEvent::Start) => Ok(PipelineState::Partitioning),

        (PipelineState::Partitioning, PipelineEvent::Partitioned { chunks: 0 }) => {
            Ok(PipelineState::Joining)
        }
        (PipelineState::Partitioning, PipelineEvent::Partitioned { chunks }) => {
            Ok(PipelineState::RegroupingChunk {
                index: 1,
                total: chunks,
            })
        }

        (PipelineState::RegroupingChunk { index, total }, PipelineEvent::ChunkRegrouped) => {
            if index < total {
                Ok(PipelineState::RegroupingChunk {
                    index: index + 1,
                    total: *total,
                })
            } else {
                Ok(PipelineState::Joining)
            }
        }

        (PipelineState::Joining, PipelineEvent::Joined) => Ok(PipelineState::Done),

        (
            PipelineState::Partitioning
            | PipelineState::RegroupingChunk { .. }
            | PipelineState::Joining,
            PipelineEvent::Fail { reason },
        ) => Ok(PipelineState::Failed { reason }),

        (state, event) => Err(PipelineError::InvalidTransition {
            from: state.clone(),
            event: event.to_string(),
        }),
    }
}
