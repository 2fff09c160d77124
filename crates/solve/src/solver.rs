//! Opaque solver boundary.
//!
//! The integer-program solver is an external collaborator. It receives
//! the compiled program as plain ASCII expression strings and answers
//! with a binary assignment per variable name. Implementations carry no
//! persisted state; a reply that arrives after the laboratory has been
//! replaced is stale and must be discarded by the caller.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SolverError;

/// A compiled 0/1 integer linear program.
///
/// `variables` lists every minted variable in mint order; `constraints`
/// and `objective` are expressions over those names using `+`, `-`, `*`,
/// `<=`, and `==`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramInput {
    pub objective: String,
    pub variables: Vec<String>,
    pub constraints: Vec<String>,
}

/// The solver's answer: a binary value per variable on success, an
/// opaque message on failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Asynchronous integer-program solver.
///
/// One request is in flight per optimize action; callers serialize
/// concurrent requests themselves. No retry or cancellation lives at
/// this boundary.
#[async_trait]
pub trait Solver: Send + Sync {
    async fn solve(&self, input: &ProgramInput) -> Result<SolverReply, SolverError>;
}

/// A solver that returns a fixed reply. Useful for tests and for
/// replaying a previously computed solution.
pub struct StaticSolver {
    reply: SolverReply,
}

impl StaticSolver {
    pub fn new(reply: SolverReply) -> StaticSolver {
        StaticSolver { reply }
    }

    /// A solver that always fails with the given message.
    pub fn failing(message: impl Into<String>) -> StaticSolver {
        StaticSolver {
            reply: SolverReply {
                success: false,
                variables: None,
                message: Some(message.into()),
            },
        }
    }
}

#[async_trait]
impl Solver for StaticSolver {
    async fn solve(&self, _input: &ProgramInput) -> Result<SolverReply, SolverError> {
        Ok(self.reply.clone())
    }
}
