use anyhow::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::executor::{CommandExecutor, CommandInvocation, CommandOutput};

/// Executor that never spawns a process: it records every invocation and
/// answers with queued outputs, falling back to an empty success.
///
/// Clones share the same log and queue.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCommandExecutor {
    state: Arc<Mutex<ScriptState>>,
}

#[derive(Debug, Default)]
struct ScriptState {
    responses: VecDeque<CommandOutput>,
    invocations: Vec<CommandInvocation>,
}

impl ScriptedCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the output returned by the next unanswered invocation.
    pub fn respond_with(&self, output: CommandOutput) -> &Self {
        self.state.lock().responses.push_back(output);
        self
    }

    pub fn logged_invocations(&self) -> Vec<CommandInvocation> {
        self.state.lock().invocations.clone()
    }
}

impl CommandExecutor for ScriptedCommandExecutor {
    fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutput> {
        let mut state = self.state.lock();
        state.invocations.push(invocation.clone());
        Ok(state
            .responses
            .pop_front()
            .unwrap_or_else(|| CommandOutput::success(Vec::<u8>::new())))
    }
}
