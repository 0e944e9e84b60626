use anyhow::Result;
use std::fmt::Debug;

/// Captured result of a process that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait for invoking the external container tools
pub trait CommandRunner: Send + Sync + Debug {
    /// Check if a program resolves on the executable search path
    fn is_available(&self, program: &str) -> bool;

    /// Run a program to completion and capture its output
    fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput>;

    /// Launch a program without waiting for it, returning its process id
    fn spawn_detached(&self, program: &str, args: &[String]) -> Result<u32>;
}
