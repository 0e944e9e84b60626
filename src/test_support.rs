use crate::domain::{CommandOutput, CommandRunner};
use crate::infra::process::describe;
use anyhow::{Result, bail};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};

/// Scripted stand-in for the backend tools.
///
/// Commands are matched by their full command line (`program arg arg`).
/// Unscripted commands of an available program succeed with empty output;
/// commands of an unavailable program fail to spawn.
#[derive(Debug)]
pub struct MockRunner {
    available: RwLock<HashSet<String>>,
    responses: RwLock<HashMap<String, CommandOutput>>,
    spawn_failures: RwLock<HashSet<String>>,
    commands: RwLock<Vec<String>>,
    next_pid: AtomicU32,
}

impl MockRunner {
    /// distrobox and podman available, soda absent
    pub fn new() -> Self {
        Self::with_tools(&["distrobox", "podman"])
    }

    pub fn with_tools(tools: &[&str]) -> Self {
        Self {
            available: RwLock::new(tools.iter().map(|t| t.to_string()).collect()),
            responses: RwLock::new(HashMap::new()),
            spawn_failures: RwLock::new(HashSet::new()),
            commands: RwLock::new(Vec::new()),
            next_pid: AtomicU32::new(1000),
        }
    }

    pub fn set_available(&self, program: &str, available: bool) {
        let mut tools = self.available.write().unwrap();
        if available {
            tools.insert(program.to_string());
        } else {
            tools.remove(program);
        }
    }

    /// Scripts the exit code and stdout of one command line
    pub fn respond(&self, command: &str, code: i32, stdout: &str) {
        self.responses.write().unwrap().insert(
            command.to_string(),
            CommandOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: if code == 0 {
                    String::new()
                } else {
                    format!("mock failure: {command}")
                },
            },
        );
    }

    /// Makes one command line fail before a process exists
    pub fn fail_spawn(&self, command: &str) {
        self.spawn_failures
            .write()
            .unwrap()
            .insert(command.to_string());
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    fn record_command(&self, command: &str) {
        self.commands.write().unwrap().push(command.to_string());
    }

    fn check_spawn(&self, program: &str, command: &str) -> Result<()> {
        if !self.available.read().unwrap().contains(program) {
            bail!("mock: {program} not found");
        }
        if self.spawn_failures.read().unwrap().contains(command) {
            bail!("mock: failed to spawn {command}");
        }
        Ok(())
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockRunner {
    fn is_available(&self, program: &str) -> bool {
        self.available.read().unwrap().contains(program)
    }

    fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let command = describe(program, args);
        self.record_command(&command);
        self.check_spawn(program, &command)?;

        Ok(self
            .responses
            .read()
            .unwrap()
            .get(&command)
            .cloned()
            .unwrap_or_else(|| CommandOutput {
                code: Some(0),
                ..Default::default()
            }))
    }

    fn spawn_detached(&self, program: &str, args: &[String]) -> Result<u32> {
        let command = describe(program, args);
        self.record_command(&command);
        self.check_spawn(program, &command)?;

        Ok(self.next_pid.fetch_add(1, Ordering::Relaxed))
    }
}
