use crate::domain::{CommandOutput, CommandRunner};
use anyhow::{Context, Result, bail};
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs the backend tools as real child processes.
///
/// Without a timeout a hung tool blocks the calling thread for as long as it
/// runs. `with_timeout` bounds every waited call: the child is killed once
/// the deadline passes, and output still streaming from processes it left
/// behind is cut off at the same deadline.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self { timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl CommandRunner for SystemRunner {
    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let context = describe(program, args);
        debug!(command = %context, "running");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawning `{context}`"))?;

        match self.timeout {
            Some(limit) => wait_bounded(child, limit, &context),
            None => {
                let output = child
                    .wait_with_output()
                    .with_context(|| format!("waiting for `{context}`"))?;

                Ok(CommandOutput {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
        }
    }

    fn spawn_detached(&self, program: &str, args: &[String]) -> Result<u32> {
        let context = describe(program, args);
        debug!(command = %context, "launching detached");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("launching `{context}`"))?;

        Ok(child.id())
    }
}

fn wait_bounded(mut child: Child, limit: Duration, context: &str) -> Result<CommandOutput> {
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);
    let deadline = Instant::now() + limit;

    let status = loop {
        if let Some(status) = child
            .try_wait()
            .with_context(|| format!("waiting for `{context}`"))?
        {
            break status;
        }

        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            bail!("`{context}` did not finish within {:?} and was killed", limit);
        }

        thread::sleep(POLL_INTERVAL);
    };

    // A background grandchild may still hold the pipes open after the child
    // exited. The readers get whatever time is left before the deadline.
    Ok(CommandOutput {
        code: status.code(),
        stdout: collect(stdout, deadline, context),
        stderr: collect(stderr, deadline, context),
    })
}

/// Output captured by a reader thread so far, plus a signal sent at EOF
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    eof: Receiver<()>,
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> Drain {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let (done, eof) = mpsc::channel();
    let sink = Arc::clone(&buf);

    thread::spawn(move || {
        let mut chunk = [0u8; 8192];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => match sink.lock() {
                    Ok(mut buf) => buf.extend_from_slice(&chunk[..n]),
                    Err(_) => break,
                },
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        let _ = done.send(());
    });

    Drain { buf, eof }
}

fn collect(drain: Option<Drain>, deadline: Instant, context: &str) -> String {
    let Some(drain) = drain else {
        return String::new();
    };

    let remaining = deadline.saturating_duration_since(Instant::now());
    if let Err(RecvTimeoutError::Timeout) = drain.eof.recv_timeout(remaining) {
        debug!(command = %context, "output still open at the deadline, keeping what was read");
    }

    let bytes = match drain.buf.lock() {
        Ok(buf) => buf.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    String::from_utf8_lossy(&bytes).into_owned()
}

pub(crate) fn describe(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
