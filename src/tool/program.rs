//! Subprocess-backed tools.
//!
//! A program tool runs as its own process with captured output, which also
//! gives discovered tools process-level isolation from the host and from
//! each other. Subprocess runs support external cancellation: when a timeout
//! is configured and expires, the process is killed and the run reported
//! with the crash sentinel code.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::{CairnError, Result};
use crate::tool::result::CRASH_CODE;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Captured outcome of a program run.
#[derive(Debug)]
pub struct ProgramOutput {
    /// Exit code; [`CRASH_CODE`] when killed by timeout or signal.
    pub code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// A tool executed as a subprocess.
#[derive(Debug, Clone)]
pub struct ProgramTool {
    name: String,
    command: Vec<String>,
    working_dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl ProgramTool {
    /// Create a program tool. `command` is the executable followed by its
    /// fixed leading arguments.
    pub fn new(name: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command,
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    /// Return a new tool with the given working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Return a new tool with one more environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The tool's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The executable and fixed leading arguments.
    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Run the program with extra arguments, waiting at most `timeout`.
    pub fn run(&self, args: &[String], timeout: Option<Duration>) -> Result<ProgramOutput> {
        let Some((executable, leading)) = self.command.split_first() else {
            return Err(CairnError::ConfigValidationError {
                message: format!("tool '{}' has an empty command", self.name),
            });
        };

        let mut command = Command::new(executable);
        command.args(leading).args(args);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|e| CairnError::ToolNotFound {
            tool: format!("{} ({}: {})", self.name, executable, e),
        })?;

        let stdout = child.stdout.take().expect("stdout is piped");
        let stderr = child.stderr.take().expect("stderr is piped");
        let stdout_reader = std::thread::spawn(move || read_all(stdout));
        let stderr_reader = std::thread::spawn(move || read_all(stderr));

        let deadline = timeout.map(|t| Instant::now() + t);
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break Some(status);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                let _ = child.kill();
                let _ = child.wait();
                break None;
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let mut stderr = stderr_reader.join().unwrap_or_default();

        let code = match status {
            // Killed by a signal: no code to report, use the sentinel.
            Some(status) => status.code().unwrap_or(CRASH_CODE),
            None => {
                stderr.push_str(&format!(
                    "tool '{}' timed out after {:?} and was killed\n",
                    self.name,
                    timeout.unwrap_or_default()
                ));
                CRASH_CODE
            }
        };

        Ok(ProgramOutput {
            code,
            stdout,
            stderr,
        })
    }
}

fn read_all(mut source: impl Read) -> String {
    let mut bytes = Vec::new();
    let _ = source.read_to_end(&mut bytes);
    String::from_utf8_lossy(&bytes).into_owned()
}
