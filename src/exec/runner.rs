//! Synchronous child execution with full output capture.
//!
//! One cycle = spawn, close stdin, drain both output pipes, reap the exit
//! status. Draining completes before the status is read; stderr is drained
//! on a helper thread so neither pipe can fill up and deadlock the child.

use crate::classify::OutputClassifier;
use crate::config::types::{CadenceError, ExecMode, Result, TickerConfig};
use crate::logging::Logger;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;

/// Interpreter binary for script-mode targets.
const INTERPRETER: &str = "php";

/// Shell for command-mode targets.
const SHELL: &str = "sh";

/// Outcome of one child execution, consumed by the cycle that produced it.
#[derive(Clone, Debug)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Executes the configured target once per cycle and forwards classified
/// output to the log sink.
pub struct ProcessRunner {
    program: String,
    args: Vec<String>,
    logger: Arc<Logger>,
    classifier: OutputClassifier,
}

impl ProcessRunner {
    pub fn new(config: &TickerConfig, logger: Arc<Logger>) -> Self {
        let (program, args) = match config.mode {
            ExecMode::Script => (INTERPRETER.to_string(), vec![config.target.clone()]),
            ExecMode::Command => (SHELL.to_string(), vec!["-c".to_string(), config.target.clone()]),
        };

        ProcessRunner {
            program,
            args,
            logger,
            classifier: OutputClassifier::default(),
        }
    }

    /// Execute one cycle and classify its output.
    ///
    /// A child that cannot be spawned is not fatal: the failure is logged at
    /// ERROR and the cycle reports exit code 1, leaving the next scheduled
    /// cycle as the retry.
    pub fn run_once(&self) -> ExecutionResult {
        match self.spawn_and_capture() {
            Ok(result) => {
                for entry in self.classifier.classify(&result.stdout, &result.stderr) {
                    self.logger.log(entry.level, &entry.message);
                }
                result
            }
            Err(err) => {
                self.logger
                    .error(&format!("Failed to execute script process: {err}"));
                ExecutionResult {
                    exit_code: 1,
                    stdout: String::new(),
                    stderr: String::new(),
                }
            }
        }
    }

    fn spawn_and_capture(&self) -> Result<ExecutionResult> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| CadenceError::Process(err.to_string()))?;

        // The child gets EOF instead of input.
        drop(child.stdin.take());

        let (stdout, stderr) = drain(&mut child);
        let status = child.wait()?;

        Ok(ExecutionResult {
            exit_code: exit_code_of(status),
            stdout,
            stderr,
        })
    }
}

/// Read both pipes to EOF, stderr on its own thread.
fn drain(child: &mut Child) -> (String, String) {
    let stderr_collector = child
        .stderr
        .take()
        .map(|pipe| thread::spawn(move || read_to_string_lossy(pipe)));

    let stdout = child
        .stdout
        .take()
        .map(read_to_string_lossy)
        .unwrap_or_default();

    let stderr = stderr_collector
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();

    (stdout, stderr)
}

fn read_to_string_lossy<R: Read>(mut stream: R) -> String {
    let mut buffer = Vec::new();
    let _ = stream.read_to_end(&mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(unix)]
fn exit_code_of(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .unwrap_or_else(|| 128 + status.signal().unwrap_or(0))
}

#[cfg(not(unix))]
fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
