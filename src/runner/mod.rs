//! Supervised solver execution
//!
//! Runs one trial's simulation as a child process, follows its progress on
//! stdout, keeps stderr for diagnostics, and enforces the timeout and the
//! user interrupt flag.
//!
//! On Unix the solver runs in its own process group; a timeout or interrupt
//! kills the whole group, including ranks started by an MPI launcher.

mod command;
mod error;
mod progress;

pub use command::{result_path, MpiConfig, SolverConfig, RESULT_DIR_SUFFIX, SIMFILE_PLACEHOLDER};
pub use error::{Result, RunnerError};
pub use progress::{parse_step_line, step_bar, StepLine};

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use indicatif::ProgressBar;

/// Lines of stderr kept for error reports
const STDERR_TAIL_LINES: usize = 20;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub duration: Duration,
    /// Last step reported on stdout, if any
    pub last_step: Option<u64>,
    pub stderr: String,
}

/// Runs the configured solver on simulation files
#[derive(Debug, Clone)]
pub struct SimulationRunner {
    config: SolverConfig,
    interrupt: Arc<AtomicBool>,
    show_progress: bool,
}

impl SimulationRunner {
    pub fn new(config: SolverConfig, interrupt: Arc<AtomicBool>) -> Self {
        Self {
            config,
            interrupt,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Run the solver to completion on `simfile`
    ///
    /// `expected_steps` sizes the progress bar.
    pub fn run(&self, simfile: &Path, expected_steps: u64) -> Result<RunOutcome> {
        if self.interrupt.load(Ordering::SeqCst) {
            return Err(RunnerError::Interrupted);
        }

        // the solver runs from the simulation's directory
        let simfile = &std::path::absolute(simfile)?;
        let program = self.config.command_line(simfile);
        tracing::info!(command = %program, "starting solver");

        let mut command = self.config.command(simfile);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            program: program.clone(),
            source,
        })?;

        let label = simfile
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bar = step_bar(expected_steps, self.show_progress, &label);

        let stdout = child.stdout.take().map(|out| spawn_stdout_reader(out, bar.clone()));
        let stderr = child.stderr.take().map(spawn_stderr_reader);

        let start = Instant::now();
        let status = match self.wait(&mut child, start) {
            Ok(status) => status,
            Err(e) => {
                // readers are detached: a descendant outside the group may still hold the pipes
                bar.finish_and_clear();
                return Err(e);
            }
        };

        let last_step = stdout.and_then(|h| h.join().ok()).flatten();
        let stderr_lines = stderr.and_then(|h| h.join().ok()).unwrap_or_default();
        let stderr_text = stderr_lines.iter().cloned().collect::<Vec<_>>().join("\n");
        bar.finish_and_clear();

        let duration = start.elapsed();
        if !status.success() {
            tracing::warn!(code = ?status.code(), "solver failed");
            return Err(RunnerError::NonZeroExit {
                code: status.code(),
                stderr_tail: stderr_text,
            });
        }

        tracing::info!(
            seconds = duration.as_secs_f64(),
            last_step = ?last_step,
            "solver finished"
        );
        Ok(RunOutcome {
            duration,
            last_step,
            stderr: stderr_text,
        })
    }

    fn wait(&self, child: &mut Child, start: Instant) -> Result<std::process::ExitStatus> {
        let timeout = self.config.timeout_secs.map(Duration::from_secs);
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if self.interrupt.load(Ordering::SeqCst) {
                tracing::warn!("interrupt received, stopping solver");
                kill(child);
                return Err(RunnerError::Interrupted);
            }
            if let Some(limit) = timeout {
                if start.elapsed() >= limit {
                    tracing::warn!(timeout_secs = limit.as_secs(), "solver timed out");
                    kill(child);
                    return Err(RunnerError::Timeout {
                        timeout_secs: limit.as_secs(),
                    });
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Kill the solver and everything it started
fn kill(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Ok(pgid) = i32::try_from(child.id()) {
            if let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                tracing::debug!(error = %e, "killpg failed, group already gone");
            }
        }
    }
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "kill failed, child already gone");
    }
    let _ = child.wait();
}

fn spawn_stdout_reader<R: Read + Send + 'static>(
    out: R,
    bar: ProgressBar,
) -> JoinHandle<Option<u64>> {
    thread::spawn(move || {
        let mut last = None;
        let mut reader = BufReader::new(out);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = String::from_utf8_lossy(&buf);
            match parse_step_line(&line) {
                StepLine::Step(step) => {
                    bar.set_position(step);
                    last = Some(step);
                }
                StepLine::Malformed(text) => {
                    tracing::debug!(line = %text, "unparsable progress line");
                }
                StepLine::Other => {}
            }
        }
        last
    })
}

fn spawn_stderr_reader<R: Read + Send + 'static>(err: R) -> JoinHandle<VecDeque<String>> {
    thread::spawn(move || {
        let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
        let mut reader = BufReader::new(err);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(String::from_utf8_lossy(&buf).trim_end().to_string());
        }
        tail
    })
}
