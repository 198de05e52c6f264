use crate::error::ToolError;
use std::io::ErrorKind;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A single wall-clock budget shared by the whole run, plus the flag a
/// signal handler raises to stop it early.
#[derive(Debug, Clone)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
    interrupted: Arc<AtomicBool>,
}

impl Deadline {
    pub fn start(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared handle for a signal handler. Storing `true` makes the
    /// running tool get killed at the next poll.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    pub fn expired(&self) -> bool {
        self.elapsed() >= self.budget
    }
}

/// Runs `command` to completion, or kills it once `deadline` passes.
///
/// Success is decided by the exit status alone. Output streams are
/// inherited so the tool's own progress stays visible.
pub fn run_until(
    command: &mut Command,
    tool: &str,
    deadline: &Deadline,
    poll: Duration,
) -> Result<(), ToolError> {
    if deadline.interrupted() {
        return Err(ToolError::Interrupted {
            tool: tool.to_string(),
        });
    }
    if deadline.expired() {
        return Err(ToolError::TimedOut {
            tool: tool.to_string(),
        });
    }

    command.stdin(Stdio::null());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    debug!("Running {}: {:?}", tool, command);
    let mut child = command.spawn().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ToolError::NotFound {
                tool: tool.to_string(),
                program: command.get_program().to_string_lossy().into_owned(),
            }
        } else {
            ToolError::io(tool, e)
        }
    })?;

    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return Ok(()),
            Ok(Some(status)) => {
                return Err(ToolError::NonZeroExit {
                    tool: tool.to_string(),
                    status,
                })
            }
            Ok(None) => {}
            Err(e) => {
                kill_tree(&mut child);
                return Err(ToolError::io(tool, e));
            }
        }

        if deadline.interrupted() {
            warn!("Interrupted while {} was running; killing it", tool);
            kill_tree(&mut child);
            return Err(ToolError::Interrupted {
                tool: tool.to_string(),
            });
        }

        if deadline.expired() {
            warn!("Deadline reached while {} was running; killing it", tool);
            kill_tree(&mut child);
            return Err(ToolError::TimedOut {
                tool: tool.to_string(),
            });
        }

        thread::sleep(poll.min(deadline.remaining()).max(Duration::from_millis(1)));
    }
}

/// Kills the child's whole process group so helpers it spawned die too.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        // The child leads its own group (process_group(0) above).
        let pgid = child.id() as libc::pid_t;
        unsafe {
            libc::killpg(pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}
