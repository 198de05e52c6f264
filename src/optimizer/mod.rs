pub mod mutation;
pub mod runner;

use crate::error::ToolError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum_macros::Display;
use tracing::warn;

/// Best result seen so far. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct BestResult {
    pub cost: f64,
    pub netlist: PathBuf,
    pub library: PathBuf,
}

impl BestResult {
    pub fn initial<P: Into<PathBuf>, Q: Into<PathBuf>>(netlist: P, library: Q) -> Self {
        Self {
            cost: f64::INFINITY,
            netlist: netlist.into(),
            library: library.into(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.cost.is_finite()
    }

    /// Strictly lower wins; ties and NaN never replace.
    pub fn beaten_by(&self, cost: f64) -> bool {
        cost < self.cost
    }

    /// Moves this iteration's artifacts into the best slot and returns the new record.
    ///
    /// Both files are first staged next to their targets, then swapped in.
    /// On any error the slot keeps the previous netlist and genlib.
    pub fn promote(&self, cost: f64, netlist: &Path, library: &Path) -> io::Result<Self> {
        let staged_netlist = sibling(&self.netlist, STAGED_SUFFIX);
        let staged_library = sibling(&self.library, STAGED_SUFFIX);

        let staged = move_file(netlist, &staged_netlist)
            .and_then(|()| move_file(library, &staged_library));
        if let Err(e) = staged {
            discard(&staged_netlist);
            discard(&staged_library);
            return Err(e);
        }

        if let Err(e) = self.swap_in(&staged_netlist, &staged_library) {
            discard(&staged_netlist);
            discard(&staged_library);
            return Err(e);
        }

        Ok(Self {
            cost,
            netlist: self.netlist.clone(),
            library: self.library.clone(),
        })
    }

    /// Renames both staged files into place. The old netlist is parked
    /// beside the slot until the genlib lands, and put back otherwise.
    fn swap_in(&self, staged_netlist: &Path, staged_library: &Path) -> io::Result<()> {
        let backup = sibling(&self.netlist, BACKUP_SUFFIX);
        let had_previous = match fs::rename(&self.netlist, &backup) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(e),
        };

        let swapped = fs::rename(staged_netlist, &self.netlist)
            .and_then(|()| fs::rename(staged_library, &self.library));
        match swapped {
            Ok(()) => {
                if had_previous {
                    discard(&backup);
                }
                Ok(())
            }
            Err(e) => {
                if had_previous {
                    if let Err(restore) = fs::rename(&backup, &self.netlist) {
                        warn!(
                            "Could not restore previous best netlist from '{}': {}",
                            backup.display(),
                            restore
                        );
                    }
                } else {
                    discard(&self.netlist);
                }
                Err(e)
            }
        }
    }
}

const STAGED_SUFFIX: &str = ".incoming";
const BACKUP_SUFFIX: &str = ".previous";

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

fn discard(path: &Path) {
    let _ = fs::remove_file(path);
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            // Different filesystem: copy, then drop the source.
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    Generate,
    Map,
    Convert,
    Evaluate,
    Promote,
}

#[derive(Debug)]
pub enum IterationOutcome {
    Scored { cost: f64, improved: bool },
    Skipped { stage: Stage, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Termination {
    #[strum(to_string = "iteration limit reached")]
    Exhausted,
    #[strum(to_string = "wall-clock budget exhausted")]
    DeadlineExpired,
    #[strum(to_string = "stopped by callback")]
    Cancelled,
    #[strum(to_string = "interrupted by signal")]
    Interrupted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationStats {
    pub attempted: usize,
    pub scored: usize,
    pub improvements: usize,
    pub skipped_generate: usize,
    pub skipped_map: usize,
    pub skipped_convert: usize,
    pub skipped_evaluate: usize,
    pub skipped_promote: usize,
}

impl IterationStats {
    pub fn record_skip(&mut self, stage: Stage) {
        match stage {
            Stage::Generate => self.skipped_generate += 1,
            Stage::Map => self.skipped_map += 1,
            Stage::Convert => self.skipped_convert += 1,
            Stage::Evaluate => self.skipped_evaluate += 1,
            Stage::Promote => self.skipped_promote += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_generate
            + self.skipped_map
            + self.skipped_convert
            + self.skipped_evaluate
            + self.skipped_promote
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: BestResult,
    pub stats: IterationStats,
    pub termination: Termination,
    pub elapsed: Duration,
}

/// Why an iteration ended early.
#[derive(Debug)]
pub(crate) struct StageFailure {
    pub stage: Stage,
    pub reason: String,
    pub timed_out: bool,
    pub interrupted: bool,
}

impl StageFailure {
    pub fn tool(stage: Stage, error: ToolError) -> Self {
        Self {
            stage,
            timed_out: error.is_timeout(),
            interrupted: error.is_interrupt(),
            reason: error.to_string(),
        }
    }

    pub fn other(stage: Stage, error: impl std::fmt::Display) -> Self {
        Self {
            stage,
            reason: error.to_string(),
            timed_out: false,
            interrupted: false,
        }
    }
}
