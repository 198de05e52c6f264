use crate::config::{Config, PermutationPolicy};
use crate::error::{CellForgeError, CfResult};
use crate::genlib;
use crate::library::LibraryDescription;
use crate::optimizer::{
    BestResult, IterationOutcome, IterationStats, SearchOutcome, Stage, StageFailure, Termination,
};
use crate::toolchain::{Deadline, Toolchain};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct SearchOptions {
    pub max_iterations: usize,
    pub seed: Option<u64>,
    pub permutation: PermutationPolicy,
    pub genlib_path: PathBuf,
    pub best_netlist: PathBuf,
    pub best_library: PathBuf,
}

impl From<&Config> for SearchOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            max_iterations: cfg.search.max_iterations,
            seed: cfg.search.seed,
            permutation: cfg.search.permutation,
            genlib_path: cfg.workspace.genlib(),
            best_netlist: PathBuf::from("optimized_design.v"), // Set from the CLI
            best_library: cfg.search.best_library.clone(),
        }
    }
}

/// Receives every finished iteration.
/// Returning false stops the search after the current iteration.
pub trait ProgressCallback {
    fn on_iteration(&self, index: usize, outcome: &IterationOutcome, best: &BestResult) -> bool;
}

pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_iteration(&self, _: usize, _: &IterationOutcome, _: &BestResult) -> bool {
        true
    }
}

/// What one search run reads: the converted input plus the library.
pub struct SearchInputs<'a> {
    pub netlist: &'a Path,
    pub library: &'a LibraryDescription,
    pub library_path: &'a Path,
}

pub struct Optimizer {
    options: SearchOptions,
}

impl Optimizer {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn run<T: Toolchain, CB: ProgressCallback>(
        &self,
        toolchain: &T,
        inputs: &SearchInputs<'_>,
        deadline: &Deadline,
        callback: &CB,
    ) -> CfResult<SearchOutcome> {
        let opts = &self.options;

        let mut rng = if let Some(s) = opts.seed {
            fastrand::Rng::with_seed(s)
        } else {
            fastrand::Rng::new()
        };
        let mut best = BestResult::initial(&opts.best_netlist, &opts.best_library);
        let mut stats = IterationStats::default();

        // 1. One-off input conversion. Anything but a timeout is fatal.
        let prepared = match toolchain.prepare_input(inputs.netlist, deadline) {
            Ok(path) => path,
            Err(e) if e.is_timeout() => {
                warn!("Budget ran out during input conversion");
                return Ok(finish(best, stats, Termination::DeadlineExpired, deadline));
            }
            Err(e) if e.is_interrupt() => {
                warn!("Interrupted during input conversion");
                return Ok(finish(best, stats, Termination::Interrupted, deadline));
            }
            Err(e) => return Err(CellForgeError::Setup(e)),
        };

        let dropped: Vec<&str> = inputs
            .library
            .cells
            .iter()
            .filter(|c| c.kind().is_none())
            .map(|c| c.cell_name.as_str())
            .collect();
        if !dropped.is_empty() {
            warn!(
                "{} of {} cells have an unsupported cell_type and will never be written: {}",
                dropped.len(),
                inputs.library.cells.len(),
                dropped.join(", ")
            );
        }

        // 2. Main loop
        let mut termination = Termination::Exhausted;
        for index in 0..opts.max_iterations {
            if deadline.interrupted() {
                termination = Termination::Interrupted;
                break;
            }
            if deadline.expired() {
                termination = Termination::DeadlineExpired;
                break;
            }
            stats.attempted += 1;

            let outcome = match self.step(toolchain, inputs, &prepared, index, &mut rng, &best, deadline) {
                Ok((cost, promoted)) => {
                    stats.scored += 1;
                    let improved = promoted.is_some();
                    if let Some(next) = promoted {
                        stats.improvements += 1;
                        best = next;
                    }
                    IterationOutcome::Scored { cost, improved }
                }
                Err(failure) if failure.interrupted => {
                    debug!("Iteration {} interrupted at {}", index + 1, failure.stage);
                    termination = Termination::Interrupted;
                    break;
                }
                Err(failure) if failure.timed_out => {
                    debug!("Iteration {} abandoned at {}", index + 1, failure.stage);
                    termination = Termination::DeadlineExpired;
                    break;
                }
                Err(failure) => {
                    stats.record_skip(failure.stage);
                    IterationOutcome::Skipped {
                        stage: failure.stage,
                        reason: failure.reason,
                    }
                }
            };

            if !callback.on_iteration(index, &outcome, &best) {
                termination = Termination::Cancelled;
                break;
            }
        }

        info!(
            "Search finished ({}): {} attempted, {} scored, {} skipped",
            termination,
            stats.attempted,
            stats.scored,
            stats.skipped()
        );
        Ok(finish(best, stats, termination, deadline))
    }

    /// GENERATE → MAP → CONVERT → EVALUATE → COMPARE for one index.
    /// Returns the cost and, on strict improvement, the promoted best record.
    #[allow(clippy::too_many_arguments)]
    fn step<T: Toolchain>(
        &self,
        toolchain: &T,
        inputs: &SearchInputs<'_>,
        prepared: &Path,
        index: usize,
        rng: &mut fastrand::Rng,
        best: &BestResult,
        deadline: &Deadline,
    ) -> Result<(f64, Option<BestResult>), StageFailure> {
        let opts = &self.options;

        let candidate = genlib::write_candidate(
            inputs.library,
            index,
            opts.permutation,
            rng,
            &opts.genlib_path,
        )
        .map_err(|e| StageFailure::other(Stage::Generate, e))?;
        debug!(
            "Candidate {}: {} gates, {} skipped",
            index + 1,
            candidate.gates_written,
            candidate.skipped_cells.len()
        );

        let mapped = toolchain
            .map(prepared, &candidate.path, deadline)
            .map_err(|e| StageFailure::tool(Stage::Map, e))?;
        let converted = toolchain
            .convert_output(&mapped, deadline)
            .map_err(|e| StageFailure::tool(Stage::Convert, e))?;
        let cost = toolchain
            .evaluate(&converted, inputs.library_path, deadline)
            .map_err(|e| StageFailure::tool(Stage::Evaluate, e))?;

        if !best.beaten_by(cost) {
            return Ok((cost, None));
        }
        let next = best
            .promote(cost, &converted, &candidate.path)
            .map_err(|e| StageFailure::other(Stage::Promote, e))?;
        Ok((cost, Some(next)))
    }
}

fn finish(
    best: BestResult,
    stats: IterationStats,
    termination: Termination,
    deadline: &Deadline,
) -> SearchOutcome {
    SearchOutcome {
        best,
        stats,
        termination,
        elapsed: deadline.elapsed(),
    }
}
