use crate::reports;
use cellforge::config::{Config, ToolCommand};
use cellforge::library::LibraryDescription;
use cellforge::optimizer::runner::{Optimizer, ProgressCallback, SearchInputs, SearchOptions};
use cellforge::optimizer::{BestResult, IterationOutcome};
use cellforge::toolchain::{Deadline, ExternalToolchain};
use clap::Args;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Path to the netlist file (design.v)
    #[arg(long)]
    pub netlist: PathBuf,

    /// Path to the library file (lib.json)
    #[arg(long)]
    pub library: PathBuf,

    /// Path to the cost function executable
    #[arg(long = "cost_function", alias = "cost-function")]
    pub cost_function: PathBuf,

    /// Path to the output file (optimized_design.v)
    #[arg(long)]
    pub output: PathBuf,
}

struct ConsoleProgress;

impl ProgressCallback for ConsoleProgress {
    fn on_iteration(&self, index: usize, outcome: &IterationOutcome, best: &BestResult) -> bool {
        let n = index + 1;
        match outcome {
            IterationOutcome::Scored { cost, improved } => {
                info!("Cost for iteration {}: {}", n, cost);
                if *improved {
                    info!(
                        "🔥 New best netlist found: {} with cost {} and genlib {}",
                        best.netlist.display(),
                        best.cost,
                        best.library.display()
                    );
                }
            }
            IterationOutcome::Skipped { stage, reason } => {
                warn!("Skipping iteration {} due to {} error: {}", n, stage, reason);
            }
        }
        true
    }
}

pub fn run(args: SearchArgs, mut config: Config, deadline: &Deadline) {
    info!(
        "⏱️  Budget: {} s, up to {} iterations",
        config.search.time_budget_secs, config.search.max_iterations
    );

    info!("📂 Loading Library: {}", args.library.display());
    let library = match LibraryDescription::load_from_file(&args.library) {
        Ok(lib) => lib,
        Err(e) => {
            error!("❌ Failed to load library '{}': {}", args.library.display(), e);
            reports::print_elapsed(deadline.elapsed());
            return;
        }
    };
    info!(
        "   {} cells, {} declared attributes",
        library.cells.len(),
        library.numeric_attributes().count()
    );

    config.tools.cost_function = ToolCommand::new(&args.cost_function);
    let toolchain = ExternalToolchain::new(&config);

    let mut options = SearchOptions::from(&config);
    options.best_netlist = args.output.clone();
    let optimizer = Optimizer::new(options);

    let inputs = SearchInputs {
        netlist: &args.netlist,
        library: &library,
        library_path: &args.library,
    };

    match optimizer.run(&toolchain, &inputs, deadline, &ConsoleProgress) {
        Ok(outcome) => reports::print_summary(&outcome),
        Err(e) => {
            error!("❌ {}", e);
            reports::print_elapsed(deadline.elapsed());
        }
    }
}
