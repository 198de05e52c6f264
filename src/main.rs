use cellforge::config::Config;
use cellforge::toolchain::Deadline;
use clap::Parser;
use std::env;
use std::ffi::OsString;
use std::process;
use std::sync::atomic::Ordering;
use tracing::{error, info, warn};

mod cmd;
mod reports;

/// Optional JSON file overriding the built-in search constants and tool paths.
const CONFIG_ENV: &str = "CELLFORGE_CONFIG";

/// Exit status after SIGINT/SIGTERM, as a shell would report it.
const INTERRUPTED_EXIT: i32 = 130;

/// Long flags the contest harness passes with a single dash.
const LEGACY_FLAGS: [&str; 4] = ["-netlist", "-library", "-cost_function", "-output"];

#[derive(Parser, Debug)]
#[command(author, version, about = "Cell-library parameter search driver", long_about = None)]
struct Cli {
    #[command(flatten)]
    search: cmd::search::SearchArgs,
}

fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some(s) if LEGACY_FLAGS.contains(&s) => OsString::from(format!("-{}", s)),
            Some(s) => match s.split_once('=') {
                Some((flag, value)) if LEGACY_FLAGS.contains(&flag) => {
                    OsString::from(format!("-{}={}", flag, value))
                }
                _ => arg,
            },
            None => arg,
        })
        .collect()
}

fn main() {
    // The budget covers everything from here on, setup included.
    let config = match env::var_os(CONFIG_ENV) {
        Some(path) => Config::load_from_file(&path).unwrap_or_else(|e| {
            eprintln!("❌ {}: {}", CONFIG_ENV, e);
            process::exit(1);
        }),
        None => Config::default(),
    };
    let deadline = Deadline::start(config.search.time_budget());

    tracing_subscriber::fmt::init();

    let cli = Cli::parse_from(normalize_args(env::args_os()));

    info!("🚀 Initializing CellForge...");
    if env::var_os(CONFIG_ENV).is_some() {
        info!("⚙️  Using configuration from ${}", CONFIG_ENV);
    }
    if config.search.max_iterations == 0 {
        error!("search.max_iterations is 0; nothing will be tried");
    }

    // Tools run in their own process group, so the terminal's Ctrl-C only
    // reaches us. The flag makes the poll loop kill the running group.
    let flag = deadline.interrupt_flag();
    if let Err(e) = ctrlc::set_handler(move || {
        if !flag.swap(true, Ordering::SeqCst) {
            eprintln!("\nInterrupt received, stopping the running tool...");
        }
    }) {
        warn!("Could not install the interrupt handler: {}", e);
    }

    cmd::search::run(cli.search, config, &deadline);

    if deadline.interrupted() {
        process::exit(INTERRUPTED_EXIT);
    }
}
