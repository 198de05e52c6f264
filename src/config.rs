use crate::error::{CellForgeError, CfResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub search: SearchParams,
    pub tools: ToolPaths,
    pub workspace: Workspace,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CellForgeError::Config(format!("Could not read '{}': {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CfResult<()> {
        if self.search.poll_interval_ms == 0 {
            return Err(CellForgeError::Config(
                "search.poll_interval_ms must be positive".into(),
            ));
        }
        if self.tools.abc.program.as_os_str().is_empty() {
            return Err(CellForgeError::Config("tools.abc.program is empty".into()));
        }
        Ok(())
    }
}

/// How the per-cell value list is reordered each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PermutationPolicy {
    /// Fresh random shuffle every iteration; the iteration index has no effect.
    #[default]
    Shuffle,
    /// The permutation at position `iteration mod n!`.
    Indexed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub max_iterations: usize,
    pub time_budget_secs: u64,
    pub poll_interval_ms: u64,
    pub seed: Option<u64>,
    pub permutation: PermutationPolicy,
    pub best_library: PathBuf,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_iterations: 3000,
            time_budget_secs: 9000,
            poll_interval_ms: 50,
            seed: None,
            permutation: PermutationPolicy::Shuffle,
            best_library: PathBuf::from("best_genlib.genlib"),
        }
    }
}

impl SearchParams {
    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.time_budget_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// A program plus the leading arguments every invocation starts with,
/// e.g. an interpreter and its script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<P: Into<PathBuf>>(program: P, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub abc: ToolCommand,
    pub input_converter: ToolCommand,
    pub output_converter: ToolCommand,
    pub cost_function: ToolCommand,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            abc: ToolCommand::new("./abc/abc"),
            input_converter: ToolCommand::with_args("python3", &["scripts/convert_netlist_1.py"]),
            output_converter: ToolCommand::with_args("python3", &["scripts/convert_netlist_2.py"]),
            cost_function: ToolCommand::new("./cost_function"),
        }
    }
}

/// Fixed single-slot scratch layout, reused by every iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Workspace {
    pub root: PathBuf,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            root: PathBuf::from("release"),
        }
    }
}

impl Workspace {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn converted_input(&self) -> PathBuf {
        self.root.join("net_m").join("design_m.v")
    }

    pub fn genlib(&self) -> PathBuf {
        self.root.join("genlib").join("lib.genlib")
    }

    pub fn mapped_netlist(&self) -> PathBuf {
        self.root.join("net_mapped").join("netlist_mapped.v")
    }

    pub fn converted_output(&self) -> PathBuf {
        self.root.join("net_complete").join("converted_design.v")
    }

    pub fn cost_output(&self) -> PathBuf {
        self.root.join("cost.txt")
    }

    pub fn script(&self) -> PathBuf {
        self.root.join("optimize.abc")
    }

    /// Creates every scratch directory the layout refers to.
    pub fn prepare(&self) -> std::io::Result<()> {
        let files = [
            self.converted_input(),
            self.genlib(),
            self.mapped_netlist(),
            self.converted_output(),
            self.cost_output(),
            self.script(),
        ];
        for file in &files {
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
