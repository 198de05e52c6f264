pub mod abc;
pub mod convert;
pub mod cost;
pub mod process;

pub use self::process::Deadline;
use crate::config::{Config, ToolPaths, Workspace};
use crate::error::ToolError;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const INPUT_CONVERTER: &str = "input_converter";
pub const OUTPUT_CONVERTER: &str = "output_converter";

/// The external stages one iteration passes through.
///
/// Every call is blocking and must give up once `deadline` expires or is interrupted.
pub trait Toolchain {
    /// Converts the caller's netlist into the engine's input format (once per run).
    fn prepare_input(&self, netlist: &Path, deadline: &Deadline) -> Result<PathBuf, ToolError>;

    /// Maps `netlist` against the candidate genlib.
    fn map(&self, netlist: &Path, genlib: &Path, deadline: &Deadline)
        -> Result<PathBuf, ToolError>;

    /// Converts the mapped netlist back to the evaluator's format.
    fn convert_output(&self, mapped: &Path, deadline: &Deadline) -> Result<PathBuf, ToolError>;

    /// Scores `netlist` against the input library description.
    fn evaluate(&self, netlist: &Path, library: &Path, deadline: &Deadline)
        -> Result<f64, ToolError>;
}

/// The real flow: converter scripts, ABC, and the contest cost binary.
pub struct ExternalToolchain {
    tools: ToolPaths,
    workspace: Workspace,
    poll: Duration,
}

impl ExternalToolchain {
    pub fn new(config: &Config) -> Self {
        Self {
            tools: config.tools.clone(),
            workspace: config.workspace.clone(),
            poll: config.search.poll_interval(),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
}

impl Toolchain for ExternalToolchain {
    fn prepare_input(&self, netlist: &Path, deadline: &Deadline) -> Result<PathBuf, ToolError> {
        self.workspace
            .prepare()
            .map_err(|e| ToolError::io(INPUT_CONVERTER, e))?;
        let out = self.workspace.converted_input();
        convert::convert_netlist(
            &self.tools.input_converter,
            INPUT_CONVERTER,
            netlist,
            &out,
            deadline,
            self.poll,
        )?;
        Ok(out)
    }

    fn map(
        &self,
        netlist: &Path,
        genlib: &Path,
        deadline: &Deadline,
    ) -> Result<PathBuf, ToolError> {
        let mapped = self.workspace.mapped_netlist();
        abc::map_netlist(
            &self.tools.abc,
            netlist,
            genlib,
            &mapped,
            &self.workspace.script(),
            deadline,
            self.poll,
        )?;
        Ok(mapped)
    }

    fn convert_output(&self, mapped: &Path, deadline: &Deadline) -> Result<PathBuf, ToolError> {
        let out = self.workspace.converted_output();
        convert::convert_netlist(
            &self.tools.output_converter,
            OUTPUT_CONVERTER,
            mapped,
            &out,
            deadline,
            self.poll,
        )?;
        Ok(out)
    }

    fn evaluate(
        &self,
        netlist: &Path,
        library: &Path,
        deadline: &Deadline,
    ) -> Result<f64, ToolError> {
        cost::evaluate(
            &self.tools.cost_function,
            netlist,
            library,
            &self.workspace.cost_output(),
            deadline,
            self.poll,
        )
    }
}
