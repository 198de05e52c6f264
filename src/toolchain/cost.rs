use super::process::{run_until, Deadline};
use crate::config::ToolCommand;
use crate::error::ToolError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

pub const TOOL_NAME: &str = "cost_function";
pub const COST_MARKER: &str = "cost = ";

/// Parses the first line of a cost result file.
pub fn parse_cost(content: &str) -> Result<f64, ToolError> {
    let line = content.lines().next().unwrap_or("").trim();
    if !line.contains(COST_MARKER) {
        return Err(ToolError::malformed(
            TOOL_NAME,
            format!("missing '{}' in '{}'", COST_MARKER.trim_end(), line),
        ));
    }

    // The field between the first and second '='.
    let value = line.split('=').nth(1).map(str::trim).unwrap_or_default();
    value
        .parse::<f64>()
        .map_err(|e| ToolError::malformed(TOOL_NAME, format!("bad cost '{}': {}", value, e)))
}

/// Cost Evaluator Bridge.
pub fn evaluate(
    cost_function: &ToolCommand,
    netlist: &Path,
    library: &Path,
    output: &Path,
    deadline: &Deadline,
    poll: Duration,
) -> Result<f64, ToolError> {
    let _ = fs::remove_file(output);

    let mut command = cost_function.to_command();
    command
        .arg("-library")
        .arg(library)
        .arg("-netlist")
        .arg(netlist)
        .arg("-output")
        .arg(output);
    run_until(&mut command, TOOL_NAME, deadline, poll)?;

    let content = fs::read_to_string(output).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ToolError::malformed(
            TOOL_NAME,
            format!("no result file at '{}'", output.display()),
        ),
        _ => ToolError::io(TOOL_NAME, e),
    })?;
    parse_cost(&content)
}
