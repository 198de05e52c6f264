use super::process::{run_until, Deadline};
use crate::config::ToolCommand;
use crate::error::ToolError;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Runs a `<converter> <input> <output>` format translator.
pub fn convert_netlist(
    converter: &ToolCommand,
    tool: &str,
    input: &Path,
    output: &Path,
    deadline: &Deadline,
    poll: Duration,
) -> Result<(), ToolError> {
    let _ = fs::remove_file(output);

    let mut command = converter.to_command();
    command.arg(input).arg(output);
    run_until(&mut command, tool, deadline, poll)?;

    if !output.exists() {
        return Err(ToolError::malformed(
            tool,
            format!("no output written to '{}'", output.display()),
        ));
    }
    Ok(())
}
