use super::process::{run_until, Deadline};
use crate::config::ToolCommand;
use crate::error::ToolError;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const TOOL_NAME: &str = "abc";

/// Restructuring passes run between `strash` and `read_library`.
/// The order is frozen; do not reorder.
pub const OPTIMIZATION_PASSES: &[&str] = &[
    "strash",
    "balance",
    "rewrite",
    "rewrite -z",
    "resub",
    "refactor",
    "balance",
    "fraig",
    "compress",
    "b",
    "resyn",
    "resyn2",
    "resyn3",
    "dc2",
    "compress2",
    "dch",
    "dc2",
];

pub fn build_script(netlist: &Path, genlib: &Path, mapped: &Path) -> String {
    let mut lines = Vec::with_capacity(OPTIMIZATION_PASSES.len() + 4);
    lines.push(format!("read {}", netlist.display()));
    lines.extend(OPTIMIZATION_PASSES.iter().map(|p| p.to_string()));
    lines.push(format!("read_library {}", genlib.display()));
    lines.push("map".to_string());
    lines.push(format!("write_verilog {}", mapped.display()));

    let mut script = lines.join("\n");
    script.push('\n');
    script
}

/// Mapping Invoker: writes the script to `script_path`, runs `abc -f`,
/// and returns the mapped netlist path on a zero exit.
pub fn map_netlist(
    abc: &ToolCommand,
    netlist: &Path,
    genlib: &Path,
    mapped: &Path,
    script_path: &Path,
    deadline: &Deadline,
    poll: Duration,
) -> Result<(), ToolError> {
    let script = build_script(netlist, genlib, mapped);
    fs::write(script_path, script).map_err(|e| ToolError::io(TOOL_NAME, e))?;

    let _ = fs::remove_file(mapped);

    let mut command = abc.to_command();
    command.arg("-f").arg(script_path);
    run_until(&mut command, TOOL_NAME, deadline, poll)?;

    if !mapped.exists() {
        return Err(ToolError::malformed(
            TOOL_NAME,
            format!("no mapped netlist at '{}'", mapped.display()),
        ));
    }
    Ok(())
}
