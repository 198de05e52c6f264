use crate::config::PermutationPolicy;
use crate::error::CfResult;
use crate::library::{CellType, LibraryDescription};
use crate::optimizer::mutation::{derive_parameters, ParameterSet};
use fastrand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// A generated genlib file and what went into it.
#[derive(Debug, Clone)]
pub struct CandidateLibrary {
    pub path: PathBuf,
    pub gates_written: usize,
    pub skipped_cells: Vec<String>,
}

/// In-memory rendering of one candidate.
#[derive(Debug, Clone, Default)]
pub struct RenderedGenlib {
    pub text: String,
    pub gates_written: usize,
    pub skipped_cells: Vec<String>,
}

/// Numbers are written the way the contest flow always wrote them:
/// integral values keep a trailing `.0`.
fn fmt_value(v: f64) -> String {
    format!("{:?}", v)
}

pub fn gate_record(name: &str, kind: CellType, p: &ParameterSet) -> String {
    format!(
        "GATE {} {} {};\n    PIN * NONINV {} {} {} {} {} {}\n",
        name,
        fmt_value(p.area),
        kind.expression(),
        fmt_value(p.input_load),
        fmt_value(p.max_load),
        fmt_value(p.rise_block_delay),
        fmt_value(p.rise_fanout_delay),
        fmt_value(p.fall_block_delay),
        fmt_value(p.fall_fanout_delay),
    )
}

pub fn render_candidate(
    library: &LibraryDescription,
    iteration: usize,
    policy: PermutationPolicy,
    rng: &mut Rng,
) -> RenderedGenlib {
    let mut out = RenderedGenlib::default();

    for cell in &library.cells {
        // Parameters are drawn before the type check so the rng stream
        // does not depend on which cells get dropped.
        let params = derive_parameters(cell, library, iteration, policy, rng);

        let Some(kind) = cell.kind() else {
            out.skipped_cells.push(cell.cell_name.clone());
            continue;
        };

        out.text.push_str(&gate_record(&cell.cell_name, kind, &params));
        out.gates_written += 1;
    }

    out
}

/// Candidate Generator: renders the candidate for `iteration` and writes it to `path`.
pub fn write_candidate(
    library: &LibraryDescription,
    iteration: usize,
    policy: PermutationPolicy,
    rng: &mut Rng,
    path: &Path,
) -> CfResult<CandidateLibrary> {
    let rendered = render_candidate(library, iteration, policy, rng);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, &rendered.text)?;

    Ok(CandidateLibrary {
        path: path.to_path_buf(),
        gates_written: rendered.gates_written,
        skipped_cells: rendered.skipped_cells,
    })
}
