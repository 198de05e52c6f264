#![allow(dead_code)] // Not every test file uses every helper

use cellforge::error::ToolError;
use cellforge::library::LibraryDescription;
use cellforge::toolchain::{Deadline, Toolchain};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// Two-cell library from the contest samples (and + xor).
pub const TWO_CELL_LIBRARY: &str = r#"{
    "information": {
        "cost_function": "area*delay",
        "attributes": ["cell_name", "cell_type", "area", "rise_block_delay", "fall_block_delay"]
    },
    "cells": [
        {"cell_name": "G1", "cell_type": "and", "area": 1.0, "rise_block_delay": 0.5, "fall_block_delay": 0.25},
        {"cell_name": "G2", "cell_type": "xor", "area": "2.5", "rise_block_delay": 0.75, "fall_block_delay": 0.125}
    ]
}"#;

pub fn two_cell_library() -> LibraryDescription {
    LibraryDescription::from_json_str(TWO_CELL_LIBRARY).unwrap()
}

/// Builds a library JSON with `attrs` declared and `(name, type)` cells
/// whose attribute values count up from 2.0.
pub fn library_json(attrs: &[&str], cells: &[(&str, &str)]) -> String {
    let attr_list: Vec<String> = attrs.iter().map(|a| format!("\"{}\"", a)).collect();
    let mut cell_list = Vec::new();
    for (name, kind) in cells {
        let mut fields = vec![
            format!("\"cell_name\": \"{}\"", name),
            format!("\"cell_type\": \"{}\"", kind),
        ];
        for (i, a) in attrs.iter().enumerate() {
            fields.push(format!("\"{}\": {}", a, 2.0 + i as f64));
        }
        cell_list.push(format!("{{{}}}", fields.join(", ")));
    }
    format!(
        r#"{{"information": {{"attributes": [{}]}}, "cells": [{}]}}"#,
        attr_list.join(", "),
        cell_list.join(", ")
    )
}

/// Scripted stand-in for the external tools.
///
/// `map` and `convert_output` write real files so promotion can move
/// them; `evaluate` pops the next scripted cost.
pub struct FakeToolchain {
    pub dir: PathBuf,
    pub costs: RefCell<VecDeque<Result<f64, ToolError>>>,
    pub map_results: RefCell<VecDeque<Result<(), ToolError>>>,
    pub prepare_result: RefCell<Option<ToolError>>,
    pub calls: RefCell<Vec<String>>,
    pub conversions: RefCell<usize>,
}

impl FakeToolchain {
    pub fn new(dir: &Path, costs: Vec<Result<f64, ToolError>>) -> Self {
        Self {
            dir: dir.to_path_buf(),
            costs: RefCell::new(costs.into()),
            map_results: RefCell::new(VecDeque::new()),
            prepare_result: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
            conversions: RefCell::new(0),
        }
    }

    pub fn fail_prepare(self, err: ToolError) -> Self {
        *self.prepare_result.borrow_mut() = Some(err);
        self
    }

    pub fn with_map_results(self, results: Vec<Result<(), ToolError>>) -> Self {
        *self.map_results.borrow_mut() = results.into();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Toolchain for FakeToolchain {
    fn prepare_input(&self, netlist: &Path, _: &Deadline) -> Result<PathBuf, ToolError> {
        self.calls.borrow_mut().push("prepare".into());
        if let Some(err) = self.prepare_result.borrow_mut().take() {
            return Err(err);
        }
        Ok(netlist.to_path_buf())
    }

    fn map(&self, _: &Path, genlib: &Path, _: &Deadline) -> Result<PathBuf, ToolError> {
        self.calls.borrow_mut().push("map".into());
        if let Some(res) = self.map_results.borrow_mut().pop_front() {
            res?;
        }
        assert!(genlib.exists(), "candidate genlib must exist before mapping");
        let out = self.dir.join("mapped.v");
        fs::write(&out, "mapped").unwrap();
        Ok(out)
    }

    fn convert_output(&self, _: &Path, _: &Deadline) -> Result<PathBuf, ToolError> {
        self.calls.borrow_mut().push("convert".into());
        let mut n = self.conversions.borrow_mut();
        *n += 1;
        let out = self.dir.join("converted.v");
        fs::write(&out, format!("// conversion {}\n", *n)).unwrap();
        Ok(out)
    }

    fn evaluate(&self, _: &Path, _: &Path, _: &Deadline) -> Result<f64, ToolError> {
        self.calls.borrow_mut().push("evaluate".into());
        self.costs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ToolError::malformed("cost_function", "script exhausted")))
    }
}
