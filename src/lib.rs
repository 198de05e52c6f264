pub mod config;
pub mod error;
pub mod genlib;
pub mod library;
pub mod optimizer;
pub mod toolchain;
// cmd and reports belong to the binary (main.rs).
