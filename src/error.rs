use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CellForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Setup Failed: {0}")]
    Setup(#[source] ToolError),
}

pub type CfResult<T> = Result<T, CellForgeError>;

/// Outcome of a call across the external-process boundary.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{tool} not found ('{program}')")]
    NotFound { tool: String, program: String },

    #[error("{tool} exited with {status}")]
    NonZeroExit { tool: String, status: ExitStatus },

    #[error("{tool} abandoned: wall-clock budget exhausted")]
    TimedOut { tool: String },

    #[error("{tool} abandoned: run interrupted")]
    Interrupted { tool: String },

    #[error("Malformed output from {tool}: {detail}")]
    MalformedOutput { tool: String, detail: String },

    #[error("IO Error around {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ToolError::TimedOut { .. })
    }

    pub fn is_interrupt(&self) -> bool {
        matches!(self, ToolError::Interrupted { .. })
    }

    pub fn io(tool: &str, source: std::io::Error) -> Self {
        ToolError::Io {
            tool: tool.to_string(),
            source,
        }
    }

    pub fn malformed(tool: &str, detail: impl Into<String>) -> Self {
        ToolError::MalformedOutput {
            tool: tool.to_string(),
            detail: detail.into(),
        }
    }
}
