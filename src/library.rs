use crate::error::{CellForgeError, CfResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, warn};

/// Fields that identify a cell and are never treated as numeric attributes.
pub const IDENTITY_FIELDS: [&str; 2] = ["cell_name", "cell_type"];

#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum CellType {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Not,
    Buf,
    Xnor,
}

impl CellType {
    /// Boolean expression written into the genlib GATE line.
    pub fn expression(&self) -> &'static str {
        match self {
            Self::And => "Y=A*B",
            Self::Or => "Y=A+B",
            Self::Xor => "Y=A*!B+!A*B",
            Self::Nand => "Y=!(A*B)",
            Self::Nor => "Y=!(A+B)",
            Self::Not => "Y=!A",
            Self::Buf => "Y=A",
            Self::Xnor => "Y=!(A^B)",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LibraryInformation {
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellRecord {
    pub cell_name: String,
    pub cell_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CellRecord {
    /// `None` for types outside the fixed function set.
    pub fn kind(&self) -> Option<CellType> {
        CellType::from_str(&self.cell_type).ok()
    }

    /// Numeric value of a field. Strings holding a number are accepted.
    pub fn attribute_value(&self, name: &str) -> Option<f64> {
        match self.fields.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryDescription {
    #[serde(default)]
    pub information: LibraryInformation,
    pub cells: Vec<CellRecord>,
}

impl LibraryDescription {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        let path = path.as_ref();
        debug!("Loading library description from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> CfResult<Self> {
        let library: LibraryDescription = serde_json::from_str(content)?;
        library.validate()?;
        Ok(library)
    }

    fn validate(&self) -> CfResult<()> {
        let mut seen = HashSet::new();
        for cell in &self.cells {
            if cell.cell_name.is_empty() {
                return Err(CellForgeError::Validation(
                    "cell with empty cell_name".to_string(),
                ));
            }
            if !seen.insert(cell.cell_name.as_str()) {
                warn!("Duplicate cell name '{}' in library", cell.cell_name);
            }
        }
        Ok(())
    }

    /// Declared attribute names in order, minus the identity fields.
    pub fn numeric_attributes(&self) -> impl Iterator<Item = &str> {
        self.information
            .attributes
            .iter()
            .map(String::as_str)
            .filter(|name| !IDENTITY_FIELDS.contains(name))
    }

    pub fn mappable_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.kind().is_some()).count()
    }
}
