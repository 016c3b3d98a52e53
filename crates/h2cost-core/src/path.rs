//! Cell paths
//!
//! A path addresses one cell of the table store with three keys,
//! written `Top > Middle > Bottom` in input files.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Delimiter between the components of a path
pub const PATH_DELIMITER: char = '>';

/// Delimiter between multiple paths in one cell (multiplicative composition)
pub const PATH_LIST_DELIMITER: char = ';';

/// Address of a single cell: table, row and column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellPath {
    /// Table name (top key)
    pub top: String,
    /// Row name (middle key)
    pub middle: String,
    /// Column name (bottom key)
    pub bottom: String,
}

impl CellPath {
    /// Create a new path
    pub fn new(
        top: impl Into<String>,
        middle: impl Into<String>,
        bottom: impl Into<String>,
    ) -> Self {
        Self {
            top: top.into(),
            middle: middle.into(),
            bottom: bottom.into(),
        }
    }

    /// Same row, different column
    pub fn with_bottom(&self, bottom: impl Into<String>) -> Self {
        Self::new(self.top.clone(), self.middle.clone(), bottom)
    }
}

/// Split `text` at `>` and trim each component
pub fn split_components(text: &str) -> Vec<&str> {
    text.split(PATH_DELIMITER).map(|part| part.trim()).collect()
}

/// Split a cell expression at `;` and trim each path
pub fn split_paths(text: &str) -> Vec<&str> {
    text.split(PATH_LIST_DELIMITER)
        .map(|part| part.trim())
        .collect()
}

impl FromStr for CellPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_components(s).as_slice() {
            [top, middle, bottom] => Ok(CellPath::new(*top, *middle, *bottom)),
            _ => Err(Error::InvalidPath(s.to_string())),
        }
    }
}

impl fmt::Display for CellPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} > {} > {}", self.top, self.middle, self.bottom)
    }
}
