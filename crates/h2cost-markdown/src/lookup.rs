//! Delimited numeric lookup tables
//!
//! Price indices, utility price series and depreciation schedules are small
//! delimited files of numbers. They are read once per `(path, delimiter)`
//! and shared across every model in the process.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use h2cost_core::nearest_index;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{MarkdownError, MarkdownResult};

/// Default delimiter of lookup files
pub const LOOKUP_DELIMITER: u8 = b'\t';

type CacheKey = (PathBuf, u8);

static LOOKUP_CACHE: Lazy<RwLock<HashMap<CacheKey, Arc<LookupTable>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// A rectangular table of numbers
///
/// Header labels in the first row are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    rows: Vec<Vec<f64>>,
}

impl LookupTable {
    /// Create a lookup table from rows
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    /// Read a lookup table, using the process-wide cache
    pub fn read_cached<P: AsRef<Path>>(path: P, delimiter: u8) -> MarkdownResult<Arc<LookupTable>> {
        let key = (path.as_ref().to_path_buf(), delimiter);

        if let Some(table) = LOOKUP_CACHE
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(Self::read_file(&key.0, delimiter)?);
        debug!(path = %key.0.display(), "lookup table cached");
        LOOKUP_CACHE
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Read a lookup table from a file, bypassing the cache
    pub fn read_file<P: AsRef<Path>>(path: P, delimiter: u8) -> MarkdownResult<LookupTable> {
        let file = std::fs::File::open(path.as_ref())?;
        let table = Self::read(file, delimiter)?;
        if table.is_empty() {
            return Err(MarkdownError::EmptyLookup {
                path: path.as_ref().to_path_buf(),
            });
        }
        Ok(table)
    }

    /// Read a lookup table from a reader.
    ///
    /// Only the first row may hold labels; they are stored as NaN. Every
    /// other field must be a number and every row as wide as the first.
    pub fn read<R: Read>(reader: R, delimiter: u8) -> MarkdownResult<LookupTable> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows: Vec<Vec<f64>> = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            let line = record.position().map_or(0, |pos| pos.line() as usize);

            if let Some(width) = rows.first().map(Vec::len) {
                if record.len() != width {
                    return Err(MarkdownError::Parse {
                        line,
                        message: format!("expected {} fields, found {}", width, record.len()),
                    });
                }
            }

            let header = rows.is_empty();
            let row = record
                .iter()
                .map(|field| match field.parse::<f64>() {
                    Ok(number) => Ok(number),
                    Err(_) if header => Ok(f64::NAN),
                    Err(_) => Err(MarkdownError::Parse {
                        line,
                        message: format!("'{}' is not a number", field),
                    }),
                })
                .collect::<MarkdownResult<Vec<f64>>>()?;
            rows.push(row);
        }

        Ok(Self { rows })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow the rows
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// One column, empty when `index` is past the last column
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(index).copied())
            .collect()
    }

    /// Index of the row whose first column is nearest to `key`
    pub fn nearest_row(&self, key: f64) -> Option<usize> {
        nearest_index(&self.column(0), key)
    }

    /// Second-column value of the row nearest to `key`
    ///
    /// This is the `(year, value)` lookup used for price indices.
    pub fn value_at(&self, key: f64) -> Option<f64> {
        let row = self.nearest_row(key)?;
        self.rows[row].get(1).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const INDEX: &str = "2000\t100\n2005\t110\n2010\t125\n";

    #[test]
    fn test_read_and_lookup() {
        let table = LookupTable::read(INDEX.as_bytes(), LOOKUP_DELIMITER).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.value_at(2005.0), Some(110.0));
        assert_eq!(table.value_at(2008.0), Some(125.0));
        assert_eq!(table.value_at(1950.0), Some(100.0));
    }

    #[test]
    fn test_header_fields_are_nan() {
        let table = LookupTable::read("Year\t3\t5\n1\t33.33\t20\n".as_bytes(), b'\t').unwrap();

        assert!(table.rows()[0][0].is_nan());
        assert_eq!(table.rows()[0][1..], [3.0, 5.0]);
        assert_eq!(table.column(2), vec![5.0, 20.0]);
    }

    #[test]
    fn test_label_outside_header_is_error() {
        let err = LookupTable::read("Year\t3\n1\tabc\n".as_bytes(), b'\t').unwrap_err();
        match err {
            MarkdownError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("abc"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_short_row_is_error() {
        let err = LookupTable::read("2000\t100\n2005\n".as_bytes(), b'\t').unwrap_err();
        assert!(matches!(err, MarkdownError::Parse { line: 2, .. }), "{:?}", err);
    }

    #[test]
    fn test_read_cached_shares_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(INDEX.as_bytes()).unwrap();

        let first = LookupTable::read_cached(file.path(), LOOKUP_DELIMITER).unwrap();
        let second = LookupTable::read_cached(file.path(), LOOKUP_DELIMITER).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_empty_file_is_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            LookupTable::read_file(file.path(), LOOKUP_DELIMITER),
            Err(MarkdownError::EmptyLookup { .. })
        ));
    }
}
