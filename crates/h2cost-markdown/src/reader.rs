//! Markdown table reader

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{MarkdownError, MarkdownResult};
use crate::options::MarkdownReadOptions;
use h2cost_core::{TableStore, Value};

/// Markdown input file reader
///
/// ```text
/// # Table name
///
/// Parameter | Value | Path
/// --- | --- | ---
/// row name | 12% | Other > Table > Value
/// ```
///
/// Each `#` line opens a table, the first field of a body line names the
/// row and the remaining fields pair with the header columns.
pub struct MarkdownReader;

#[derive(Default)]
struct ParseState {
    table: Option<String>,
    header: Option<Vec<String>>,
    expect_header: bool,
    in_body: bool,
}

impl MarkdownReader {
    /// Read a markdown file into a table store
    pub fn read_file<P: AsRef<Path>>(
        path: P,
        options: &MarkdownReadOptions,
    ) -> MarkdownResult<TableStore> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read markdown from a string
    pub fn read_str(text: &str, options: &MarkdownReadOptions) -> MarkdownResult<TableStore> {
        Self::read(text.as_bytes(), options)
    }

    /// Read markdown from a reader into a table store
    pub fn read<R: Read>(reader: R, options: &MarkdownReadOptions) -> MarkdownResult<TableStore> {
        let mut store = TableStore::new();
        let mut state = ParseState::default();

        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            Self::read_line(&mut store, &mut state, &line, idx + 1, options)?;
        }

        Ok(store)
    }

    /// Read a project file merged over a defaults file (project wins per cell)
    pub fn read_with_defaults<P: AsRef<Path>, D: AsRef<Path>>(
        path: P,
        defaults: D,
        options: &MarkdownReadOptions,
    ) -> MarkdownResult<TableStore> {
        let mut store = Self::read_file(defaults, options)?;
        store.merge(Self::read_file(path, options)?);
        Ok(store)
    }

    fn read_line(
        store: &mut TableStore,
        state: &mut ParseState,
        line: &str,
        line_number: usize,
        options: &MarkdownReadOptions,
    ) -> MarkdownResult<()> {
        if line.starts_with('#') {
            let name = line.trim_matches(|c: char| c == '#' || c.is_whitespace());
            store.table_entry(name);
            state.table = Some(name.to_string());
            state.header = None;
            state.expect_header = false;
            state.in_body = false;
            return Ok(());
        }

        if line.trim().is_empty() {
            state.in_body = false;
            state.expect_header = true;
            return Ok(());
        }

        if line.starts_with('-') {
            state.in_body = true;
            state.expect_header = false;
            return Ok(());
        }

        if state.expect_header {
            state.header = Some(
                line.split(options.delimiter)
                    .map(|field| field.trim().to_string())
                    .collect(),
            );
            state.expect_header = false;
            return Ok(());
        }

        if !state.in_body {
            return Ok(());
        }

        let (Some(table), Some(header)) = (state.table.as_deref(), state.header.as_ref()) else {
            return Err(MarkdownError::Parse {
                line: line_number,
                message: "table row without a preceding table name and header".to_string(),
            });
        };

        let mut fields = line.split(options.delimiter);
        let row_name = fields.next().unwrap_or_default().trim();
        let row = store.table_entry(table).row_entry(row_name);

        for (column, field) in header.iter().skip(1).zip(fields) {
            let field = field.trim();
            let value = if options.parse_literals {
                Value::parse_literal(field)
            } else {
                Value::text(field)
            };
            row.insert(column.clone(), value);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
# Financial Input Values

Name | Value | Comment
--- | --- | ---
inflation | 1.9% | yearly
plant life | 40 |
depreciation type | MACRS | only MACRS

# Construction

Name | Value
--- | ---
1. Year | 100%
";

    #[test]
    fn test_read_tables() {
        let store = MarkdownReader::read_str(SAMPLE, &MarkdownReadOptions::default()).unwrap();

        assert_eq!(
            store.table_names(),
            vec!["Financial Input Values", "Construction"]
        );
        assert_eq!(
            store.get("Financial Input Values", "inflation", "Value"),
            Some(&Value::Number(0.019))
        );
        assert_eq!(
            store.get("Financial Input Values", "plant life", "Value"),
            Some(&Value::Number(40.0))
        );
        assert_eq!(
            store.get("Financial Input Values", "depreciation type", "Comment"),
            Some(&Value::text("only MACRS"))
        );
        assert_eq!(
            store.get("Construction", "1. Year", "Value"),
            Some(&Value::Number(1.0))
        );
    }

    #[test]
    fn test_short_row_keeps_present_columns() {
        let text = "# T\n\nName | A | B\n--- | --- | ---\nrow | 1\n";
        let store = MarkdownReader::read_str(text, &MarkdownReadOptions::default()).unwrap();

        assert_eq!(store.get("T", "row", "A"), Some(&Value::Number(1.0)));
        assert_eq!(store.get("T", "row", "B"), None);
    }

    #[test]
    fn test_raw_text_option() {
        let options = MarkdownReadOptions {
            parse_literals: false,
            ..Default::default()
        };
        let store = MarkdownReader::read_str(SAMPLE, &options).unwrap();

        assert_eq!(
            store.get("Financial Input Values", "inflation", "Value"),
            Some(&Value::text("1.9%"))
        );
    }

    #[test]
    fn test_body_without_header_is_error() {
        let text = "---\nrow | 1\n";
        let err = MarkdownReader::read_str(text, &MarkdownReadOptions::default()).unwrap_err();

        assert!(matches!(err, MarkdownError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_references_kept_as_text() {
        let text = "# Costs\n\nName | Value | Path\n--- | --- | ---\nPump | 1,000 | Scaling > Factor > Value\n";
        let store = MarkdownReader::read_str(text, &MarkdownReadOptions::default()).unwrap();

        assert_eq!(store.get("Costs", "Pump", "Value"), Some(&Value::Number(1000.0)));
        assert_eq!(
            store.get("Costs", "Pump", "Path"),
            Some(&Value::text("Scaling > Factor > Value"))
        );
    }
}
