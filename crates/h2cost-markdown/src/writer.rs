//! Markdown table writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::MarkdownResult;
use crate::options::MarkdownWriteOptions;
use h2cost_core::{Table, TableStore};

/// Markdown file writer for (annotated) table stores
pub struct MarkdownWriter;

impl MarkdownWriter {
    /// Write a store to a markdown file
    pub fn write_file<P: AsRef<Path>>(
        store: &TableStore,
        path: P,
        options: &MarkdownWriteOptions,
    ) -> MarkdownResult<()> {
        let file = File::create(path)?;
        Self::write(store, BufWriter::new(file), options)
    }

    /// Write a store to a string
    pub fn to_string(store: &TableStore, options: &MarkdownWriteOptions) -> MarkdownResult<String> {
        let mut buffer = Vec::new();
        Self::write(store, &mut buffer, options)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Write a store to a writer
    pub fn write<W: Write>(
        store: &TableStore,
        mut writer: W,
        options: &MarkdownWriteOptions,
    ) -> MarkdownResult<()> {
        for (idx, (name, table)) in store.tables().enumerate() {
            if idx > 0 {
                writeln!(writer)?;
            }
            writeln!(writer, "# {}", name)?;
            writeln!(writer)?;

            let columns = Self::columns(table, options);
            let mut header = vec![options.row_header.as_str()];
            header.extend(columns.iter().map(String::as_str));
            writeln!(writer, "{}", header.join(" | "))?;
            writeln!(writer, "{}", vec!["---"; header.len()].join(" | "))?;

            for (row_name, row) in table.rows() {
                let mut record = vec![row_name.to_string()];
                record.extend(columns.iter().map(|column| {
                    row.get(column)
                        .map(|value| value.to_string())
                        .unwrap_or_default()
                }));
                writeln!(writer, "{}", record.join(" | "))?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Union of the columns of all rows, in first-seen order
    fn columns(table: &Table, options: &MarkdownWriteOptions) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for (_, row) in table.rows() {
            for column in row.keys() {
                if !options.include_former && column.starts_with("Former ") {
                    continue;
                }
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }
        columns
    }
}
