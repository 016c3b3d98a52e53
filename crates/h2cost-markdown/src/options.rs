//! Markdown options

/// Options for reading markdown input files
#[derive(Debug, Clone)]
pub struct MarkdownReadOptions {
    /// Column delimiter (default: `|`)
    pub delimiter: char,
    /// Convert numeric literals (`1,234`, `12%`) to numbers
    pub parse_literals: bool,
}

impl Default for MarkdownReadOptions {
    fn default() -> Self {
        Self {
            delimiter: '|',
            parse_literals: true,
        }
    }
}

/// Options for writing markdown files
#[derive(Debug, Clone)]
pub struct MarkdownWriteOptions {
    /// Header of the first column, which holds the row names
    pub row_header: String,
    /// Write the `Former <column>` archive columns
    pub include_former: bool,
}

impl Default for MarkdownWriteOptions {
    fn default() -> Self {
        Self {
            row_header: "Name".to_string(),
            include_former: true,
        }
    }
}
