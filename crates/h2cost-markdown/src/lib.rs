//! # h2cost-markdown
//!
//! Markdown table reader and writer, plus delimited lookup tables, for h2cost.

mod error;
mod lookup;
mod options;
mod reader;
mod writer;

pub use error::{MarkdownError, MarkdownResult};
pub use lookup::{LookupTable, LOOKUP_DELIMITER};
pub use options::{MarkdownReadOptions, MarkdownWriteOptions};
pub use reader::MarkdownReader;
pub use writer::MarkdownWriter;
