//! Loading model input from markdown files

use std::path::{Path, PathBuf};

use h2cost_core::TableStore;
use h2cost_markdown::{MarkdownReadOptions, MarkdownReader};
use tracing::debug;

use crate::error::DcfResult;

/// Standard workflow and financial inputs shipped with the crate
pub const BUNDLED_DEFAULTS: &str = include_str!("../data/defaults.md");

/// Defaults the project file is merged over
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Defaults {
    /// The bundled defaults
    #[default]
    Bundled,
    /// A defaults file on disk
    File(PathBuf),
    /// No defaults; the project file must be complete
    None,
}

/// Parse the bundled defaults
pub fn bundled_defaults(options: &MarkdownReadOptions) -> DcfResult<TableStore> {
    Ok(MarkdownReader::read_str(BUNDLED_DEFAULTS, options)?)
}

/// Read a project file merged over `defaults`; the project wins per cell
pub fn load_input<P: AsRef<Path>>(
    path: P,
    defaults: &Defaults,
    options: &MarkdownReadOptions,
) -> DcfResult<TableStore> {
    let project = MarkdownReader::read_file(path.as_ref(), options)?;
    debug!(
        tables = project.len(),
        "read project file {}",
        path.as_ref().display()
    );
    merge_over_defaults(project, defaults, options)
}

/// Like [`load_input`], for project text already in memory
pub fn load_input_str(
    text: &str,
    defaults: &Defaults,
    options: &MarkdownReadOptions,
) -> DcfResult<TableStore> {
    let project = MarkdownReader::read_str(text, options)?;
    merge_over_defaults(project, defaults, options)
}

fn merge_over_defaults(
    project: TableStore,
    defaults: &Defaults,
    options: &MarkdownReadOptions,
) -> DcfResult<TableStore> {
    let mut store = match defaults {
        Defaults::Bundled => bundled_defaults(options)?,
        Defaults::File(path) => MarkdownReader::read_file(path, options)?,
        Defaults::None => return Ok(project),
    };
    store.merge(project);
    Ok(store)
}
