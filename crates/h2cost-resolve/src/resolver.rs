//! Cell resolver
//!
//! A cell holds either a number, a yearly array, a label, or a reference
//! expression: one or more `Top > Middle > Bottom` paths joined by `;`,
//! whose targets are multiplied together. Broken references never abort a
//! run; they resolve to the neutral multiplier `1` and emit a warning.

use h2cost_core::{split_components, split_paths, CellPath, Value, PATH_DELIMITER};
use tracing::warn;

use crate::error::{ResolveError, ResolveResult};
use crate::model::Model;

impl Model {
    /// Resolve one cell to a numeric value without writing anything back.
    ///
    /// A missing cell is an error; broken references inside the cell are not.
    pub fn resolve_cell(&mut self, top: &str, middle: &str, bottom: &str) -> ResolveResult<Value> {
        let raw = self.store.cell(top, middle, bottom)?.clone();
        self.resolve_raw(&raw, &CellPath::new(top, middle, bottom))
    }

    /// Resolve a raw cell value read from `at`
    pub(crate) fn resolve_raw(&mut self, raw: &Value, at: &CellPath) -> ResolveResult<Value> {
        let text = match raw {
            Value::Number(_) | Value::Array(_) => return Ok(raw.clone()),
            Value::Text(text) => text,
        };

        if !text.contains(PATH_DELIMITER) {
            return Ok(match Value::parse_literal(text) {
                Value::Number(n) => Value::Number(n),
                _ => Value::Number(1.0),
            });
        }

        let mut value = Value::Number(1.0);
        for expression in split_paths(text) {
            let target = self.resolve_path(expression, at)?;
            value = value.mul(&target)?;
        }
        Ok(value)
    }

    /// Resolve a single `Top > Middle > Bottom` expression
    fn resolve_path(&mut self, expression: &str, at: &CellPath) -> ResolveResult<Value> {
        let path = match split_components(expression).as_slice() {
            [_] => return Ok(Value::Number(1.0)),
            [top, middle, bottom] => CellPath::new(*top, *middle, *bottom),
            _ => {
                self.stats.warnings += 1;
                warn!(
                    "Invalid path specified for \"{}\" (at {}), setting to 1",
                    expression, at
                );
                return Ok(Value::Number(1.0));
            }
        };

        self.stats.lookups += 1;
        let Some(target) = self.store.get_path(&path).cloned() else {
            self.stats.warnings += 1;
            warn!(
                "Invalid path specified for \"{}\" (at {}), setting to 1",
                expression, at
            );
            return Ok(Value::Number(1.0));
        };

        if !self.memo.contains(&path) {
            if self.options.strict_references {
                return Err(ResolveError::UnfinalizedReference {
                    path,
                    by: at.clone(),
                });
            }
            self.stats.unprocessed_reads += 1;
            self.stats.warnings += 1;
            warn!("Unprocessed value is being used at {} (by {})", path, at);
        }

        if let Value::Text(_) = target {
            self.stats.warnings += 1;
            warn!(
                "Non-numerical value retrieved at {} (by {}), setting to 1",
                path, at
            );
            return Ok(Value::Number(1.0));
        }

        Ok(target)
    }
}
