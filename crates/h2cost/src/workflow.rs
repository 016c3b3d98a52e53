//! Workflow declaration and step ordering
//!
//! The `Workflow` table lists the steps of a model: builtin cash flow
//! functions and registered plugins, each with a position. Steps are sorted
//! by position and then checked against their declared data schemas. A step
//! that reads a cell another step writes runs after that step, even when its
//! position says otherwise.

use std::fmt;

use h2cost_core::{CellPath, TableStore, Value};
use h2cost_resolve::DependencyGraph;
use tracing::{debug, info};

use crate::dcf::functions::FunctionRegistry;
use crate::error::{DcfError, DcfResult};
use crate::plugin::PluginRegistry;

/// Table declaring the workflow
pub const WORKFLOW_TABLE: &str = "Workflow";

/// Column holding the step kind
pub const TYPE_KEY: &str = "Type";

/// Column holding the step position
pub const POSITION_KEY: &str = "Position";

/// Kind of a workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Builtin cash flow function
    Function,
    /// Registered plugin
    Plugin,
}

impl StepKind {
    /// Parse the `Type` column
    pub fn parse(s: &str) -> Option<StepKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "function" => Some(StepKind::Function),
            "plugin" => Some(StepKind::Plugin),
            _ => None,
        }
    }

    /// Lowercase name as written in the workflow table
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Function => "function",
            StepKind::Plugin => "plugin",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the workflow table
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowStep {
    /// Function or plugin name
    pub name: String,
    /// Step kind
    pub kind: StepKind,
    /// Declared position
    pub position: f64,
}

/// Cells a step reads and writes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepSchema {
    /// Cells that must exist before the step runs
    pub reads: Vec<CellPath>,
    /// Cells the step produces
    pub writes: Vec<CellPath>,
}

impl StepSchema {
    /// Build a schema from `(top, middle, bottom)` triples
    pub fn new(reads: &[(&str, &str, &str)], writes: &[(&str, &str, &str)]) -> Self {
        let paths = |triples: &[(&str, &str, &str)]| {
            triples
                .iter()
                .map(|(top, middle, bottom)| CellPath::new(*top, *middle, *bottom))
                .collect()
        };
        Self {
            reads: paths(reads),
            writes: paths(writes),
        }
    }
}

/// Read the workflow table, sorted by position (ties keep table order)
pub fn read_steps(store: &TableStore) -> DcfResult<Vec<WorkflowStep>> {
    let table = store
        .table(WORKFLOW_TABLE)
        .ok_or_else(|| h2cost_core::Error::MissingTable(WORKFLOW_TABLE.to_string()))?;

    let mut steps = Vec::with_capacity(table.len());
    for (name, row) in table.rows() {
        let kind = row
            .get(TYPE_KEY)
            .and_then(Value::as_text)
            .and_then(StepKind::parse)
            .ok_or_else(|| DcfError::InvalidStep {
                name: name.to_string(),
                message: "Type must be 'function' or 'plugin'".to_string(),
            })?;
        let position = row
            .get(POSITION_KEY)
            .and_then(Value::as_number)
            .ok_or_else(|| DcfError::InvalidStep {
                name: name.to_string(),
                message: "Position must be a number".to_string(),
            })?;
        steps.push(WorkflowStep {
            name: name.to_string(),
            kind,
            position,
        });
    }

    steps.sort_by(|a, b| a.position.total_cmp(&b.position));
    Ok(steps)
}

/// Read, validate and order the workflow of `store`
pub fn plan(
    store: &TableStore,
    functions: &FunctionRegistry,
    plugins: &PluginRegistry,
) -> DcfResult<Vec<WorkflowStep>> {
    let steps = read_steps(store)?;
    let schemas = steps
        .iter()
        .map(|step| step_schema(step, functions, plugins))
        .collect::<DcfResult<Vec<_>>>()?;
    order_steps(steps, &schemas, store)
}

fn step_schema(
    step: &WorkflowStep,
    functions: &FunctionRegistry,
    plugins: &PluginRegistry,
) -> DcfResult<StepSchema> {
    let schema = match step.kind {
        StepKind::Function => functions.get(&step.name).map(|def| def.schema()),
        StepKind::Plugin => plugins.create(&step.name).map(|plugin| plugin.schema()),
    };
    schema.ok_or_else(|| DcfError::UnknownStep {
        name: step.name.clone(),
        kind: step.kind.as_str(),
    })
}

/// Order position-sorted steps so that producers run before consumers
pub fn order_steps(
    steps: Vec<WorkflowStep>,
    schemas: &[StepSchema],
    store: &TableStore,
) -> DcfResult<Vec<WorkflowStep>> {
    let mut graph = DependencyGraph::new();

    for (consumer, schema) in schemas.iter().enumerate() {
        graph.add_node(consumer);
        for path in &schema.reads {
            let producers: Vec<usize> = schemas
                .iter()
                .enumerate()
                .filter(|(idx, other)| *idx != consumer && other.writes.contains(path))
                .map(|(idx, _)| idx)
                .collect();

            if producers.is_empty() && store.get_path(path).is_none() {
                return Err(DcfError::MissingProducer {
                    step: steps[consumer].name.clone(),
                    path: path.clone(),
                });
            }
            for producer in producers {
                graph.add_dependency(producer, consumer);
            }
        }
    }

    let order = graph.order().map_err(|stuck| {
        let cycle = stuck
            .into_iter()
            .filter(|idx| graph.is_on_cycle(*idx))
            .map(|idx| steps[idx].name.clone())
            .collect();
        DcfError::WorkflowCycle(cycle)
    })?;

    if order.iter().enumerate().any(|(pos, idx)| pos != *idx) {
        info!("workflow steps reordered to satisfy data dependencies");
    }

    let mut slots: Vec<Option<WorkflowStep>> = steps.into_iter().map(Some).collect();
    let ordered: Vec<WorkflowStep> = order
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect();
    for step in &ordered {
        debug!(kind = %step.kind, position = step.position, "workflow step {}", step.name);
    }
    Ok(ordered)
}
