//! h2cost CLI - levelized hydrogen cost from markdown input files

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use h2cost::dcf::functions::FunctionRegistry;
use h2cost::{
    load_input, workflow, DcfOptions, Defaults, DiscountedCashFlow, PluginRegistry, TableStore,
    Value,
};
use h2cost_markdown::{MarkdownReadOptions, MarkdownWriteOptions, MarkdownWriter};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "h2cost")]
#[command(
    author,
    version,
    about = "Levelized hydrogen cost from a discounted cash flow model"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the model and print the levelized cost with its breakdown
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Fail on references to cells that are not finalized yet
        #[arg(long)]
        strict: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Write the annotated store to a markdown file
        #[arg(long, value_name = "FILE")]
        store_out: Option<PathBuf>,

        /// Only log errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the validated workflow step order
    Workflow {
        #[command(flatten)]
        input: InputArgs,
    },

    /// List the input tables with their group and row count
    Tables {
        #[command(flatten)]
        input: InputArgs,

        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Project input file (markdown tables)
    input: PathBuf,

    /// Defaults file the input is merged over (default: bundled defaults)
    #[arg(long, value_name = "FILE", conflicts_with = "no_defaults")]
    defaults: Option<PathBuf>,

    /// Do not merge the input over any defaults
    #[arg(long)]
    no_defaults: bool,

    /// Directory holding price index, MACRS and utility price files
    #[arg(long, value_name = "DIR")]
    lookup_dir: Option<PathBuf>,
}

impl InputArgs {
    fn defaults(&self) -> Defaults {
        match (&self.defaults, self.no_defaults) {
            (_, true) => Defaults::None,
            (Some(path), false) => Defaults::File(path.clone()),
            (None, false) => Defaults::Bundled,
        }
    }

    fn load(&self) -> Result<TableStore> {
        load_input(&self.input, &self.defaults(), &MarkdownReadOptions::default())
            .with_context(|| format!("Failed to read '{}'", self.input.display()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let quiet = matches!(cli.command, Commands::Run { quiet: true, .. });
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                if quiet {
                    "error".into()
                } else {
                    "h2cost=info".into()
                }
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run {
            input,
            strict,
            json,
            store_out,
            quiet: _,
        } => run(&input, strict, json, store_out.as_deref()),
        Commands::Workflow { input } => show_workflow(&input),
        Commands::Tables { input, json } => list_tables(&input, json),
    }
}

fn run(input: &InputArgs, strict: bool, json: bool, store_out: Option<&Path>) -> Result<()> {
    let store = input.load()?;

    let mut options = DcfOptions {
        lookup_dir: input.lookup_dir.clone(),
        ..Default::default()
    };
    options.resolve.strict_references = strict;

    let dcf = DiscountedCashFlow::run(store, &options)
        .with_context(|| format!("Failed to evaluate '{}'", input.input.display()))?;
    let results = dcf.results();

    if json {
        let breakdown: serde_json::Map<String, serde_json::Value> = results
            .contributions
            .data
            .iter()
            .map(|(label, value)| (label.clone(), value_to_json(value)))
            .collect();
        let npv: serde_json::Map<String, serde_json::Value> = results
            .npv
            .iter()
            .map(|(name, value)| (name.clone(), json!(value)))
            .collect();
        let output = json!({
            "h2_cost": results.h2_cost,
            "h2_cost_nominal": results.h2_cost_nominal,
            "total_tax_rate": results.total_tax_rate,
            "after_tax_nominal_irr": results.after_tax_nominal_irr,
            "residual": results.residual,
            "breakdown": breakdown,
            "npv": npv,
            "unprocessed": results.unprocessed,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize results")?
        );
    } else {
        println!("Levelized cost: {:.4} $/kg", results.h2_cost);
        println!();
        let width = results
            .contributions
            .data
            .keys()
            .map(String::len)
            .max()
            .unwrap_or(0);
        for (label, value) in &results.contributions.data {
            match value.as_number() {
                Some(number) => println!("  {:<width$}  {:>12.4}", label, number),
                None => println!("  {:<width$}  {:>12}", label, value),
            }
        }
        println!();
        println!("Residual NPV: {:.3e}", results.residual);
    }

    if let Some(path) = store_out {
        MarkdownWriter::write_file(dcf.store(), path, &MarkdownWriteOptions::default())
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        info!("annotated store written to '{}'", path.display());
    }

    Ok(())
}

fn show_workflow(input: &InputArgs) -> Result<()> {
    let store = input.load()?;
    let steps = workflow::plan(&store, &FunctionRegistry::new(), &PluginRegistry::new())
        .context("Invalid workflow")?;

    for (idx, step) in steps.iter().enumerate() {
        println!("{}\t{}\t{}\t{}", idx, step.position, step.kind, step.name);
    }

    Ok(())
}

fn list_tables(input: &InputArgs, json: bool) -> Result<()> {
    let store = input.load()?;

    if json {
        let tables: Vec<serde_json::Value> = store
            .tables()
            .map(|(name, table)| {
                json!({
                    "name": name,
                    "group": table.group().map(|group| group.to_string()),
                    "rows": table.len(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&tables).context("Failed to serialize tables")?
        );
        return Ok(());
    }

    for (name, table) in store.tables() {
        let group = table
            .group()
            .map(|group| group.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{}\t{}\t{}", table.len(), group, name);
    }

    Ok(())
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Number(n) => json!(n),
        Value::Array(values) => json!(values),
        Value::Text(text) => json!(text),
    }
}
