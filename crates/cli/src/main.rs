//! `pipeline-canvas` CLI entry-point.
//!
//! Available sub-commands:
//! - `export` — turn a saved canvas graph (JSON) into a workflow definition.
//! - `import` — turn a workflow definition into canvas graph JSON.
//! - `check`  — re-import a definition's export and compare job dependencies.
//!
//! Every file argument accepts `-` for stdin.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use engine::{dependency_sets, import, try_export, Graph, IdGenerator, DEFAULT_WORKFLOW_NAME};

#[derive(Parser)]
#[command(
    name = "pipeline-canvas",
    about = "Convert between CI pipeline graphs and workflow definitions",
    version
)]
struct Cli {
    /// Log more (`-v` debug, `-vv` trace). Ignored when RUST_LOG is set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a canvas graph JSON file as a workflow definition.
    Export {
        /// Path to the graph JSON (`{ "nodes": [...], "edges": [...] }`).
        path: PathBuf,
        /// Workflow `name` written into the definition.
        #[arg(long, env = "WORKFLOW_NAME", default_value = DEFAULT_WORKFLOW_NAME)]
        name: String,
    },
    /// Import a workflow definition as canvas graph JSON.
    Import {
        /// Path to the workflow YAML.
        path: PathBuf,
        /// First node number to mint (`node_<n>`).
        #[arg(long, default_value_t = 1)]
        first_id: u64,
    },
    /// Check that a workflow definition survives a graph round trip.
    Check {
        /// Path to the workflow YAML.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Export { path, name } => {
            let graph = Graph::from_json(&read_input(&path)?)
                .with_context(|| format!("invalid graph JSON in {}", path.display()))?;
            info!(
                "exporting {} node(s), {} edge(s)",
                graph.nodes.len(),
                graph.edges.len()
            );
            let text = try_export(&name, &graph.nodes, &graph.edges)?;
            print!("{text}");
        }
        Command::Import { path, first_id } => {
            let text = read_input(&path)?;
            let mut ids = IdGenerator::starting_at(first_id);
            let imported = import(&text, &mut ids)
                .with_context(|| format!("cannot import {}", path.display()))?;
            if let Some(name) = &imported.name {
                debug!("definition name: {}", name);
            }
            println!("{}", imported.graph.to_json_pretty()?);
        }
        Command::Check { path } => {
            let text = read_input(&path)?;
            let first = import(&text, &mut IdGenerator::default())
                .with_context(|| format!("cannot import {}", path.display()))?;
            let name = first.name.as_deref().unwrap_or(DEFAULT_WORKFLOW_NAME);
            let exported = try_export(name, &first.graph.nodes, &first.graph.edges)?;
            let second = import(&exported, &mut IdGenerator::default())
                .context("exported definition failed to re-import")?;

            let before = dependency_sets(&first.graph);
            let after = dependency_sets(&second.graph);
            if before != after {
                bail!("job dependencies changed across round trip: {before:?} -> {after:?}");
            }

            for (job, needs) in &before {
                if needs.is_empty() {
                    println!("{job}");
                } else {
                    let needs: Vec<&str> = needs.iter().map(String::as_str).collect();
                    println!("{job} <- {}", needs.join(", "));
                }
            }
            println!("✅ {} job(s) round-trip cleanly", before.len());
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("cannot read file {}", path.display()))
}
