use anyhow::{Context, Result};
use bspec_graph::analysis::{analyze_impact, critical_path, find_chains};
use bspec_graph::graph::build_graph;
use bspec_graph::ingest::load_collection;
use bspec_graph::mcp::McpServer;
use bspec_graph::query::{QueryEngine, QueryOptions};
use bspec_graph::validate::validate_collection;
use bspec_graph::Config;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bspec")]
#[command(version, about = "Relationship graph analysis and queries over BSpec documents")]
struct Args {
    /// Docs folder to load instead of the configured one
    #[arg(long, global = true)]
    docs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the MCP tools over stdio
    Serve,
    /// Print the relationship graph
    Graph,
    /// Impact of changing a document
    Impact { id: String },
    /// Dependency chains, longest first
    Chains,
    /// Run a query given as camelCase JSON options, e.g. '{"types":["STR"]}'
    Query {
        #[arg(default_value = "{}")]
        options: String,
    },
    /// Documents most similar to one document
    Similar {
        id: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Collection statistics
    Stats,
    /// Validate every document and the collection
    Validate,
    /// Implementation path and blockers
    CriticalPath,
    /// Missing types, dangling references and empty domains
    Recommendations,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.docs {
        Some(docs) => Config::for_docs_folder(docs)?,
        None => Config::load()?,
    };

    // Logs go to stderr; stdout carries JSON output and the MCP transport
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.bspec.log_level.as_str())
    ).init();

    let taxonomy = config.build_taxonomy()?;
    let report = load_collection(config.docs_folder(), &taxonomy)
        .with_context(|| format!("Failed to load documents from {}", config.docs_folder().display()))?;
    for failure in &report.failures {
        log::warn!("Skipped {}: {}", failure.path, failure.errors.join("; "));
    }

    let engine = QueryEngine::new(report.into_collection(), taxonomy)
        .with_suggestion_threshold(config.query.suggestion_threshold);
    let documents = engine.documents();

    match args.command {
        Command::Serve => {
            let server = McpServer::new(engine, config.query.similar_limit);
            server.run().await?;
        }
        Command::Graph => print_json(&build_graph(documents, engine.taxonomy()))?,
        Command::Impact { id } => print_json(&analyze_impact(&id, documents))?,
        Command::Chains => print_json(&find_chains(documents))?,
        Command::Query { options } => {
            let options: QueryOptions = serde_json::from_str(&options)
                .context("Query options must be a JSON object of camelCase filters")?;
            print_json(&engine.query(&options))?;
        }
        Command::Similar { id, limit } => {
            anyhow::ensure!(engine.collection().contains(&id), "Document not found: {}", id);
            print_json(&engine.similar(&id, limit.unwrap_or(config.query.similar_limit)))?;
        }
        Command::Stats => print_json(&engine.stats())?,
        Command::Validate => {
            let report = validate_collection(engine.collection(), engine.taxonomy());
            print_json(&report)?;
            if !report.overall_valid {
                std::process::exit(1);
            }
        }
        Command::CriticalPath => print_json(&critical_path(documents, engine.taxonomy()))?,
        Command::Recommendations => print_json(&engine.recommendations())?,
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
