//! Command-line front end for the capability index.
//!
//! Lists and shows catalog entries, runs cross-reference validation, and
//! writes derived artifacts (OpenAPI document, service graph encodings,
//! capability index) under the configured output directory. The catalog root
//! comes from `--root`, `INDEX_ROOT`, or the nearest ancestor holding
//! `repos.yml`/`index.toml`.

use anyhow::{Context, Result};
use capindex::render::{action_table, actions_report, capability_table, full_report, repo_report, repo_table};
use capindex::{
    ActionFilter, CapabilityFilter, Catalog, CatalogError, EntityKind, IndexRoot, RepoFilter, Tier,
    filter_actions, filter_capabilities, filter_repos, validate_actions, validate_all,
    validate_repos, write_capability_index, write_graphs, write_openapi,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "index-cli", version)]
#[command(about = "Query, validate and generate artifacts from the capability index", long_about = None)]
struct Cli {
    /// Catalog root holding repos.yml and actions.yml
    #[arg(long, global = true, env = "INDEX_ROOT")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect repositories
    Repos {
        #[command(subcommand)]
        command: ReposCommand,
    },
    /// Inspect capabilities
    #[command(alias = "caps")]
    Capabilities {
        #[command(subcommand)]
        command: CapabilitiesCommand,
    },
    /// Inspect actions
    Actions {
        #[command(subcommand)]
        command: ActionsCommand,
    },
    /// Check catalog cross-references
    Validate {
        #[command(subcommand)]
        target: ValidateTarget,
        /// Report format
        #[arg(short, long, global = true, default_value = "text")]
        format: ReportFormat,
    },
    /// Write derived artifacts
    #[command(alias = "gen")]
    Generate {
        #[command(subcommand)]
        command: GenerateCommand,
    },
}

#[derive(Subcommand)]
enum ReposCommand {
    /// List repositories, optionally filtered
    List {
        #[command(flatten)]
        filter: RepoFilterArgs,
        #[arg(short, long, default_value = "table")]
        format: ListFormat,
    },
    /// Show one repository by id or name
    Show {
        name: String,
        #[arg(short, long, default_value = "yaml")]
        format: ShowFormat,
    },
}

#[derive(Subcommand)]
enum CapabilitiesCommand {
    /// List capabilities, optionally filtered
    List {
        #[arg(short, long)]
        domain: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(short, long, default_value = "table")]
        format: ListFormat,
    },
    /// Show one capability
    Show {
        id: String,
        #[arg(short, long, default_value = "yaml")]
        format: ShowFormat,
    },
}

#[derive(Subcommand)]
enum ActionsCommand {
    /// List actions, optionally filtered
    List {
        /// Owning repository (id or name, as written in actions.yml)
        #[arg(short, long)]
        repo: Option<String>,
        /// Capability id
        #[arg(short, long)]
        capability: Option<String>,
        /// Domain of the owning repository
        #[arg(short, long)]
        domain: Option<String>,
        #[arg(short, long, default_value = "table")]
        format: ListFormat,
    },
    /// Show one action
    Show {
        id: String,
        #[arg(short, long, default_value = "yaml")]
        format: ShowFormat,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum ValidateTarget {
    /// Validate repos.yml
    Repos,
    /// Validate capabilities and actions in actions.yml
    Actions,
    /// Validate everything
    All,
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Write the OpenAPI 3.1 document for all actions
    Openapi {
        /// File name inside the output directory
        #[arg(short, long)]
        output: Option<String>,
        /// Output directory (defaults to [generate].output_dir)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write the service graph as JSON, Mermaid and DOT
    Graph {
        #[command(flatten)]
        filter: RepoFilterArgs,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write the capability -> serving repos index as JSON
    #[command(name = "capability-index", alias = "index")]
    CapabilityIndex {
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct RepoFilterArgs {
    /// Stage (0-10)
    #[arg(short, long)]
    stage: Option<i64>,
    #[arg(short, long)]
    domain: Option<String>,
    /// Tier (tier_0, tier_1, tier_2 or a bare number)
    #[arg(short, long, value_parser = parse_tier)]
    tier: Option<Tier>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    tag: Option<String>,
}

impl From<RepoFilterArgs> for RepoFilter {
    fn from(args: RepoFilterArgs) -> Self {
        RepoFilter {
            stage: args.stage,
            domain: args.domain,
            tier: args.tier,
            status: args.status,
            tag: args.tag,
        }
    }
}

fn parse_tier(value: &str) -> Result<Tier, String> {
    Ok(Tier::parse(value))
}

#[derive(Clone, Copy, ValueEnum)]
enum ListFormat {
    /// Human-readable table
    Table,
    Json,
    Yaml,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShowFormat {
    Json,
    Yaml,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    /// Human-readable summary
    Text,
    Json,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "capindex=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but reported a failure (invalid
/// catalog), so the process exits non-zero without an error message.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    let root = IndexRoot::discover(cli.root.as_deref())?;
    let catalog = root
        .load()
        .with_context(|| format!("failed to load catalog from {}", root.root.display()))?;

    match cli.command {
        Commands::Repos { command } => repos(&catalog, command)?,
        Commands::Capabilities { command } => capabilities(&catalog, command)?,
        Commands::Actions { command } => actions(&catalog, command)?,
        Commands::Validate { target, format } => return validate(&catalog, target, format),
        Commands::Generate { command } => generate(&root, &catalog, command)?,
    }
    Ok(true)
}

fn repos(catalog: &Catalog, command: ReposCommand) -> Result<()> {
    match command {
        ReposCommand::List { filter, format } => {
            let repos = filter_repos(catalog, &filter.into());
            print_list(&repos, format, || repo_table(&repos))
        }
        ReposCommand::Show { name, format } => {
            let repo = catalog
                .repo(&name)
                .ok_or_else(|| CatalogError::not_found(EntityKind::Repository, name.as_str()))?;
            print_one(repo, format)
        }
    }
}

fn capabilities(catalog: &Catalog, command: CapabilitiesCommand) -> Result<()> {
    match command {
        CapabilitiesCommand::List {
            domain,
            tag,
            format,
        } => {
            let caps = filter_capabilities(catalog, &CapabilityFilter { domain, tag });
            print_list(&caps, format, || capability_table(&caps))
        }
        CapabilitiesCommand::Show { id, format } => {
            let cap = catalog
                .capability(&id)
                .ok_or_else(|| CatalogError::not_found(EntityKind::Capability, id.as_str()))?;
            print_one(cap, format)
        }
    }
}

fn actions(catalog: &Catalog, command: ActionsCommand) -> Result<()> {
    match command {
        ActionsCommand::List {
            repo,
            capability,
            domain,
            format,
        } => {
            let filter = ActionFilter {
                repo,
                capability,
                domain,
            };
            let actions = filter_actions(catalog, &filter);
            print_list(&actions, format, || action_table(&actions))
        }
        ActionsCommand::Show { id, format } => {
            let action = catalog
                .action(&id)
                .ok_or_else(|| CatalogError::not_found(EntityKind::Action, id.as_str()))?;
            print_one(action, format)
        }
    }
}

fn validate(catalog: &Catalog, target: ValidateTarget, format: ReportFormat) -> Result<bool> {
    let (valid, text, json) = match target {
        ValidateTarget::Repos => {
            let report = validate_repos(catalog);
            (report.is_valid(), repo_report(&report), to_json(&report)?)
        }
        ValidateTarget::Actions => {
            let report = validate_actions(catalog);
            (report.valid, actions_report(&report), to_json(&report)?)
        }
        ValidateTarget::All => {
            let report = validate_all(catalog);
            (report.valid, full_report(&report), to_json(&report)?)
        }
    };
    match format {
        ReportFormat::Text => print!("{text}"),
        ReportFormat::Json => println!("{json}"),
    }
    Ok(valid)
}

fn generate(root: &IndexRoot, catalog: &Catalog, command: GenerateCommand) -> Result<()> {
    match command {
        GenerateCommand::Openapi { output, output_dir } => {
            let dir = output_dir.unwrap_or_else(|| root.output_dir());
            let written = write_openapi(catalog, &root.config, &dir, output.as_deref())?;
            println!("Generated OpenAPI document:");
            println!("  Path: {}", written.path.display());
            println!("  Paths: {}", written.document.path_count());
            println!("  Schemas: {}", written.document.components.schemas.len());
            println!("  Tags: {}", written.document.tags.len());
        }
        GenerateCommand::Graph { filter, output_dir } => {
            let dir = output_dir.unwrap_or_else(|| root.output_dir());
            let written = write_graphs(catalog, &filter.into(), &dir)?;
            println!(
                "Generated service graph ({} nodes, {} edges):",
                written.graph.nodes.len(),
                written.graph.edges.len()
            );
            println!("  JSON: {}", written.json.display());
            println!("  Mermaid: {}", written.mermaid.display());
            println!("  DOT: {}", written.dot.display());
        }
        GenerateCommand::CapabilityIndex { output_dir } => {
            let dir = output_dir.unwrap_or_else(|| root.output_dir());
            let written = write_capability_index(catalog, &dir)?;
            println!(
                "Generated capability index ({} capabilities):",
                written.index.len()
            );
            println!("  Path: {}", written.path.display());
        }
    }
    Ok(())
}

fn print_list<T: Serialize>(
    items: &[&T],
    format: ListFormat,
    table: impl FnOnce() -> String,
) -> Result<()> {
    match format {
        ListFormat::Table => print!("{}", table()),
        ListFormat::Json => println!("{}", to_json(&items)?),
        ListFormat::Yaml => print!("{}", to_yaml(&items)?),
    }
    Ok(())
}

fn print_one<T: Serialize>(item: &T, format: ShowFormat) -> Result<()> {
    match format {
        ShowFormat::Json => println!("{}", to_json(item)?),
        ShowFormat::Yaml => print!("{}", to_yaml(item)?),
    }
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to render JSON")
}

fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).context("failed to render YAML")
}
