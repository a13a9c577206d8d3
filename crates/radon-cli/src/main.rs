//! radon CLI: convert compact Radon documents into markup and inspect them.

use clap::{Parser, Subcommand};
use radon_core::prelude::{Catalog, MarkupConfig, OperatorDef, OutputType};
use radon_markup::{
    catalog_to_yaml, parse_mir, ExpandedArgument, ExpandedSelect, Markup, RadonMarkup,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "radon")]
#[command(about = "Radon markup: compact scripts to editable trees and back", long_about = None)]
struct Cli {
    /// Operator catalog file (YAML/JSON) replacing the built-in table
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Id of the first arena handle (overrides RADON_CACHE_ORIGIN)
    #[arg(long, global = true)]
    cache_origin: Option<u32>,

    /// Log at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document and print its markup as JSON
    Markup {
        /// Path to the compact document (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the handle-level tree plus the arena instead of the expanded one
        #[arg(long)]
        cached: bool,
    },

    /// Convert a document and report whether it succeeded
    Validate {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Convert a document to markup and back; fail if the result differs
    Roundtrip {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show an outline of every stage and the snapshot hash
    Explain {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Dump the operator catalog as YAML
    Catalog {
        /// Only operators of this input type (e.g. `string`, `map`)
        #[arg(long)]
        category: Option<String>,
    },
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.verbose);

    let config = resolve_config(MarkupConfig::from_env(), cli.catalog, cli.cache_origin);
    let catalog = match config.load_catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Markup { input, out, cached } => {
            if let Err(e) = markup_document(&catalog, &config, &input, out.as_deref(), cached) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Validate { input } => {
            if let Err(e) = validate_document(&catalog, &config, &input) {
                eprintln!("Validation failed: {}", e);
                std::process::exit(1);
            }
            println!("✓ Document converts cleanly");
        }
        Commands::Roundtrip { input } => match roundtrip_document(&catalog, &config, &input) {
            Ok(true) => println!("✓ Round trip is lossless"),
            Ok(false) => {
                eprintln!("Round trip changed the document");
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Explain { input } => {
            if let Err(e) = explain_document(&catalog, &config, &input) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Catalog { category } => {
            if let Err(e) = dump_catalog(&catalog, category.as_deref()) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn init_logging(debug: bool, verbose: bool) {
    let log_level = if debug {
        tracing::Level::DEBUG
    } else if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!("radon_markup={}", log_level))
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Flags win over the environment.
fn resolve_config(
    mut config: MarkupConfig,
    catalog: Option<String>,
    cache_origin: Option<u32>,
) -> MarkupConfig {
    if let Some(path) = catalog {
        config.catalog_path = Some(path);
    }
    if let Some(origin) = cache_origin {
        config.cache_origin = origin;
    }
    config
}

fn load<'c>(
    catalog: &'c Catalog,
    config: &MarkupConfig,
    input: &Path,
) -> CliResult<RadonMarkup<'c>> {
    let src = fs::read_to_string(input)?;
    let mir = parse_mir(&src)?;
    tracing::info!(path = %input.display(), name = %mir.name, "loaded document");
    Ok(RadonMarkup::with_config(catalog, Some(&mir), config)?)
}

fn markup_document(
    catalog: &Catalog,
    config: &MarkupConfig,
    input: &Path,
    out: Option<&Path>,
    cached: bool,
) -> CliResult<()> {
    let markup = load(catalog, config, input)?;
    let json = if cached {
        let arena: Vec<_> = markup
            .cache()
            .iter()
            .map(|(handle, node)| serde_json::json!({ "id": handle.id, "node": node }))
            .collect();
        serde_json::to_string_pretty(&serde_json::json!({
            "document": markup.cached(),
            "cache": arena,
        }))?
    } else {
        serde_json::to_string_pretty(&markup.markup()?)?
    };
    match out {
        Some(path) => fs::write(path, json)?,
        None => println!("{}", json),
    }
    Ok(())
}

fn validate_document(catalog: &Catalog, config: &MarkupConfig, input: &Path) -> CliResult<()> {
    let markup = load(catalog, config, input)?;
    markup.markup()?;
    Ok(())
}

fn roundtrip_document(catalog: &Catalog, config: &MarkupConfig, input: &Path) -> CliResult<bool> {
    let src = fs::read_to_string(input)?;
    let mir = parse_mir(&src)?;
    let markup = RadonMarkup::with_config(catalog, Some(&mir), config)?;
    // `[code]` and `code` are the same operator; compare canonical forms
    Ok(markup.mir()? == mir.normalized())
}

fn explain_document(catalog: &Catalog, config: &MarkupConfig, input: &Path) -> CliResult<()> {
    let markup = load(catalog, config, input)?;
    let doc = markup.markup()?;
    print!("{}", outline(&doc));
    println!();
    println!("Arena nodes: {}", markup.cache().len());
    let hash = markup.snapshot_hash()?;
    tracing::debug!(hash = %hash.short(), "snapshot");
    println!("Snapshot hash: {}", hash);
    Ok(())
}

fn outline(doc: &Markup) -> String {
    let mut out = String::new();
    out.push_str(&format!("Document: {}\n", doc.name));
    if !doc.description.is_empty() {
        out.push_str(&format!("  {}\n", doc.description));
    }
    out.push_str(&format!("Not before: {}\n", doc.rad_request.not_before));
    for (i, source) in doc.rad_request.retrieve.iter().enumerate() {
        out.push_str(&format!("\nRetrieve #{} {}\n", i, source.url));
        outline_script(&mut out, &source.script);
    }
    out.push_str("\nAggregate\n");
    outline_script(&mut out, &doc.rad_request.aggregate);
    out.push_str("\nTally\n");
    outline_script(&mut out, &doc.rad_request.tally);
    out
}

fn outline_script(out: &mut String, script: &[ExpandedSelect]) {
    if script.is_empty() {
        out.push_str("  (empty)\n");
    }
    for (i, select) in script.iter().enumerate() {
        let args: Vec<String> = select.selected.arguments.iter().map(describe_argument).collect();
        out.push_str(&format!(
            "  {}. {}({}) -> {}\n",
            i + 1,
            select.selected.label,
            args.join(", "),
            select.output_type
        ));
    }
}

fn describe_argument(arg: &ExpandedArgument) -> String {
    match arg {
        ExpandedArgument::Input(input) => format!("{}={}", input.label, input.value),
        ExpandedArgument::Select(select) => {
            let inner: Vec<String> = select.selected.arguments.iter().map(describe_argument).collect();
            let label = select.label.as_deref().unwrap_or("?");
            if inner.is_empty() {
                format!("{}={}", label, select.selected.label)
            } else {
                format!("{}={}({})", label, select.selected.label, inner.join(", "))
            }
        }
    }
}

fn dump_catalog(catalog: &Catalog, category: Option<&str>) -> CliResult<()> {
    let yaml = match category {
        None => catalog_to_yaml(catalog)?,
        Some(name) => {
            let category: OutputType = name.parse()?;
            let defs: Vec<&OperatorDef> = catalog
                .defs()
                .iter()
                .filter(|d| d.category == category)
                .collect();
            serde_yaml::to_string(&defs)?
        }
    };
    print!("{}", yaml);
    Ok(())
}
