//! Slot Exporter CLI
//!
//! Command-line tool for exporting armor body slot data from a mod load order.

use clap::{Args, Parser, Subcommand};
use slot_core::config::DEFAULT_CONFIG_FILE;
use slot_core::{
    export_slot_data, load_dump, open_store, resolve_load_order, scan, ExportConfig,
    ExportOptions, FormKey,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slot-cli")]
#[command(about = "Armor body slot exporter", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where to find the records and how to read them
#[derive(Args)]
struct SourceArgs {
    /// Base data directory
    #[arg(short, long)]
    data_dir: PathBuf,

    /// Load order file (defaults to plugins.txt in the data directory)
    #[arg(short, long)]
    load_order: Option<PathBuf>,

    /// Config file (defaults to slot-config.json in the data directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export armor/armor addon slot data
    Export {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List discovered record dumps
    Scan {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the dump index as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which mods define a record and which version wins
    Explain {
        #[command(flatten)]
        source: SourceArgs,

        /// Record identity, e.g. 000801:ModA.esp
        #[arg(short, long)]
        form_key: String,
    },

    /// Write a config file with the default settings
    CreateConfig {
        /// Output path for the config file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands) -> slot_core::Result<()> {
    match command {
        Commands::Export { source } => cmd_export(&source),
        Commands::Scan { source, json } => cmd_scan(&source, json),
        Commands::Explain { source, form_key } => cmd_explain(&source, &form_key),
        Commands::CreateConfig { output } => cmd_create_config(&output),
    }
}

fn options(source: &SourceArgs) -> slot_core::Result<ExportOptions> {
    let config = match &source.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::load_or_default(source.data_dir.join(DEFAULT_CONFIG_FILE))?,
    };

    Ok(ExportOptions {
        data_dir: source.data_dir.clone(),
        load_order: source.load_order.clone(),
        config,
    })
}

fn cmd_export(source: &SourceArgs) -> slot_core::Result<()> {
    println!("--- Slot Exporter (9-Column / Gender Split) Started ---");

    let options = options(source)?;
    let summary = export_slot_data(&options)?;

    println!("Exported {} records (9-column format).", summary.rows);
    println!("Output: {}", summary.path.display());

    Ok(())
}

fn cmd_scan(source: &SourceArgs, json: bool) -> slot_core::Result<()> {
    let options = options(source)?;
    let index = scan(&options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }

    let load_order = resolve_load_order(&options, &index)?;

    println!("Scanned {}", index.root.display());
    println!("Found {} record dumps:", index.len());
    println!();

    for (mod_key, path) in &index.dumps {
        let dump = load_dump(path)?;
        let status = match load_order.position(mod_key) {
            Some(pos) => format!("#{}", pos),
            None => "inactive".to_string(),
        };
        println!(
            "  {} [{}] {} armors, {} addons, {} overrides",
            mod_key,
            status,
            dump.armors.len(),
            dump.armor_addons.len(),
            dump.override_count()
        );
    }

    let missing: Vec<String> = load_order
        .iter()
        .filter(|m| !index.contains(m))
        .map(|m| m.to_string())
        .collect();
    if !missing.is_empty() {
        println!();
        println!("In load order without a dump: {}", missing.join(", "));
    }

    Ok(())
}

fn cmd_explain(source: &SourceArgs, form_key: &str) -> slot_core::Result<()> {
    let key: FormKey = form_key.parse()?;
    let options = options(source)?;
    let layered = open_store(&options)?;

    let versions = layered.versions(&key);
    if versions.is_empty() {
        return Err(slot_core::Error::RecordNotFound(key.to_string()));
    }

    let resolved = layered.resolve();
    let protected = options.config.protected_origins();

    let contributor = resolved
        .armors
        .winner(&key)
        .map(|w| &w.contributor)
        .or_else(|| resolved.armor_addons.winner(&key).map(|w| &w.contributor));

    println!("Record: {}", key);
    println!("Origin: {}", key.mod_key);
    println!(
        "Protected origin: {}",
        if protected.contains(&key.mod_key) { "yes" } else { "no" }
    );
    println!();
    println!("Versions (load order):");
    for (i, version) in versions.iter().enumerate() {
        let deleted = if version.deleted { " (deleted)" } else { "" };
        let marker = if Some(&version.mod_key) == contributor {
            " <-- winner"
        } else {
            ""
        };
        println!(
            "  {}. {} [{}]{}{}",
            i + 1,
            version.mod_key,
            version.kind,
            deleted,
            marker
        );
    }

    if contributor.is_none() {
        println!();
        println!("No winning version (deleted by the highest-priority mod).");
    }

    Ok(())
}

fn cmd_create_config(output: &Path) -> slot_core::Result<()> {
    let config = ExportConfig::default();
    config.save(output)?;

    println!("Created config file: {}", output.display());
    println!("Protected mods: {}", config.protected_mods.len());
    println!();
    println!("Edit the file to adjust the settings, then run:");
    println!(
        "  slot-cli export --data-dir <path> --config {}",
        output.display()
    );

    Ok(())
}
