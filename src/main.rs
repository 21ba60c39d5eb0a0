//! modoc - Documentation content resolution for module reference sites
//!
//! Plans which standard documents a module site shows, parses command help
//! into reference models, and splits usage examples into code and remarks.

use anyhow::Result;
use modoc::cli::{
    classify, help, plan, print_help_text, print_json, print_plan_text, print_segmented_text, Cli,
    Commands, ConfigArgs, OutputFormat,
};
use modoc::source::{project_root, DocsConfig};
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Setup logging; stdout is reserved for command output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let project_path = Path::new(&cli.path);

    // Execute command
    match cli.command {
        Commands::Plan(args) => {
            let result = plan(project_path, &args).await?;

            match cli.format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Text => print_plan_text(&result, args.content),
            }
        }

        Commands::Help(args) => {
            let reports = help(project_path, &args).await?;

            match cli.format {
                OutputFormat::Json => print_json(&reports)?,
                OutputFormat::Text => print_help_text(&reports, args.examples),
            }
        }

        Commands::Classify(args) => {
            let segmented = classify(&args.input, args.strict)?;

            match cli.format {
                OutputFormat::Json => print_json(&segmented)?,
                OutputFormat::Text => print_segmented_text(&segmented),
            }
        }

        Commands::Config(args) => {
            handle_config(project_path, &args, cli.format)?;
        }
    }

    Ok(())
}

/// Handle config command
fn handle_config(path: &Path, args: &ConfigArgs, format: OutputFormat) -> Result<()> {
    let root = project_root(path)?;
    let mut config = DocsConfig::load_or_default(&root)?;

    if let Some(ref assignment) = args.set {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Expected key=value, got {:?}", assignment))?;
        config.set(key.trim(), value)?;
        config.save(&root)?;
        println!("✓ Set {}", key.trim());
    }

    if args.reset {
        config = DocsConfig::default();
        config.save(&root)?;
        println!("✓ Configuration reset to defaults");
    }

    if let Some(ref key) = args.get {
        match config.get(key) {
            Some(value) => println!("{}", value),
            None => anyhow::bail!("Unknown config key: {}", key),
        }
    }

    let nothing_else = !args.reset && args.set.is_none() && args.get.is_none();
    if args.show || nothing_else {
        match format {
            OutputFormat::Json => print_json(&config)?,
            OutputFormat::Text => print_config_text(&root, &config),
        }
    }

    Ok(())
}

fn print_config_text(root: &Path, config: &DocsConfig) {
    println!("modoc Configuration");
    println!("===================\n");

    println!("Config file: {:?}", DocsConfig::path(root));
    println!("Mode: {}", config.mode);
    println!("Show duplicates: {}", config.show_duplicates);
    println!("Include local: {}", config.include_local);
    if let Some(ref dir) = config.secondary_dir {
        println!("Secondary folder: {}", dir);
    }

    println!("\nDocument folders:");
    for folder in &config.doc_folders {
        println!("  - {}", folder);
    }

    if !config.script_folders.is_empty() {
        println!("\nScript folders:");
        for folder in &config.script_folders {
            println!("  - {}", folder);
        }
    }

    println!("\nRemote enabled: {}", config.remote.enabled);
    if let Some(ref repository) = config.remote.repository {
        println!("Remote repository: {}", repository);
    }
    if let Some(ref branch) = config.remote.branch {
        println!("Remote branch: {}", branch);
    }
    println!("Remote API: {}", config.remote.api_base);

    println!("\nHelp program: {} {}", config.help.program, config.help.args.join(" "));
    println!("Help timeout: {}s", config.help.timeout_secs);
}
