//! Command implementations

use super::{HelpArgs, PlanArgs};
use crate::example::{ExampleSegmenter, Segmented};
use crate::help::{CommandHelpModel, HelpContentParser, HelpInput, HelpProvider};
use crate::plan::{DocumentCollector, SelectionRequest, SelectionResult};
use crate::remote::{host_of, parse_github_slug, resolve_token, GitHubClient, TokenStore};
use crate::source::{origin_url, project_root, DocsConfig, DocumentSource};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Plan the document set for a project
pub async fn plan(path: &Path, args: &PlanArgs) -> Result<SelectionResult> {
    let root = project_root(path)?;
    let config = DocsConfig::load_or_default(&root)?;

    let mut request = SelectionRequest::new(&root)
        .with_mode(args.mode.unwrap_or(config.mode))
        .with_show_duplicates(args.show_duplicates || config.show_duplicates);
    request.secondary = config.secondary_path(&root);
    request.include_local = config.include_local && !args.exclude_local;
    request.fetch_remote = !args.offline && (args.remote || config.remote.enabled);

    for kind in &args.include {
        request.flags.set(*kind, true);
    }
    for kind in &args.exclude {
        request.flags.set(*kind, false);
    }

    request.introduction = match args.introduction {
        Some(ref file) => Some(
            std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read introduction {:?}", file))?,
        ),
        None => config.introduction.clone(),
    };

    let client = if args.offline {
        None
    } else {
        remote_client(&root, &config, args)?
    };

    let mut collector = DocumentCollector::new()
        .with_folders(config.doc_folders.clone(), config.script_folders.clone())
        .with_branch(args.branch.clone().or_else(|| config.remote.branch.clone()))
        .with_remote_secondary(config.secondary_dir.clone());

    if let Some(ref client) = client {
        collector = collector.with_remote(client, Duration::from_secs(config.remote.timeout_secs));
    }

    tracing::debug!("Planning documents for {:?} ({})", root, request.mode);
    let result = collector.collect(&request).await;

    for note in &result.notes {
        tracing::info!("{}", note);
    }

    Ok(result)
}

/// Build the repository client from flags, configuration or the git origin
fn remote_client(root: &Path, config: &DocsConfig, args: &PlanArgs) -> Result<Option<GitHubClient>> {
    let slug = match args
        .repository
        .clone()
        .or_else(|| config.remote.repository.clone())
    {
        Some(slug) => Some(slug),
        None => origin_url(root)?.as_deref().and_then(parse_github_slug),
    };

    let Some(slug) = slug else {
        tracing::debug!("No remote repository configured or detected");
        return Ok(None);
    };

    let host = host_of(&config.remote.api_base);
    let token = resolve_token(args.token.as_deref(), &host, &TokenStore::load_default());
    if token.is_none() {
        tracing::debug!("No token for {}, using anonymous requests", host);
    }

    let client = GitHubClient::new(
        &config.remote.api_base,
        &slug,
        token,
        Duration::from_secs(config.remote.timeout_secs),
    )
    .with_context(|| format!("Invalid remote repository: {}", slug))?;

    Ok(Some(client))
}

/// Parsed help for one input
#[derive(Debug, Clone, Serialize)]
pub struct HelpReport {
    /// File or command the help came from
    pub source: String,
    pub model: Option<CommandHelpModel>,
}

/// Parse help files and captured help into reference models
///
/// Inputs are parsed concurrently and reported in input order.
pub async fn help(path: &Path, args: &HelpArgs) -> Result<Vec<HelpReport>> {
    if args.files.is_empty() && args.commands.is_empty() {
        anyhow::bail!("No help files or commands given");
    }

    let mut inputs: Vec<(String, HelpInput)> = Vec::new();

    for file in &args.files {
        let input = read_help_file(file, args.name.as_deref())?;
        inputs.push((file.display().to_string(), input));
    }

    if !args.commands.is_empty() {
        let root = project_root(path)?;
        let config = DocsConfig::load_or_default(&root)?;
        let provider = HelpProvider::from_config(&config.help);

        let captures: Vec<_> = args
            .commands
            .iter()
            .map(|command| {
                let provider = provider.clone();
                let command = command.clone();
                tokio::spawn(async move {
                    let raw = provider.fetch(&command).await;
                    (command, raw)
                })
            })
            .collect();

        for capture in captures {
            let (command, raw) = capture.await.context("Help capture task failed")?;
            let input = HelpInput {
                structured: None,
                raw,
                name_hint: Some(command.clone()),
            };
            inputs.push((command, input));
        }
    }

    let parser = Arc::new(HelpContentParser::new());
    let handles: Vec<_> = inputs
        .into_iter()
        .map(|(source, input)| {
            let parser = Arc::clone(&parser);
            tokio::task::spawn_blocking(move || HelpReport {
                model: parser.parse(&input),
                source,
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await.context("Help parsing task failed")?);
    }

    Ok(reports)
}

/// Read a help file as a structured object graph or a raw text dump
///
/// A JSON file picks up a raw dump with the same stem and a `.txt`
/// extension when one sits next to it.
fn read_help_file(file: &Path, name: Option<&str>) -> Result<HelpInput> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read help file {:?}", file))?;

    let hint = name.map(str::to_string).or_else(|| {
        file.file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
    });

    let structured = serde_json::from_str::<serde_json::Value>(&content)
        .ok()
        .filter(|value| value.is_object());

    let input = match structured {
        Some(value) => {
            let companion: PathBuf = file.with_extension("txt");
            let raw = if companion != file && companion.is_file() {
                Some(
                    std::fs::read_to_string(&companion)
                        .with_context(|| format!("Failed to read help file {:?}", companion))?,
                )
            } else {
                None
            };
            HelpInput {
                structured: Some(value),
                raw,
                name_hint: hint,
            }
        }
        None => HelpInput {
            structured: None,
            raw: Some(content),
            name_hint: hint,
        },
    };

    Ok(input)
}

/// Split one example body read from a file or stdin
pub fn classify(input: &str, strict: bool) -> Result<Segmented> {
    let text = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read example from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read example {:?}", input))?
    };

    let segmenter = if strict {
        ExampleSegmenter::strict()
    } else {
        ExampleSegmenter::new()
    };

    Ok(segmenter.classify(&text))
}

/// Print any serializable result as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a document plan in text format
pub fn print_plan_text(result: &SelectionResult, show_content: bool) {
    if result.items.is_empty() {
        println!("No documents selected.");
    } else {
        println!("Document Plan");
        println!("=============\n");

        for (index, item) in result.items.iter().enumerate() {
            let origin = match item.source() {
                DocumentSource::Local => "local",
                DocumentSource::Remote => "remote",
            };
            let location = if item.path().is_empty() {
                "(configured)"
            } else {
                item.path()
            };
            println!("{:>3}. {} [{}] {}", index + 1, item.title(), origin, location);

            if show_content {
                for line in item.content().lines() {
                    println!("       {}", line);
                }
                println!();
            }
        }
    }

    if !result.missing.is_empty() {
        let missing: Vec<String> = result.missing.iter().map(|k| k.to_string()).collect();
        println!("\nMissing: {}", missing.join(", "));
    }
    if result.used_remote {
        println!("\nRemote documents were used.");
    }
}

/// Print parsed help in text format
pub fn print_help_text(reports: &[HelpReport], examples_only: bool) {
    for report in reports {
        let Some(ref model) = report.model else {
            println!("{}: no usable help content\n", report.source);
            continue;
        };

        println!("{}", model.name);
        println!("{}\n", "=".repeat(model.name.len().max(1)));

        if !examples_only {
            if !model.synopsis.is_empty() {
                println!("{}\n", model.synopsis);
            }
            for set in &model.syntax {
                let parameters: Vec<String> = set
                    .parameters
                    .iter()
                    .map(|p| match p.required {
                        Some(true) => format!("-{}", p.name),
                        _ => format!("[-{}]", p.name),
                    })
                    .collect();
                println!("  {}: {} {}", set.name, model.name, parameters.join(" "));
            }
            if !model.syntax.is_empty() {
                println!();
            }
            if !model.parameters.is_empty() {
                println!("Parameters:");
                for parameter in &model.parameters {
                    let type_name = if parameter.type_name.is_empty() {
                        String::new()
                    } else {
                        format!(" <{}>", parameter.type_name)
                    };
                    println!("  -{}{}", parameter.name, type_name);
                }
                println!();
            }
        }

        for example in &model.examples {
            println!("--- {} ({}) ---", example.title, example.mode);
            println!("{}", example.code);
            if !example.remarks.is_empty() {
                println!("\n{}", example.remarks);
            }
            println!();
        }
    }
}

/// Print a segmented example in text format
pub fn print_segmented_text(segmented: &Segmented) {
    println!("Mode: {}\n", segmented.mode);
    println!("Code:");
    for line in segmented.code.lines() {
        println!("  {}", line);
    }
    if !segmented.remarks.is_empty() {
        println!("\nRemarks:");
        for line in segmented.remarks.lines() {
            println!("  {}", line);
        }
    }
}
