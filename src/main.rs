//! PHI Redactor - Command-line interface
//!
//! Thin collaborator shell over the redaction engine: resolves paths,
//! wires configuration, prints the manifest. Image and PDF flows need
//! an embedding application that injects OCR and rasterizer
//! collaborators; the stock binary handles text documents end to end.

use std::path::PathBuf;
use std::process;

use clap::{Arg, ArgAction, Command};
use phi_redactor::detect::manual;
use phi_redactor::utils::logging::{init_logging, level_from_verbosity};
use phi_redactor::{Document, RedactedArtifact, RedactionConfig, RedactionPipeline};
use tracing::{error, info};

fn build_cli() -> Command {
    Command::new("phi-redactor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Redact Protected Health Information from clinical documents")
        .arg(
            Arg::new("input")
                .help("Input file to redact (txt, png, jpg, tiff, bmp, gif, pdf)")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file path (defaults to <input>_redacted.<ext>)"),
        )
        .arg(
            Arg::new("aggressive")
                .short('a')
                .long("aggressive")
                .action(ArgAction::SetTrue)
                .help("Redact more liberally: extra patterns, lower confidence floor"),
        )
        .arg(
            Arg::new("redact-name")
                .long("redact-name")
                .action(ArgAction::Append)
                .value_name("FULL NAME")
                .help("Additionally scrub every form of this name (repeatable)"),
        )
        .arg(
            Arg::new("no-text-output")
                .long("no-text-output")
                .action(ArgAction::SetTrue)
                .help("Do not save the redacted-text sidecar file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the result summary as JSON"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Minimal output"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v, -vv, -vvv)"),
        )
}

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();
    init_logging(level_from_verbosity(*matches.get_one::<u8>("verbose").unwrap_or(&0)));

    let input = PathBuf::from(matches.get_one::<String>("input").unwrap());
    if !input.exists() {
        error!("input file does not exist: {}", input.display());
        process::exit(1);
    }

    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&input));
    let manual_names: Vec<String> = matches
        .get_many::<String>("redact-name")
        .map(|names| names.cloned().collect())
        .unwrap_or_default();

    let config = RedactionConfig {
        aggressive: matches.get_flag("aggressive"),
        ..Default::default()
    };
    let quiet = matches.get_flag("quiet");
    let as_json = matches.get_flag("json");
    let text_sidecar = !matches.get_flag("no-text-output");

    match run(&input, &output, config, &manual_names, text_sidecar).await {
        Ok(summary) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&summary.json).unwrap());
            } else if !quiet {
                summary.print();
            }
        }
        Err(e) => {
            if as_json {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            } else {
                error!("{e}");
            }
            process::exit(1);
        }
    }
}

struct RunSummary {
    json: serde_json::Value,
    lines: Vec<String>,
}

impl RunSummary {
    fn print(&self) {
        for line in &self.lines {
            println!("{line}");
        }
    }
}

async fn run(
    input: &PathBuf,
    output: &PathBuf,
    config: RedactionConfig,
    manual_names: &[String],
    text_sidecar: bool,
) -> phi_redactor::Result<RunSummary> {
    let pipeline = RedactionPipeline::new(config)?;
    let document = Document::from_file(input)?;
    info!(input = %input.display(), "processing");

    let mut outcome = pipeline.redact_document(document).await?;

    for name in manual_names {
        outcome.redacted_text = manual::redact_names(&outcome.redacted_text, name)?;
    }
    if let RedactedArtifact::Text(text) = &mut outcome.artifact {
        text.clone_from(&outcome.redacted_text);
    }

    outcome.artifact.write_to(output)?;

    let sidecar = if text_sidecar && !outcome.redacted_text.is_empty() {
        let path = sidecar_path(output);
        std::fs::write(&path, &outcome.redacted_text)?;
        Some(path)
    } else {
        None
    };

    let mut category_counts = std::collections::BTreeMap::new();
    for entry in &outcome.manifest.entries {
        for category in &entry.categories {
            *category_counts.entry(category.label()).or_insert(0u64) += 1;
        }
    }

    let mut lines = vec![
        "Redaction complete".to_string(),
        format!("  Output:     {}", output.display()),
        format!("  Redactions: {}", outcome.manifest.total_redactions()),
    ];
    if let Some(path) = &sidecar {
        lines.insert(2, format!("  Text:       {}", path.display()));
    }
    let failed = outcome.manifest.failed_pages();
    if !failed.is_empty() {
        lines.push(format!("  Recognition failed on pages: {failed:?}"));
    }
    for (category, pages) in &category_counts {
        lines.push(format!("    - {category}: on {pages} page(s)"));
    }

    let json = serde_json::json!({
        "input_file": input.display().to_string(),
        "output_file": output.display().to_string(),
        "text_output": sidecar.as_ref().map(|p| p.display().to_string()),
        "redactions_count": outcome.manifest.total_redactions(),
        "manifest": outcome.manifest,
    });

    Ok(RunSummary { json, lines })
}

fn default_output_path(input: &PathBuf) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = input.extension().and_then(|s| s.to_str()).unwrap_or("out");
    input.with_file_name(format!("{stem}_redacted.{ext}"))
}

fn sidecar_path(output: &PathBuf) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output.with_file_name(format!("{stem}_text.txt"))
}
