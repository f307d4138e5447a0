//! greffe — authoring-time CLI for the template pipeline.
//!
//! Subcommands:
//!   extract    list the variables a template's markup references
//!   classify   classify a free-text request into a document type
//!   remediate  apply (or preview) auto-fixes to a template file

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use greffe_core::remediate::{remediate, FixType};
use greffe_core::{classify, extract_variables_ordered, needs_clarification, Template};

#[derive(Parser)]
#[command(name = "greffe", version, about = "Template variable & certification pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the variables referenced by a template's markup
    Extract {
        /// Template record file (.yaml or .json)
        file: PathBuf,

        /// Emit JSON instead of one name per line
        #[arg(long)]
        json: bool,
    },

    /// Classify a free-text request into a document type suggestion
    Classify {
        /// The request text
        text: String,

        /// Emit the full classification as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply auto-fixes to a template file and print the outcome
    Remediate {
        /// Template record file (.yaml or .json)
        file: PathBuf,

        /// Fix types to apply (defaults to all)
        #[arg(long = "fix", value_enum)]
        fixes: Vec<FixArg>,

        /// Compute fixes without reporting the post-fix state as applied
        #[arg(long)]
        dry_run: bool,

        /// Emit the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FixArg {
    Placeholders,
    UnknownVars,
    Metadata,
    All,
}

impl From<FixArg> for FixType {
    fn from(arg: FixArg) -> Self {
        match arg {
            FixArg::Placeholders => FixType::Placeholders,
            FixArg::UnknownVars => FixType::UnknownVars,
            FixArg::Metadata => FixType::Metadata,
            FixArg::All => FixType::All,
        }
    }
}

fn load_template(path: &Path) -> anyhow::Result<Template> {
    let by_extension = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Template::from_yaml_file(path),
        _ => Template::from_json_file(path),
    };
    by_extension.with_context(|| format!("failed to load template from {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract { file, json } => {
            let template = load_template(&file)?;
            let variables = extract_variables_ordered(&template.content);
            if json {
                println!("{}", serde_json::to_string_pretty(&variables)?);
            } else {
                for name in variables {
                    println!("{name}");
                }
            }
        }

        Command::Classify { text, json } => {
            let result = classify(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "document_type: {}",
                    serde_json::to_value(result.document_type)?
                        .as_str()
                        .unwrap_or("unknown")
                );
                if let Some(sub_type) = &result.sub_type {
                    println!("sub_type: {sub_type}");
                }
                if let Some(authority) = result.authority {
                    println!("authority: {}", authority.as_str());
                }
                println!("confidence: {:.2}", result.confidence);
                if let Some(template_id) = &result.suggested_template_id {
                    println!("suggested_template: {template_id}");
                }
                if needs_clarification(&result) {
                    println!("clarification: recommended");
                }
            }
        }

        Command::Remediate {
            file,
            fixes,
            dry_run,
            json,
        } => {
            let template = load_template(&file)?;
            let fix_types: Vec<FixType> = if fixes.is_empty() {
                vec![FixType::All]
            } else {
                fixes.into_iter().map(FixType::from).collect()
            };

            let outcome = remediate(&template, &fix_types, dry_run);
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                for fix in &outcome.fixes_applied {
                    println!("applied: {fix}");
                }
                if outcome.fixes_applied.is_empty() {
                    println!("nothing to fix");
                }
                for error in &outcome.errors {
                    eprintln!("error: {error}");
                }
            }

            if !outcome.errors.is_empty() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
