//! Type Check CLI
//!
//! Validates JSON input against type specs resolved from a configured context.

use std::error::Error;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use familiar_types::{TypeContext, TypeError, TypeSpec, TypesConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "type-check")]
#[command(about = "Resolve type specs and validate JSON values against them")]
struct Cli {
    /// Path to a config file (types.toml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON value against a type spec
    Check {
        /// Type spec, e.g. "array<string>"
        spec: String,
        /// JSON input file (reads stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show how a type spec is parsed
    Parse {
        spec: String,
    },

    /// List registered type names
    List,

    /// Print or save the effective configuration
    Config {
        /// Write the configuration to this file instead of printing it
        #[arg(long)]
        save: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = TypesConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Check { spec, input } => {
            let ctx = config.context()?;
            let ty = match ctx.resolve(spec.as_str()) {
                Ok(ty) => ty,
                Err(err @ TypeError::UnknownType { .. }) => {
                    print_suggestions(&ctx, &err);
                    return Err(err.into());
                }
                Err(err) => return Err(err.into()),
            };

            let raw = match input {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {:?}", path))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let value: serde_json::Value = serde_json::from_str(&raw).context("parsing input")?;

            match ty.build(value) {
                Ok(built) => {
                    println!("{}", config.output.format.render(&built)?);
                    Ok(())
                }
                Err(err) => {
                    println!("❌ {} - INVALID", ty);
                    println!("   {}", err);
                    let mut source = err.source();
                    while let Some(cause) = source {
                        println!("   └─ {}", cause);
                        source = cause.source();
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Parse { spec } => {
            let parsed = TypeSpec::parse(&spec)?;
            print_spec(&parsed, 0);
            Ok(())
        }

        Commands::List => {
            let ctx = config.context()?;
            let keys = ctx.registry().keys();
            if keys.is_empty() {
                bail!("No types registered");
            }
            for key in keys {
                let ty = ctx.resolve(key)?;
                println!("  {:<24} {}", key, ty.primitive());
            }
            Ok(())
        }

        Commands::Config { save } => {
            match save {
                Some(path) => {
                    config.save(&path)?;
                    println!("✅ Configuration written to {}", path);
                }
                None => print!("{}", config.to_toml()?),
            }
            Ok(())
        }
    }
}

fn print_spec(spec: &TypeSpec, depth: usize) {
    let indent = "   ".repeat(depth.saturating_sub(1));
    let branch = if depth == 0 { "" } else { "└─ " };
    match spec {
        TypeSpec::Simple(name) => println!("{}{}{}", indent, branch, name),
        TypeSpec::Parametric { container, member } => {
            println!("{}{}{}", indent, branch, container);
            print_spec(member, depth + 1);
        }
    }
}

fn print_suggestions(ctx: &TypeContext, err: &TypeError) {
    let TypeError::UnknownType { name } = err else {
        return;
    };
    let suggestions = ctx.registry().suggest(name, 3);
    if !suggestions.is_empty() {
        eprintln!("Did you mean: {}?", suggestions.join(", "));
    }
}
