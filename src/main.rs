//! mustache-loader CLI
//!
//! Usage:
//!   mustache-loader serve [--addr 127.0.0.1:8000] [--root public]
//!   mustache-loader render <NAME> [--page FILE] [--templates FILE] [--context JSON]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use mustache_loader::engine::TeraCompiler;
use mustache_loader::server::{serve, ServerConfig};
use mustache_loader::{PageDocument, RenderContext, TemplateResolver};

#[derive(Parser)]
#[command(name = "mustache-loader")]
#[command(about = "Loads, caches, and renders page-embedded Mustache-style templates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the static site (landing page, error page, assets)
    Serve {
        /// Address to bind
        #[arg(short, long, default_value = "127.0.0.1:8000")]
        addr: String,

        /// Site root directory
        #[arg(short, long, default_value = "public")]
        root: PathBuf,
    },

    /// Render one template to stdout
    Render {
        /// Template identifier, e.g. includes/user
        name: String,

        /// HTML page to scan for embedded template blocks
        #[arg(short, long)]
        page: Option<PathBuf>,

        /// TOML file with a [templates] table of inline templates
        #[arg(short, long)]
        templates: Option<PathBuf>,

        /// Render context as a JSON object
        #[arg(short, long)]
        context: Option<String>,
    },
}

/// Inline template table file: a single `[templates]` table of
/// identifier -> raw template text
#[derive(Debug, Deserialize)]
struct TemplateTable {
    #[serde(default)]
    templates: HashMap<String, String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { addr, root } => serve(ServerConfig { addr, root }),
        Command::Render {
            name,
            page,
            templates,
            context,
        } => {
            if let Err(message) = render(&name, page, templates, context) {
                eprintln!("Error: {message}");
                process::exit(1);
            }
        }
    }
}

fn render(
    name: &str,
    page: Option<PathBuf>,
    templates: Option<PathBuf>,
    context: Option<String>,
) -> Result<(), String> {
    let mut resolver = TemplateResolver::new().with_compiler(TeraCompiler::new());

    if let Some(path) = page {
        let html = fs::read_to_string(&path)
            .map_err(|err| format!("reading page '{}': {err}", path.display()))?;
        resolver = resolver.with_page(PageDocument::parse(&html));
    }

    if let Some(path) = templates {
        let text = fs::read_to_string(&path)
            .map_err(|err| format!("reading templates '{}': {err}", path.display()))?;
        let table: TemplateTable = toml::from_str(&text)
            .map_err(|err| format!("parsing templates '{}': {err}", path.display()))?;
        resolver = resolver.with_templates(table.templates);
    }

    let context = match context {
        Some(json) => {
            let value: serde_json::Value =
                serde_json::from_str(&json).map_err(|err| format!("parsing context: {err}"))?;
            RenderContext::from_serialize(value)
                .map_err(|err| format!("building context: {err}"))?
        }
        None => RenderContext::new(),
    };

    let html = resolver
        .render(name, &context)
        .map_err(|err| err.to_string())?;
    println!("{html}");
    Ok(())
}
