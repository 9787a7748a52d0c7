//! halbind CLI - resolve a page manifest's bindings against a hypermedia API

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;

use halbind::error::{BindError, FixSuggestion};
use halbind::page::PageManifest;
use halbind::render::SlotBoard;
use halbind::session::Session;
use halbind::transport::HttpTransport;

#[derive(Parser)]
#[command(name = "halbind")]
#[command(about = "halbind - declarative hypermedia data binding")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a page manifest's bindings and print the rendered slots
    Render {
        /// Path to the page manifest (YAML)
        file: String,

        /// Override the API key
        #[arg(short, long)]
        key: Option<String>,

        /// Override the API base URL
        #[arg(short, long)]
        base_url: Option<String>,
    },

    /// Validate a page manifest (parse only, no network)
    Validate {
        /// Path to the page manifest (YAML)
        file: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render { file, key, base_url } => render_page(&file, key, base_url).await,
        Commands::Validate { file } => validate_page(&file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

async fn render_page(
    file: &str,
    key_override: Option<String>,
    base_url_override: Option<String>,
) -> Result<(), BindError> {
    let mut manifest = PageManifest::load(file)?;

    // Apply CLI overrides
    if let Some(key) = key_override {
        manifest.api.key = Some(key);
    }
    if let Some(base_url) = base_url_override {
        manifest.api.base_url = Some(base_url);
    }

    // Fatal bootstrap check happens here, before any network activity.
    let bootstrap = manifest.bootstrap()?;
    println!(
        "{} Binding {} {} against {}",
        "→".cyan(),
        bootstrap.entity_type.to_string().cyan().bold(),
        bootstrap.entity_id.cyan().bold(),
        bootstrap.base_url().cyan()
    );

    let board = SlotBoard::new();
    let mut table = manifest.binding_table(&board)?;

    let session = Session::new(bootstrap, Arc::new(HttpTransport::new()))?;
    let report = session.run(&mut table).await?;

    for decl in &manifest.bindings {
        for slot in &decl.targets {
            match board.markup(slot) {
                Some(markup) => println!("{} {}", format!("{slot}:").green().bold(), markup),
                None => println!("{} {}", format!("{slot}:").yellow().bold(), "(pending)"),
            }
        }
    }

    if report.is_complete() {
        println!(
            "{} Resolved {} binding(s)",
            "✓".green(),
            report.resolved
        );
    } else {
        println!(
            "{} Resolved {} binding(s), {} pending: {}",
            "⚠".yellow(),
            report.resolved,
            report.pending.len(),
            report.pending.join(", ")
        );
    }

    Ok(())
}

fn validate_page(file: &str) -> Result<(), BindError> {
    let manifest = PageManifest::load(file)?;

    // Expression syntax is checked by building a throwaway table.
    let board = SlotBoard::new();
    let table = manifest.binding_table(&board)?;

    println!("{} Page manifest '{}' is valid", "✓".green(), file);
    println!("  Entity: {}/{}",
        manifest.entity.kind.as_deref().unwrap_or("(unset)"),
        manifest.entity.id.as_deref().unwrap_or("(unset)"));
    println!("  Bindings: {}", table.len());

    Ok(())
}
