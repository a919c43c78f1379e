//! waymark CLI tool
//!
//! Command-line interface for building the site data set from a documented
//! repository.
//!
//! ## Commands
//!
//! - `build`: parse the docs tree and write `pages.json` / `source-files.json`

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use waymark::{compiler::SiteCompiler, config::SiteConfig};

#[derive(Parser)]
#[command(name = "waymark")]
#[command(author, version, about = "Build a navigable site data set from markdown and diagrams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the docs tree and write the site data set
    Build {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Local clone of the documented repository (overrides config)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Docs tree location inside the repository (overrides config)
        #[arg(short, long)]
        docs_path: Option<String>,

        /// Output directory for the generated JSON files
        #[arg(short, long, default_value = "out")]
        out: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            root,
            docs_path,
            out,
        } => {
            let mut config = match config {
                Some(path) => SiteConfig::from_file(&path)?,
                None => SiteConfig::default(),
            }
            .with_env_overrides();
            if let Some(root) = root {
                config.local_root = Some(root);
            }
            if let Some(docs_path) = docs_path {
                config.docs_path = Some(docs_path);
            }

            let compiler = SiteCompiler::new(config)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let build = runtime.block_on(compiler.write_to(&out))?;
            println!(
                "Built {} pages and {} source files into {}",
                build.graph.pages.len(),
                build.source_files.len(),
                out.display()
            );
        }
    }

    Ok(())
}
