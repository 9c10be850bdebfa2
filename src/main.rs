use clap::{Parser, Subcommand};
use quire::{config, context::Site, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Live document collections and template helpers for content sites")]
#[command(long_about = "\
Live document collections and template helpers for content sites

Quire reads the document export of a content store and the site
configuration, organizes documents into named collections, and computes
the values templates need for each page.

Inputs:

  site.toml          # Site constants, authors, collections, feeds (optional)
  documents.json     # Array of documents exported by the content store

Collections are declared as filter + sort rules:

  [collections.articles]
  filter = { url = { \"$startsWith\" = \"/articles\" }, layout = \"single\" }
  sort = [{ date = -1 }]

Run 'quire gen-config' to print a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Site configuration file
    #[arg(long, default_value = "site.toml", global = true)]
    config: PathBuf,

    /// Document export (JSON array)
    #[arg(long, default_value = "documents.json", global = true)]
    documents: PathBuf,

    /// Environment overlay to apply (e.g. development)
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every collection with its current members
    Collections,
    /// List the members of one collection
    Collection {
        /// Collection name, e.g. articles
        name: String,
    },
    /// Print the derived template values for one document as JSON
    Context {
        /// Document id (source path)
        id: String,
    },
    /// Print the derived template values for every document as JSON
    Render,
    /// Show the feed descriptions
    Feeds,
    /// Validate configuration and documents without rendering
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let load = || Site::load(&cli.config, &cli.documents, cli.env.as_deref());

    match &cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Collections => {
            let site = load()?;
            output::print_collections_output(&site);
        }
        Command::Collection { name } => {
            let site = load()?;
            let members = site.collection(name)?;
            output::print_collection_output(name, &members);
        }
        Command::Context { id } => {
            let site = load()?;
            let values = site.context_for(id)?.render()?;
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
        Command::Render => {
            let site = load()?;
            // An unknown author aborts only that document's render.
            let mut rendered = Vec::new();
            let mut skipped = 0usize;
            for document in site.store().iter() {
                match site.context(document).render() {
                    Ok(values) => rendered.push(values),
                    Err(err) => {
                        skipped += 1;
                        eprintln!("{}", output::format_render_failure(&document.id, &err));
                    }
                }
            }
            println!("{}", serde_json::to_string_pretty(&rendered)?);
            if skipped > 0 {
                eprintln!("==> Rendered {} documents, skipped {}", rendered.len(), skipped);
            }
        }
        Command::Feeds => {
            let site = load()?;
            output::print_feeds_output(&site);
        }
        Command::Check => {
            println!("==> Checking {}", cli.config.display());
            let site = load()?;
            output::print_check_output(&site);
            println!("==> Configuration and documents are valid");
        }
    }

    Ok(())
}
