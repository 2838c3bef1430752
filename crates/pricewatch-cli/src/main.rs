//! pricewatch CLI - track product prices from the command line
//!
//! Resolves a product URL into Amazon and Mercado Livre offers, keeps a
//! price history per store, and flags recent price drops.

mod cli;
mod cli_config;
mod commands;
mod error;


use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::resolve_db_path;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, ProductEdits};
use crate::commands::export::run_export;
use crate::commands::list::run_list;
use crate::commands::refresh::run_refresh;
use crate::commands::show::run_show;
use crate::commands::theme::run_theme;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let directive = "pricewatch=info"
        .parse()
        .map_err(|error| CliError::Config(format!("Invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Completions { shell, output }) => {
            return run_completions(shell, output.as_deref());
        }
        Some(Commands::Config { command }) => return run_config(command),
        _ => {}
    }

    let db_path = resolve_db_path(cli.db_path)?;

    match cli.command {
        Some(Commands::Add { url }) => run_add(&url, &db_path).await?,
        Some(Commands::List { query, sort, json }) => {
            run_list(query.as_deref(), sort, json, &db_path)?;
        }
        Some(Commands::Show { id, json }) => run_show(&id, json, &db_path)?,
        Some(Commands::Refresh { id }) => run_refresh(id.as_deref(), &db_path).await?,
        Some(Commands::Edit {
            id,
            url,
            amazon_affiliate,
            mercado_livre_affiliate,
        }) => {
            let edits = ProductEdits {
                url: url.as_deref(),
                amazon_affiliate,
                mercado_livre_affiliate,
            };
            run_edit(&id, edits, &db_path).await?;
        }
        Some(Commands::Delete { id }) => run_delete(&id, &db_path)?,
        Some(Commands::Export { format, output }) => {
            run_export(format, output.as_deref(), &db_path)?;
        }
        Some(Commands::Theme { mode }) => run_theme(mode, &db_path)?,
        Some(Commands::Completions { .. } | Commands::Config { .. }) => {}
        None => {
            // Quick add mode: pricewatch "https://..."
            if let Some(url) = cli.url {
                run_add(&url, &db_path).await?;
            } else {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            }
        }
    }

    Ok(())
}
