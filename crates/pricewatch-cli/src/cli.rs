use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use pricewatch_core::models::ThemeMode;
use pricewatch_core::search::SortOrder;

#[derive(Parser)]
#[command(name = "pricewatch")]
#[command(about = "Track product prices on Amazon and Mercado Livre")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Quick add: pricewatch "https://..."
    #[arg(value_name = "URL")]
    pub url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start tracking a product by URL
    #[command(alias = "new")]
    Add {
        /// Product page URL on any store
        url: String,
    },
    /// List tracked products
    List {
        /// Filter by product name
        query: Option<String>,
        /// Sort order
        #[arg(short, long, value_enum, default_value_t = SortArg::Added)]
        sort: SortArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one product with its price history
    Show {
        /// Product ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-check prices for one product, or all of them
    Refresh {
        /// Product ID or unique ID prefix (all products when omitted)
        id: Option<String>,
    },
    /// Change a product's URL or affiliate ids
    Edit {
        /// Product ID or unique ID prefix
        id: String,
        /// New product page URL (a different URL starts a fresh history)
        #[arg(long, value_name = "URL")]
        url: Option<String>,
        /// Amazon affiliate tag for this product (empty to clear)
        #[arg(long, value_name = "ID")]
        amazon_affiliate: Option<String>,
        /// Mercado Livre affiliate id for this product (empty to clear)
        #[arg(long, value_name = "ID")]
        mercado_livre_affiliate: Option<String>,
    },
    /// Stop tracking a product
    Delete {
        /// Product ID or unique ID prefix
        id: String,
    },
    /// Export tracked products
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Show or set the theme preference
    Theme {
        /// New theme (prints the current one when omitted)
        #[arg(value_enum)]
        mode: Option<ThemeArg>,
    },
    /// Show or change default affiliate ids and the price drop window
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Update configuration values
    Set {
        /// Default Amazon affiliate tag (empty to clear)
        #[arg(long, value_name = "ID")]
        amazon_affiliate: Option<String>,
        /// Default Mercado Livre affiliate id (empty to clear)
        #[arg(long, value_name = "ID")]
        mercado_livre_affiliate: Option<String>,
        /// How many hours a price change counts as recent
        #[arg(long, value_name = "HOURS")]
        drop_window_hours: Option<u32>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortArg {
    Added,
    PriceAsc,
    PriceDesc,
    Name,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Added => Self::Added,
            SortArg::PriceAsc => Self::PriceAsc,
            SortArg::PriceDesc => Self::PriceDesc,
            SortArg::Name => Self::Name,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
    System,
}

impl From<ThemeArg> for ThemeMode {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
            ThemeArg::System => Self::System,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl From<ExportFormat> for pricewatch_core::export::ExportFormat {
    fn from(value: ExportFormat) -> Self {
        match value {
            ExportFormat::Json => Self::Json,
            ExportFormat::Markdown => Self::Markdown,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
