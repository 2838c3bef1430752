use std::path::Path;

use pricewatch_core::db::{KvSettingsRepository, SettingsRepository};
use pricewatch_core::models::{Settings, ThemeMode};

use crate::cli::ThemeArg;
use crate::commands::common::open_database;
use crate::error::CliError;

pub fn run_theme(mode: Option<ThemeArg>, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    let repo = KvSettingsRepository::new(&db);

    if let Some(mode) = mode {
        let theme = ThemeMode::from(mode);
        repo.save(&Settings { theme })?;
        println!("{theme}");
    } else {
        println!("{}", repo.load().theme);
    }

    Ok(())
}
