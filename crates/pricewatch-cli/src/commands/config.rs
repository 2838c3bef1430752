use pricewatch_core::StoreId;

use crate::cli::ConfigCommands;
use crate::cli_config::CliConfig;
use crate::error::CliError;

pub fn run_config(command: Option<ConfigCommands>) -> Result<(), CliError> {
    match command {
        None => run_config_show(),
        Some(ConfigCommands::Set {
            amazon_affiliate,
            mercado_livre_affiliate,
            drop_window_hours,
        }) => run_config_set(amazon_affiliate, mercado_livre_affiliate, drop_window_hours),
    }
}

pub fn run_config_show() -> Result<(), CliError> {
    let config = CliConfig::load().map_err(CliError::Config)?;
    for line in format_config_lines(&config) {
        println!("{line}");
    }
    Ok(())
}

pub fn run_config_set(
    amazon_affiliate: Option<String>,
    mercado_livre_affiliate: Option<String>,
    drop_window_hours: Option<u32>,
) -> Result<(), CliError> {
    let mut config = CliConfig::load().map_err(CliError::Config)?;
    apply_config_changes(
        &mut config,
        amazon_affiliate,
        mercado_livre_affiliate,
        drop_window_hours,
    )?;

    let path = config.save().map_err(CliError::Config)?;
    println!("Saved {}", path.display());
    Ok(())
}

pub fn apply_config_changes(
    config: &mut CliConfig,
    amazon_affiliate: Option<String>,
    mercado_livre_affiliate: Option<String>,
    drop_window_hours: Option<u32>,
) -> Result<(), CliError> {
    for (store_id, value) in [
        (StoreId::Amazon, amazon_affiliate),
        (StoreId::MercadoLivre, mercado_livre_affiliate),
    ] {
        if let Some(value) = value {
            config.set_default_affiliate(store_id, value);
        }
    }

    if let Some(hours) = drop_window_hours {
        if hours == 0 {
            return Err(CliError::Config(
                "--drop-window-hours must be at least 1".to_string(),
            ));
        }
        config.drop_window_hours = hours;
    }

    Ok(())
}

pub fn format_config_lines(config: &CliConfig) -> Vec<String> {
    let mut lines = StoreId::ALL
        .iter()
        .map(|store_id| {
            let value = config
                .default_affiliate_ids
                .get(store_id)
                .map_or("(none)", String::as_str);
            format!(
                "{} affiliate ({}): {value}",
                store_id.display_name(),
                store_id.affiliate_param()
            )
        })
        .collect::<Vec<_>>();
    lines.push(format!("Price drop window: {}h", config.drop_window_hours));
    lines
}
