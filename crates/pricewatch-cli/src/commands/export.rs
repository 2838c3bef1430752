use std::path::Path;

use pricewatch_core::export::render_products_export;

use crate::cli::ExportFormat;
use crate::commands::common::open_store;
use crate::error::CliError;

pub fn run_export(
    format: ExportFormat,
    output_path: Option<&Path>,
    db_path: &Path,
) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let rendered = render_products_export(store.all(), format.into())?;

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
