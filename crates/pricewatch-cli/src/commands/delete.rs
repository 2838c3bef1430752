use std::path::Path;

use crate::commands::common::{normalize_product_identifier, open_store, resolve_product_index};
use crate::error::CliError;

pub fn run_delete(id: &str, db_path: &Path) -> Result<(), CliError> {
    let normalized_id = normalize_product_identifier(id)?;
    let mut store = open_store(db_path)?;
    let index = resolve_product_index(&normalized_id, store.all())?;

    let removed = store.remove_at(index)?;
    println!("{}", removed.id);
    Ok(())
}
