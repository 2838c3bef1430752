//! Stateful services shared by pricewatch clients.

mod product_store;
mod refresh;

pub use product_store::{ProductStore, PRODUCTS_KEY};
pub use refresh::{
    apply_resolution, new_product, refresh_all, refresh_each, refresh_product, repoint,
    repointed, resolve_new,
};
