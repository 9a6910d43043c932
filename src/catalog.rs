//! Song catalog: track records, the on-disk catalog store and the in-memory
//! view the listener browses and searches.

mod model;
mod search;
mod store;

pub use model::{NewTrack, Track};
pub use search::Catalog;
pub use store::{CatalogError, CatalogStore, JsonCatalogStore};
