//! Menu read models assembled from the catalog and modifier tables

mod assembly;

pub use assembly::{assemble_item, assemble_menu};
