pub mod loader;
pub mod store;

pub use store::{MetadataStore, Partition, Topic};
