pub mod config;
pub mod error;
pub mod model;
pub mod taxonomy;
pub mod collection;
pub mod ingest;
pub mod graph;
pub mod analysis;
pub mod query;
pub mod validate;
pub mod mcp;

pub use config::Config;
pub use error::{BspecError, Result};
pub use collection::DocumentCollection;
pub use model::Document;
pub use taxonomy::Taxonomy;
