//! Table metadata and the providers that supply it

mod catalog;
mod metadata;
mod provider;
mod schema_parser;

pub use catalog::*;
pub use metadata::*;
pub use provider::*;
pub use schema_parser::*;
