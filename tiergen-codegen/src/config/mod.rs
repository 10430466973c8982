//! Configuration for tiergen-codegen

pub mod defaults;
mod settings;

pub use settings::*;
