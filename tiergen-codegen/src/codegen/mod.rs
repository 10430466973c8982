//! Code generation module

mod bll_generator;
mod code_generator;
mod dal_generator;
mod key_resolver;
mod naming;
mod output;
mod template;
mod type_resolver;

pub use bll_generator::build_bll;
pub use code_generator::*;
pub use dal_generator::build_dal;
pub use key_resolver::*;
pub use naming::*;
pub use output::*;
pub use template::*;
pub use type_resolver::*;
