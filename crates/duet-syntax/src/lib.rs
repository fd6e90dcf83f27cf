//! Source text for duet trees.
//!
//! - [`build_tree`]: statement-language source to a [`Tree`](duet_core::Tree)
//! - [`generate_source`]: any subtree back to canonical source
//!
//! Generated text parses back into a structurally identical tree.

mod codegen;
mod error;
mod parser;

pub use codegen::{generate_source, SourceGenerator};
pub use error::ParseError;
pub use parser::{build_tree, parse_expression};
