//! duet: AST core for a visual/source dual editor
//!
//! The program model, visitor protocol and mutation API live in
//! `duet-core`; text to tree and back lives in `duet-syntax`. This crate
//! re-exports both and adds the host-side visitors the editor runs over a
//! tree (outline, lint), plus configuration and JSON output for the `duet`
//! binary.

// Core model - re-exported from duet-core
pub use duet_core::ast;
pub use duet_core::events;
pub use duet_core::visitor;
pub use duet_core::{
    MalformedNodeError, NodeData, NodeId, NodeKind, NodeRef, ReentrantTraversalError,
    StructuralEditError, TraversalError, Tree, UnknownNodeError, UnsupportedNodeKindError,
};

// Text front end - re-exported from duet-syntax
pub use duet_syntax::{build_tree, generate_source, parse_expression, ParseError, SourceGenerator};

// Host-side visitors
pub mod lint;
pub mod outline;

// Front door
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
