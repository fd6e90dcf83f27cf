//! Command implementations for the `duet` binary.
//!
//! Each command reads a source file, builds the tree and runs one visitor
//! over it. The functions return response values; printing and exit codes
//! are left to the binary.

use std::fs;
use std::path::Path;

use duet_core::Tree;
use tracing::{debug, info_span};

use crate::config::Config;
use crate::error::DuetError;
use crate::lint::Linter;
use crate::outline::OutlineRenderer;
use crate::output::{CheckResponse, DumpResponse, FormatResponse, OutlineResponse};

/// Read a source file.
pub fn read_source(path: &Path) -> Result<String, DuetError> {
    fs::read_to_string(path).map_err(|e| DuetError::FileNotReadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read and parse a source file.
pub fn load_tree(path: &Path) -> Result<(String, Tree), DuetError> {
    let source = read_source(path)?;
    let tree = duet_syntax::build_tree(&source).map_err(|e| DuetError::parse(path, e))?;
    debug!(file = %path.display(), nodes = tree.len(), "loaded");
    Ok((source, tree))
}

/// `duet outline`
pub fn run_outline(path: &Path, config: &Config) -> Result<OutlineResponse, DuetError> {
    let _span = info_span!("outline", file = %path.display()).entered();
    let (_, tree) = load_tree(path)?;
    let outline = OutlineRenderer::new()
        .collapse_kinds(config.outline.collapse.iter().copied())
        .render(tree.root())?;
    Ok(OutlineResponse::new(
        path.display().to_string(),
        outline.root,
        outline.summary,
    ))
}

/// `duet check`
pub fn run_check(path: &Path, config: &Config) -> Result<CheckResponse, DuetError> {
    let _span = info_span!("check", file = %path.display()).entered();
    let (_, tree) = load_tree(path)?;
    let report = Linter::new(&config.lint).check(tree.root())?;
    debug!(findings = report.findings.len(), "lint finished");
    Ok(CheckResponse::new(
        path.display().to_string(),
        report.findings,
        report.summary,
    ))
}

/// `duet fmt`
pub fn run_fmt(path: &Path) -> Result<FormatResponse, DuetError> {
    let _span = info_span!("fmt", file = %path.display()).entered();
    let (source, tree) = load_tree(path)?;
    let formatted = duet_syntax::generate_source(tree.root())?;
    Ok(FormatResponse::new(
        path.display().to_string(),
        &source,
        formatted,
    ))
}

/// `duet dump`
pub fn run_dump(path: &Path) -> Result<DumpResponse, DuetError> {
    let _span = info_span!("dump", file = %path.display()).entered();
    let (_, tree) = load_tree(path)?;
    Ok(DumpResponse::new(
        path.display().to_string(),
        tree.root().snapshot(),
    ))
}
