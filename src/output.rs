//! JSON output types for CLI responses.
//!
//! Every response carries `status` first and a `schema_version`, and the
//! same input always serializes to the same bytes.

use std::io::{self, Write};

use duet_core::ast::NodeSnapshot;
use duet_core::visitor::TraversalSummary;
use serde::Serialize;

use crate::error::{DuetError, OutputErrorCode};
use crate::lint::Finding;
use crate::outline::OutlineNode;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Common Types
// ============================================================================

/// Position in a source file (1-based).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub col: usize,
}

/// Error information for error responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code, also the exit status.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Where the error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ErrorInfo {
    pub fn from_error(err: &DuetError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let (message, location) = match err {
            DuetError::Parse { file, error } => (
                error.message.clone(),
                Some(Location {
                    file: file.clone(),
                    line: error.line,
                    col: error.column,
                }),
            ),
            other => (other.to_string(), None),
        };
        ErrorInfo {
            code,
            message,
            location,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &DuetError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Response for `duet outline`.
#[derive(Debug, Clone, Serialize)]
pub struct OutlineResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub file: String,
    pub summary: TraversalSummary,
    pub outline: OutlineNode,
}

impl OutlineResponse {
    pub fn new(file: impl Into<String>, outline: OutlineNode, summary: TraversalSummary) -> Self {
        OutlineResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            summary,
            outline,
        }
    }
}

/// Response for `duet check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    /// Status: "ok" when clean, "findings" otherwise.
    pub status: String,
    pub schema_version: String,
    pub file: String,
    pub summary: TraversalSummary,
    pub findings: Vec<Finding>,
}

impl CheckResponse {
    pub fn new(file: impl Into<String>, findings: Vec<Finding>, summary: TraversalSummary) -> Self {
        let status = if findings.is_empty() { "ok" } else { "findings" };
        CheckResponse {
            status: status.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            summary,
            findings,
        }
    }
}

/// Response for `duet fmt --format json`.
#[derive(Debug, Clone, Serialize)]
pub struct FormatResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub file: String,
    /// True if the formatted text differs from the input.
    pub changed: bool,
    pub source: String,
}

impl FormatResponse {
    pub fn new(file: impl Into<String>, original: &str, source: String) -> Self {
        FormatResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            changed: original != source,
            source,
        }
    }
}

/// Response for `duet dump`.
#[derive(Debug, Clone, Serialize)]
pub struct DumpResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub file: String,
    /// Number of nodes in the tree.
    pub nodes: usize,
    pub tree: NodeSnapshot,
}

impl DumpResponse {
    pub fn new(file: impl Into<String>, tree: NodeSnapshot) -> Self {
        DumpResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            nodes: tree.size(),
            tree,
        }
    }
}

// ============================================================================
// Response Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
