//! Error types and error code constants for duet.
//!
//! `DuetError` is the single error type the CLI renders. Errors from the
//! core, the parser and configuration loading are bridged into it with
//! `From` impls, and `OutputErrorCode` maps each variant to a stable exit
//! code:
//!
//! - `2`: invalid arguments (bad flags, unreadable or invalid config)
//! - `3`: parse errors (source text could not be built into a tree)
//! - `4`: structural or traversal errors from the core
//! - `5`: lint findings
//! - `10`: internal errors

use std::fmt;
use std::path::Path;

use duet_core::{MalformedNodeError, StructuralEditError, TraversalError};
use duet_syntax::ParseError;
use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad flags, config file problems).
    InvalidArguments = 2,
    /// Source text could not be parsed.
    ParseError = 3,
    /// Structural edit or traversal failed.
    StructuralError = 4,
    /// `check` found lint findings.
    LintFindings = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum DuetError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Input file could not be read.
    #[error("cannot read {path}: {message}")]
    FileNotReadable { path: String, message: String },

    /// Configuration file could not be read or parsed.
    #[error("invalid config {path}: {message}")]
    Config { path: String, message: String },

    /// Source text could not be built into a tree.
    #[error("{file}:{error}")]
    Parse {
        file: String,
        #[source]
        error: ParseError,
    },

    /// A payload failed validation.
    #[error(transparent)]
    Malformed(#[from] MalformedNodeError),

    /// A structural edit was rejected.
    #[error(transparent)]
    Structural(#[from] StructuralEditError),

    /// A traversal failed.
    #[error(transparent)]
    Traversal(#[from] TraversalError),

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl DuetError {
    pub fn invalid_args(message: impl Into<String>) -> Self {
        DuetError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DuetError::InternalError {
            message: message.into(),
        }
    }

    pub fn config(path: &Path, message: impl fmt::Display) -> Self {
        DuetError::Config {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// A parse error in `path`.
    pub fn parse(path: &Path, error: ParseError) -> Self {
        DuetError::Parse {
            file: path.display().to_string(),
            error,
        }
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&DuetError> for OutputErrorCode {
    fn from(err: &DuetError) -> Self {
        match err {
            DuetError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            DuetError::FileNotReadable { .. } => OutputErrorCode::InvalidArguments,
            DuetError::Config { .. } => OutputErrorCode::InvalidArguments,
            DuetError::Parse { .. } => OutputErrorCode::ParseError,
            DuetError::Malformed(_) => OutputErrorCode::StructuralError,
            DuetError::Structural(_) => OutputErrorCode::StructuralError,
            DuetError::Traversal(_) => OutputErrorCode::StructuralError,
            DuetError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<DuetError> for OutputErrorCode {
    fn from(err: DuetError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<ParseError> for DuetError {
    fn from(error: ParseError) -> Self {
        DuetError::Parse {
            file: "<input>".to_string(),
            error,
        }
    }
}

impl From<std::io::Error> for DuetError {
    fn from(err: std::io::Error) -> Self {
        DuetError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for DuetError {
    fn from(err: serde_json::Error) -> Self {
        DuetError::internal(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use duet_core::{NodeKind, Tree, UnsupportedNodeKindError};

    #[test]
    fn test_error_codes() {
        assert_eq!(OutputErrorCode::InvalidArguments.code(), 2);
        assert_eq!(OutputErrorCode::ParseError.code(), 3);
        assert_eq!(OutputErrorCode::StructuralError.code(), 4);
        assert_eq!(OutputErrorCode::LintFindings.code(), 5);
        assert_eq!(OutputErrorCode::InternalError.code(), 10);
        assert_eq!(OutputErrorCode::LintFindings.to_string(), "5");
    }

    #[test]
    fn test_parse_error_maps_to_3() {
        let parse = duet_syntax::build_tree("function {").unwrap_err();
        let err = DuetError::parse(Path::new("main.bal"), parse);
        assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::ParseError);
        assert!(err.to_string().starts_with("main.bal:1:"));

        let bare: DuetError = duet_syntax::build_tree("}").unwrap_err().into();
        assert!(bare.to_string().starts_with("<input>:1:1: "));
    }

    #[test]
    fn test_core_errors_map_to_4() {
        let tree = Tree::default();
        let unsupported = UnsupportedNodeKindError::new(NodeKind::Block, tree.root_id(), "V");
        let err: DuetError = TraversalError::from(unsupported).into();
        assert_eq!(OutputErrorCode::from(err), OutputErrorCode::StructuralError);

        let err: DuetError = StructuralEditError::RootNode {
            node: tree.root_id(),
            operation: "discard",
        }
        .into();
        assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::StructuralError);
    }

    #[test]
    fn test_config_error_is_invalid_arguments() {
        let err = DuetError::config(Path::new("duet.toml"), "unknown field `colour`");
        assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InvalidArguments);
        assert_eq!(
            err.to_string(),
            "invalid config duet.toml: unknown field `colour`"
        );
    }
}
