//! Error type for building trees from source.

use thiserror::Error;

/// Source text could not be turned into a tree.
///
/// Covers both grammar errors and payload construction errors found while
/// lowering (for example `a + b = 1;`, whose target is not assignable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    /// 1-based line.
    pub line: usize,
    /// 1-based column, in characters.
    pub column: usize,
    pub message: String,
}

impl ParseError {
    /// Locate byte `offset` of `source` and attach `message`.
    pub(crate) fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count())
            + 1;
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}
