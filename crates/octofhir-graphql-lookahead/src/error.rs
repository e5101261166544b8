//! Error types for lookahead traversals.
//!
//! Every failure that can happen while locating the starting selection set,
//! resolving types, or running caller hooks is represented here. Errors travel
//! as `Result` values through the traversal and are only collapsed into a
//! boolean at the public boundary (see [`crate::Lookahead::run`]).

use std::fmt;

use thiserror::Error;

/// Which caller-supplied hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// The `next` hook producing child state.
    Next,
    /// The `until` early-stop predicate.
    Until,
    /// A callback deferred by `until` to run after a sibling scan.
    Deferred,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str("next"),
            Self::Until => f.write_str("until"),
            Self::Deferred => f.write_str("deferred"),
        }
    }
}

/// Broad classification of a [`LookaheadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A type referenced by the query or return type cannot be used.
    TypeResolution,
    /// The execution path cannot be matched against the operation.
    PathResolution,
    /// A caller hook failed.
    Handler,
    /// The schema itself could not be built.
    Schema,
}

/// Errors that can occur during a lookahead traversal.
#[derive(Debug, Error)]
pub enum LookaheadError {
    /// A named type is not present in the schema.
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// A type was expected to carry fields but is a scalar, enum or input.
    #[error("Type {0} has no selectable fields")]
    NonCompositeType(String),

    /// A fragment spread references a fragment missing from the document.
    #[error("Unknown fragment: {0}")]
    UnknownFragment(String),

    /// The execution path has no field segments.
    #[error("Execution path is empty")]
    EmptyPath,

    /// The execution path does not match the operation's selection sets.
    #[error("No selection set matches execution path {path}")]
    PathMismatch {
        /// Rendered execution path.
        path: String,
    },

    /// The requested operation is not in the document.
    #[error("Unknown operation: {}", .0.as_deref().unwrap_or("<anonymous>"))]
    UnknownOperation(Option<String>),

    /// Schema SDL could not be parsed.
    #[error("Failed to parse schema: {0}")]
    SchemaParse(String),

    /// A caller-supplied hook returned an error.
    #[error("{hook} hook failed: {source}")]
    Handler {
        /// The hook that failed.
        hook: HookKind,
        /// Error returned by the hook.
        #[source]
        source: anyhow::Error,
    },
}

impl LookaheadError {
    /// Create a new UnknownType error
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType(name.into())
    }

    /// Create a new NonCompositeType error
    pub fn non_composite_type(name: impl Into<String>) -> Self {
        Self::NonCompositeType(name.into())
    }

    /// Create a new UnknownFragment error
    pub fn unknown_fragment(name: impl Into<String>) -> Self {
        Self::UnknownFragment(name.into())
    }

    /// Create a new PathMismatch error
    pub fn path_mismatch(path: impl fmt::Display) -> Self {
        Self::PathMismatch {
            path: path.to_string(),
        }
    }

    /// Wrap an error returned by a caller hook.
    pub fn handler(hook: HookKind, source: anyhow::Error) -> Self {
        Self::Handler { hook, source }
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownType(_) | Self::NonCompositeType(_) => ErrorCategory::TypeResolution,
            Self::UnknownFragment(_)
            | Self::EmptyPath
            | Self::PathMismatch { .. }
            | Self::UnknownOperation(_) => ErrorCategory::PathResolution,
            Self::Handler { .. } => ErrorCategory::Handler,
            Self::SchemaParse(_) => ErrorCategory::Schema,
        }
    }

    /// Returns a stable error code suitable for structured logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownType(_) => "UNKNOWN_TYPE",
            Self::NonCompositeType(_) => "NON_COMPOSITE_TYPE",
            Self::UnknownFragment(_) => "UNKNOWN_FRAGMENT",
            Self::EmptyPath => "EMPTY_PATH",
            Self::PathMismatch { .. } => "PATH_MISMATCH",
            Self::UnknownOperation(_) => "UNKNOWN_OPERATION",
            Self::SchemaParse(_) => "SCHEMA_PARSE",
            Self::Handler { .. } => "HANDLER_FAILED",
        }
    }
}

impl From<async_graphql_parser::Error> for LookaheadError {
    fn from(err: async_graphql_parser::Error) -> Self {
        Self::SchemaParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            LookaheadError::unknown_type("Order").category(),
            ErrorCategory::TypeResolution
        );
        assert_eq!(
            LookaheadError::non_composite_type("Int").category(),
            ErrorCategory::TypeResolution
        );
        assert_eq!(
            LookaheadError::EmptyPath.category(),
            ErrorCategory::PathResolution
        );
        assert_eq!(
            LookaheadError::unknown_fragment("ItemFields").category(),
            ErrorCategory::PathResolution
        );

        let handler = LookaheadError::handler(HookKind::Next, anyhow::anyhow!("boom"));
        assert_eq!(handler.category(), ErrorCategory::Handler);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LookaheadError::path_mismatch("order.items").error_code(),
            "PATH_MISMATCH"
        );
        assert_eq!(
            LookaheadError::UnknownOperation(None).error_code(),
            "UNKNOWN_OPERATION"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LookaheadError::path_mismatch("order.items.0").to_string(),
            "No selection set matches execution path order.items.0"
        );
        assert_eq!(
            LookaheadError::UnknownOperation(None).to_string(),
            "Unknown operation: <anonymous>"
        );

        let deferred = LookaheadError::handler(HookKind::Deferred, anyhow::anyhow!("boom"));
        assert_eq!(deferred.to_string(), "deferred hook failed: boom");
    }

    #[test]
    fn test_handler_source() {
        use std::error::Error as _;

        let err = LookaheadError::handler(HookKind::Until, anyhow::anyhow!("bad state"));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("bad state"));
    }
}
