//! # octofhir-graphql-lookahead
//!
//! Selection-set lookahead for GraphQL resolvers.
//!
//! A resolver often needs to know which nested fields the client asked for
//! before it fetches anything: to join related resources in one query, to
//! skip an expensive computation nobody requested, or to build include
//! filters for the storage layer. This crate walks the selections below the
//! field that is currently resolving and hands every requested field to
//! caller-supplied hooks.
//!
//! ## Overview
//!
//! - `until` is called for every field and can stop the traversal, or defer
//!   a callback until the field's siblings have been seen
//! - `next` is called for fields with nested selections and produces the
//!   state handed to that nested level
//! - fragments, named or inline, are expanded in place and never reach the
//!   hooks
//! - failures never reach the resolver: [`Lookahead::run`] reports them
//!   through an error hook or the log and returns a safe default
//!
//! ```ignore
//! let needs_inventory = Lookahead::new(&info)
//!     .until(|details| Ok(details.type_name() == "Inventory"))
//!     .run();
//! ```
//!
//! ## Configuration
//!
//! Add to `octofhir.toml`:
//!
//! ```toml
//! [graphql.lookahead]
//! max_depth = 5
//! safe_default = true
//! log_failures = true
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration options
//! - [`lookahead`] - Builder and error boundary
//! - [`engine`] - Depth-first traversal and deferred callbacks
//! - [`details`] - Per-field details handed to hooks
//! - [`operation`] - Operation tree, execution path and resolver info
//! - [`path`] - Locating the resolving field's selection sets
//! - [`registry`] - Schema type lookup
//! - [`selection`] - Selection classification
//! - [`wrapping`] - List and non-null wrapper handling
//! - [`error`] - Error types for lookahead operations

pub mod config;
pub mod details;
pub mod engine;
pub mod error;
pub mod lookahead;
pub mod operation;
pub mod path;
pub mod registry;
pub mod selection;
pub mod wrapping;

// Re-export main types
pub use config::LookaheadConfig;
pub use details::{ArgumentValues, HandlerDetails};
pub use engine::{Deferred, Until};
pub use error::{ErrorCategory, HookKind, LookaheadError};
pub use lookahead::Lookahead;
pub use operation::{ExecutionPath, LookaheadInfo, OperationTree, PathKey, PathSegment};
pub use registry::{
    ArgumentDefinition, FieldDefinition, FieldMap, SdlRegistry, TypeDefinition, TypeKind,
    TypeRegistry,
};

/// Result type for lookahead operations.
pub type Result<T> = std::result::Result<T, LookaheadError>;
