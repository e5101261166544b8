//! Locating the resolving field's selection sets.
//!
//! The execution path lists response keys and list indices from the
//! operation root down to the field that is currently resolving. The
//! operation tree has no indices and may spread the field through any
//! number of fragments, so matching skips indices and treats fragments as
//! transparent.
//!
//! A response key can be selected more than once (`order { status }` next to
//! `order { items { quantity } }`). Such selections execute as a single field,
//! so every selection set matching the path is returned.

use std::ptr;

use async_graphql_parser::types::{Selection, SelectionSet};
use async_graphql_value::Name;
use tracing::trace;

use crate::error::LookaheadError;
use crate::operation::{ExecutionPath, OperationTree, PathKey, PathSegment};
use crate::registry::TypeRegistry;

/// Finds every selection set of the field at the end of `path`, in document
/// order.
///
/// # Errors
///
/// Returns `EmptyPath` if the path has no field segment, `PathMismatch` if
/// the operation has no selection matching the path and `UnknownFragment`
/// if a scanned spread references an undefined fragment.
pub fn resolve_selection_sets<'a>(
    schema: &dyn TypeRegistry,
    operation: &OperationTree<'a>,
    path: &ExecutionPath,
) -> Result<Vec<&'a SelectionSet>, LookaheadError> {
    if !path
        .segments()
        .iter()
        .any(|segment| matches!(segment.key, PathKey::Field(_)))
    {
        return Err(LookaheadError::EmptyPath);
    }

    let mut resolver = PathResolver {
        schema,
        operation,
        active_fragments: Vec::new(),
        found: Vec::new(),
    };
    resolver.collect(operation.selection_set, path.segments())?;

    if resolver.found.is_empty() {
        return Err(LookaheadError::path_mismatch(path));
    }

    Ok(resolver.found)
}

struct PathResolver<'s, 'o, 'a> {
    schema: &'s dyn TypeRegistry,
    operation: &'o OperationTree<'a>,
    /// Named fragments currently being expanded, to stop on cycles.
    active_fragments: Vec<&'a str>,
    found: Vec<&'a SelectionSet>,
}

impl<'a> PathResolver<'_, '_, 'a> {
    fn collect(
        &mut self,
        selection_set: &'a SelectionSet,
        segments: &[PathSegment],
    ) -> Result<(), LookaheadError> {
        // List indices never appear in the operation tree.
        let segments = skip_indices(segments);

        let Some((segment, rest)) = segments.split_first() else {
            // The same fragment can be spread twice on one path.
            if !self.found.iter().any(|set| ptr::eq(*set, selection_set)) {
                self.found.push(selection_set);
            }
            return Ok(());
        };
        let PathKey::Field(key) = &segment.key else {
            return Ok(());
        };

        for item in &selection_set.items {
            match &item.node {
                Selection::Field(field) => {
                    let field = &field.node;
                    if field.response_key().node != *key {
                        continue;
                    }

                    trace!(key = %key, "Matched execution path segment");
                    self.collect(&field.selection_set.node, rest)?;
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    let fragment = self
                        .operation
                        .fragment(name)
                        .ok_or_else(|| LookaheadError::unknown_fragment(name))?;

                    let condition = &fragment.type_condition.node.on.node;
                    if self.active_fragments.contains(&name)
                        || !self.applies(Some(condition), segment)
                    {
                        continue;
                    }

                    self.active_fragments.push(name);
                    let result = self.collect(&fragment.selection_set.node, segments);
                    self.active_fragments.pop();
                    result?;
                }
                Selection::InlineFragment(inline) => {
                    let inline = &inline.node;
                    let condition = inline.type_condition.as_ref().map(|c| &c.node.on.node);
                    if self.applies(condition, segment) {
                        self.collect(&inline.selection_set.node, segments)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// A fragment is entered when its type condition applies to the type the
    /// path segment was resolved on. Missing information on either side is
    /// treated as a match.
    fn applies(&self, condition: Option<&Name>, segment: &PathSegment) -> bool {
        let (Some(condition), Some(concrete)) = (condition, &segment.type_name) else {
            return true;
        };
        self.schema.is_possible_type(condition, concrete)
    }
}

fn skip_indices(segments: &[PathSegment]) -> &[PathSegment] {
    let start = segments
        .iter()
        .position(|segment| matches!(segment.key, PathKey::Field(_)))
        .unwrap_or(segments.len());
    &segments[start..]
}
