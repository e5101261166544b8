//! Depth-first selection traversal.
//!
//! The engine walks the selection sets below the resolving field, calling
//! `until` for every concrete field and `next` for every field that has
//! nested selections. Fragments are transparent: they are expanded in place,
//! share the enclosing level's state, depth and deferred queue, and never
//! reach the hooks themselves.

use std::ops::ControlFlow;

use async_graphql_parser::types::{Selection, SelectionSet};
use tracing::{debug, trace};

use crate::details::HandlerDetails;
use crate::error::{HookKind, LookaheadError};
use crate::operation::LookaheadInfo;
use crate::selection::{Classified, classify};
use crate::wrapping::fields_of;

/// Callback deferred by `until` until its selection set has been scanned.
pub type Deferred<'h> = Box<dyn FnOnce() -> anyhow::Result<()> + 'h>;

/// Produces the state passed to a field's nested selections.
pub type NextHook<'h, S> = Box<dyn FnMut(&HandlerDetails<'_, S>) -> anyhow::Result<S> + 'h>;

/// Decides whether the traversal stops at a field.
pub type UntilHook<'h, S> =
    Box<dyn FnMut(&HandlerDetails<'_, S>) -> anyhow::Result<Until<'h>> + 'h>;

/// Result of an `until` hook.
///
/// `bool` converts into `Stop` (`true`) or `Continue` (`false`).
pub enum Until<'h> {
    /// Keep scanning.
    Continue,
    /// Abort the whole traversal; the lookahead reports `true`.
    Stop,
    /// Keep scanning and run the callback once every sibling of the current
    /// field has been visited.
    Defer(Deferred<'h>),
}

impl<'h> Until<'h> {
    /// Defers `callback` until the current selection set has been scanned.
    pub fn defer(callback: impl FnOnce() -> anyhow::Result<()> + 'h) -> Self {
        Self::Defer(Box::new(callback))
    }
}

impl From<bool> for Until<'_> {
    fn from(stop: bool) -> Self {
        if stop { Self::Stop } else { Self::Continue }
    }
}

impl std::fmt::Debug for Until<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => f.write_str("Continue"),
            Self::Stop => f.write_str("Stop"),
            Self::Defer(_) => f.write_str("Defer(..)"),
        }
    }
}

type Flow = ControlFlow<()>;

/// A single traversal over the selections below the resolving field.
pub(crate) struct Traversal<'i, 'h, S> {
    info: &'i LookaheadInfo<'i>,
    max_depth: Option<usize>,
    next: Option<NextHook<'h, S>>,
    until: Option<UntilHook<'h, S>>,
    /// Named fragments currently being expanded, to stop on cycles.
    active_fragments: Vec<&'i str>,
}

impl<'i, 'h, S> Traversal<'i, 'h, S> {
    pub(crate) fn new(
        info: &'i LookaheadInfo<'i>,
        max_depth: Option<usize>,
        next: Option<NextHook<'h, S>>,
        until: Option<UntilHook<'h, S>>,
    ) -> Self {
        Self {
            info,
            max_depth,
            next,
            until,
            active_fragments: Vec::new(),
        }
    }

    /// Walks `selection_sets` as one level. Every set selects on `type_name`.
    ///
    /// Returns `Break` if `until` stopped the traversal.
    pub(crate) fn run(
        mut self,
        selection_sets: &[&'i SelectionSet],
        type_name: &'i str,
        state: &S,
    ) -> Result<Flow, LookaheadError> {
        if self.max_depth == Some(0) {
            return Ok(ControlFlow::Continue(()));
        }

        self.walk_level(selection_sets, type_name, state, 0)
    }

    /// Scans one field level and then runs the callbacks it deferred.
    fn walk_level(
        &mut self,
        selection_sets: &[&'i SelectionSet],
        type_name: &'i str,
        state: &S,
        depth: usize,
    ) -> Result<Flow, LookaheadError> {
        let mut deferred = Vec::new();

        for &set in selection_sets {
            let flow = self.scan(set, type_name, state, depth, &mut deferred)?;
            if flow.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }

        for callback in deferred {
            callback().map_err(hook_error(HookKind::Deferred))?;
        }

        Ok(ControlFlow::Continue(()))
    }

    fn scan(
        &mut self,
        selection_set: &'i SelectionSet,
        type_name: &'i str,
        state: &S,
        depth: usize,
        deferred: &mut Vec<Deferred<'h>>,
    ) -> Result<Flow, LookaheadError> {
        let info = self.info;
        let fragments = info.operation.fragments;
        let parent_fields = fields_of(info.schema, type_name);

        for item in &selection_set.items {
            match classify(&item.node, fragments, type_name, parent_fields)? {
                Classified::Unresolved => {
                    trace!(parent_type = type_name, "Skipping unresolved selection");
                }
                Classified::Fragment {
                    type_name: inner_type,
                    selection_set: inner,
                } => {
                    let spread = spread_name(&item.node);
                    if let Some(name) = spread {
                        if self.active_fragments.contains(&name) {
                            continue;
                        }
                        self.active_fragments.push(name);
                    }

                    let flow = self.scan(inner, inner_type, state, depth, deferred);

                    if spread.is_some() {
                        self.active_fragments.pop();
                    }
                    if flow?.is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
                Classified::Field {
                    field,
                    definition,
                    type_name: field_type,
                    nested,
                } => {
                    let level = depth + 1;
                    let details = HandlerDetails::new(
                        field,
                        definition,
                        field_type,
                        type_name,
                        state,
                        level,
                        info,
                    );

                    if let Some(until) = self.until.as_mut() {
                        match until(&details).map_err(hook_error(HookKind::Until))? {
                            Until::Stop => {
                                debug!(
                                    field = details.field_name(),
                                    source_type = type_name,
                                    depth = level,
                                    "Lookahead stopped"
                                );
                                return Ok(ControlFlow::Break(()));
                            }
                            Until::Defer(callback) => deferred.push(callback),
                            Until::Continue => {}
                        }
                    }

                    // Leaves end the branch without a `next` call.
                    let Some(nested) = nested else {
                        continue;
                    };

                    let child_state = self
                        .next
                        .as_mut()
                        .map(|next| next(&details))
                        .transpose()
                        .map_err(hook_error(HookKind::Next))?;

                    if self.max_depth.is_some_and(|max| level >= max) {
                        continue;
                    }

                    let nested = [nested];
                    let flow = match &child_state {
                        Some(child) => self.walk_level(&nested, field_type, child, level)?,
                        None => self.walk_level(&nested, field_type, state, level)?,
                    };
                    if flow.is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
            }
        }

        Ok(ControlFlow::Continue(()))
    }
}

fn spread_name(selection: &Selection) -> Option<&str> {
    match selection {
        Selection::FragmentSpread(spread) => Some(spread.node.fragment_name.node.as_str()),
        _ => None,
    }
}

fn hook_error(hook: HookKind) -> impl FnOnce(anyhow::Error) -> LookaheadError {
    move |err| LookaheadError::handler(hook, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_until_from_bool() {
        assert!(matches!(Until::from(true), Until::Stop));
        assert!(matches!(Until::from(false), Until::Continue));
    }

    #[test]
    fn test_deferred_callback_runs_once() {
        let mut calls = 0;
        {
            let until = Until::defer(|| {
                calls += 1;
                Ok(())
            });
            let Until::Defer(callback) = until else {
                panic!("expected deferred callback");
            };
            callback().unwrap();
        }
        assert_eq!(calls, 1);
    }
}
