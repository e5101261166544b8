//! Public lookahead entry point.
//!
//! [`Lookahead`] collects the hooks and limits for one traversal. [`run`]
//! is the error boundary: a failing traversal is reported through the error
//! hook or logged, and never reaches the resolver. [`try_run`] performs the
//! same traversal but returns the error.
//!
//! [`run`]: Lookahead::run
//! [`try_run`]: Lookahead::try_run

use tracing::{debug, error};

use crate::config::LookaheadConfig;
use crate::details::HandlerDetails;
use crate::engine::{NextHook, Traversal, Until, UntilHook};
use crate::error::LookaheadError;
use crate::operation::LookaheadInfo;
use crate::path::resolve_selection_sets;
use crate::wrapping::{composite_type, unwrap_to_named_type};

/// Receives a traversal failure; `Some` overrides the reported result.
pub type ErrorHook<'h> = Box<dyn FnOnce(&LookaheadError) -> Option<bool> + 'h>;

/// A lookahead over the selections below the resolving field.
///
/// # Example
///
/// ```ignore
/// let wants_quantity = Lookahead::new(&info)
///     .depth(2)
///     .until(|details| Ok(details.field_name() == "quantity"))
///     .run();
/// ```
///
/// Building nested include filters from the requested relations:
///
/// ```ignore
/// let root = Rc::new(RefCell::new(QueryFilter::default()));
///
/// Lookahead::with_state(&info, Rc::clone(&root))
///     .next(|details| {
///         let child = Rc::new(RefCell::new(QueryFilter::model(details.type_name())));
///         details.state().borrow_mut().include.push(Rc::clone(&child));
///         Ok(child)
///     })
///     .run();
/// ```
pub struct Lookahead<'i, 'h, S> {
    info: &'i LookaheadInfo<'i>,
    state: S,
    depth: Option<Option<usize>>,
    next: Option<NextHook<'h, S>>,
    until: Option<UntilHook<'h, S>>,
    on_error: Option<ErrorHook<'h>>,
    config: LookaheadConfig,
}

impl<'i, 'h> Lookahead<'i, 'h, ()> {
    /// Creates a lookahead without state.
    #[must_use]
    pub fn new(info: &'i LookaheadInfo<'i>) -> Self {
        Self::with_state(info, ())
    }
}

impl<'i, 'h, S> Lookahead<'i, 'h, S> {
    /// Creates a lookahead seeded with `state`.
    ///
    /// The state is handed to hooks by reference. Without a `next` hook every
    /// level sees this same value.
    #[must_use]
    pub fn with_state(info: &'i LookaheadInfo<'i>, state: S) -> Self {
        Self {
            info,
            state,
            depth: None,
            next: None,
            until: None,
            on_error: None,
            config: LookaheadConfig::default(),
        }
    }

    /// Applies configured defaults.
    ///
    /// A depth set on the builder takes precedence over `max_depth`.
    #[must_use]
    pub fn with_config(mut self, config: &LookaheadConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Visits only `depth` levels of fields below the resolving field.
    #[must_use]
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = Some(Some(depth));
        self
    }

    /// Visits the whole query, ignoring any configured `max_depth`.
    #[must_use]
    pub fn unlimited(mut self) -> Self {
        self.depth = Some(None);
        self
    }

    /// Sets the hook producing the state for a field's nested selections.
    ///
    /// Only called for fields that have nested selections.
    #[must_use]
    pub fn next<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&HandlerDetails<'_, S>) -> anyhow::Result<S> + 'h,
    {
        self.next = Some(Box::new(hook));
        self
    }

    /// Sets the early-stop predicate, called for every field.
    ///
    /// Return a `bool` or an [`Until`]; `Until::defer` keeps scanning and runs
    /// a callback after the field's siblings have been visited.
    #[must_use]
    pub fn until<F, U>(mut self, mut hook: F) -> Self
    where
        F: FnMut(&HandlerDetails<'_, S>) -> anyhow::Result<U> + 'h,
        U: Into<Until<'h>>,
    {
        self.until = Some(Box::new(move |details: &HandlerDetails<'_, S>| {
            hook(details).map(Into::into)
        }));
        self
    }

    /// Sets the hook receiving traversal failures.
    ///
    /// Returning `Some(result)` reports `result`; `None` reports the safe
    /// default. Failures handed to this hook are not logged.
    #[must_use]
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&LookaheadError) -> Option<bool> + 'h,
    {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Runs the traversal behind the error boundary.
    ///
    /// Returns `true` if `until` stopped the traversal. On failure returns
    /// the error hook's answer, or the configured safe default (`true`
    /// unless configured otherwise).
    pub fn run(mut self) -> bool {
        let on_error = self.on_error.take();
        let info = self.info;
        let safe_default = self.config.safe_default;
        let log_failures = self.config.log_failures;

        match self.try_run() {
            Ok(stopped) => stopped,
            Err(err) => {
                if let Some(on_error) = on_error {
                    return on_error(&err).unwrap_or(safe_default);
                }

                if log_failures {
                    error!(
                        path = %info.path,
                        return_type = %info.return_type,
                        code = err.error_code(),
                        error = %err,
                        "Lookahead traversal failed, assuming {safe_default}"
                    );
                }

                safe_default
            }
        }
    }

    /// Runs the traversal and returns failures to the caller.
    ///
    /// Any error hook is ignored.
    ///
    /// # Errors
    ///
    /// Returns the first path, type or hook failure encountered.
    pub fn try_run(self) -> Result<bool, LookaheadError> {
        let Self {
            info,
            state,
            depth,
            next,
            until,
            config,
            ..
        } = self;

        let root_type = unwrap_to_named_type(info.return_type);
        composite_type(info.schema, root_type)?;
        let selection_sets = resolve_selection_sets(info.schema, &info.operation, info.path)?;

        let max_depth = depth.unwrap_or(config.max_depth);

        debug!(
            path = %info.path,
            return_type = root_type,
            max_depth = ?max_depth,
            "Starting lookahead"
        );

        let traversal = Traversal::new(info, max_depth, next, until);
        let flow = traversal.run(&selection_sets, root_type, &state)?;

        Ok(flow.is_break())
    }
}

impl<S> std::fmt::Debug for Lookahead<'_, '_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lookahead")
            .field("info", self.info)
            .field("depth", &self.depth)
            .field("has_next", &self.next.is_some())
            .field("has_until", &self.until.is_some())
            .field("has_on_error", &self.on_error.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
