//! Operation tree, execution path and resolver info.
//!
//! These types describe where a resolver currently is: which operation is
//! being executed, the chain of response keys from the root down to the
//! resolving field, and the field's return type.

use std::collections::HashMap;
use std::fmt;

use async_graphql::Variables;
use async_graphql_parser::Positioned;
use async_graphql_parser::types::{
    DocumentOperations, ExecutableDocument, FragmentDefinition, SelectionSet, Type,
    VariableDefinition,
};
use async_graphql_value::{ConstValue, Name};

use crate::error::LookaheadError;
use crate::registry::TypeRegistry;

/// Fragment definitions keyed by fragment name.
pub type FragmentMap = HashMap<Name, Positioned<FragmentDefinition>>;

/// The operation being executed: its root selection set and the document's
/// fragment definitions.
#[derive(Debug, Clone, Copy)]
pub struct OperationTree<'a> {
    /// Root selection set of the operation.
    pub selection_set: &'a SelectionSet,

    /// Fragment definitions of the document.
    pub fragments: &'a FragmentMap,

    /// Variable definitions of the operation.
    pub variable_definitions: &'a [Positioned<VariableDefinition>],
}

impl<'a> OperationTree<'a> {
    /// Creates an operation tree from its parts.
    pub fn new(selection_set: &'a SelectionSet, fragments: &'a FragmentMap) -> Self {
        Self {
            selection_set,
            fragments,
            variable_definitions: &[],
        }
    }

    /// Selects an operation from a parsed document.
    ///
    /// With `operation_name = None` the document must contain exactly one
    /// operation.
    ///
    /// # Errors
    ///
    /// Returns `LookaheadError::UnknownOperation` if no single operation
    /// matches.
    pub fn from_document(
        document: &'a ExecutableDocument,
        operation_name: Option<&str>,
    ) -> Result<Self, LookaheadError> {
        let unknown = || LookaheadError::UnknownOperation(operation_name.map(str::to_string));

        let operation = match (&document.operations, operation_name) {
            (DocumentOperations::Single(operation), None) => operation,
            (DocumentOperations::Single(_), Some(_)) => return Err(unknown()),
            (DocumentOperations::Multiple(operations), Some(name)) => {
                operations.get(name).ok_or_else(unknown)?
            }
            (DocumentOperations::Multiple(operations), None) => {
                let mut iter = operations.values();
                match (iter.next(), iter.next()) {
                    (Some(operation), None) => operation,
                    _ => return Err(unknown()),
                }
            }
        };

        Ok(Self {
            selection_set: &operation.node.selection_set.node,
            fragments: &document.fragments,
            variable_definitions: &operation.node.variable_definitions,
        })
    }

    /// Looks up a fragment definition by name.
    pub fn fragment(&self, name: &str) -> Option<&'a FragmentDefinition> {
        self.fragments.get(name).map(|fragment| &fragment.node)
    }

    /// Returns the default value declared for an operation variable.
    pub fn variable_default(&self, name: &str) -> Option<&'a ConstValue> {
        self.variable_definitions
            .iter()
            .find(|definition| definition.node.name.node.as_str() == name)
            .and_then(|definition| definition.node.default_value.as_ref())
            .map(|value| &value.node)
    }
}

/// Key of one execution path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKey {
    /// Response key of a field (its alias, or its name when not aliased).
    Field(Name),
    /// Index into a list result.
    Index(usize),
}

/// One segment of an execution path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// Field response key or list index.
    pub key: PathKey,

    /// Name of the object type the field was resolved on, when known.
    pub type_name: Option<Name>,
}

/// Ordered path from the operation root to the resolving field.
///
/// # Example
///
/// ```
/// use octofhir_graphql_lookahead::ExecutionPath;
///
/// let path = ExecutionPath::new()
///     .field("order", "Query")
///     .field("items", "Order")
///     .index(0)
///     .field("product", "OrderItem");
///
/// assert_eq!(path.to_string(), "order.items.0.product");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPath {
    segments: Vec<PathSegment>,
}

impl ExecutionPath {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field segment resolved on `type_name`.
    #[must_use]
    pub fn field(mut self, key: impl AsRef<str>, type_name: impl AsRef<str>) -> Self {
        self.segments.push(PathSegment {
            key: PathKey::Field(Name::new(key)),
            type_name: Some(Name::new(type_name)),
        });
        self
    }

    /// Appends a list index segment.
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment {
            key: PathKey::Index(index),
            type_name: None,
        });
        self
    }

    /// Appends an arbitrary segment.
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Returns the path segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns whether the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromIterator<PathSegment> for ExecutionPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ExecutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match &segment.key {
                PathKey::Field(name) => f.write_str(name)?,
                PathKey::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

/// Everything a lookahead needs to know about the resolving field.
#[derive(Clone, Copy)]
pub struct LookaheadInfo<'a> {
    /// Schema type registry.
    pub schema: &'a dyn TypeRegistry,

    /// Operation being executed.
    pub operation: OperationTree<'a>,

    /// Path from the operation root to the resolving field.
    pub path: &'a ExecutionPath,

    /// Return type of the resolving field, possibly wrapped.
    pub return_type: &'a Type,

    /// Resolved variable values of the request.
    pub variables: Option<&'a Variables>,
}

impl<'a> LookaheadInfo<'a> {
    /// Creates resolver info without variables.
    pub fn new(
        schema: &'a dyn TypeRegistry,
        operation: OperationTree<'a>,
        path: &'a ExecutionPath,
        return_type: &'a Type,
    ) -> Self {
        Self {
            schema,
            operation,
            path,
            return_type,
            variables: None,
        }
    }

    /// Sets the resolved variable values.
    #[must_use]
    pub fn with_variables(mut self, variables: &'a Variables) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Returns the value of a variable, falling back to the default declared
    /// by the operation.
    pub fn variable(&self, name: &str) -> Option<&'a ConstValue> {
        self.variables
            .and_then(|variables| variables.get(name))
            .or_else(|| self.operation.variable_default(name))
    }
}

impl fmt::Debug for LookaheadInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookaheadInfo")
            .field("path", &self.path.to_string())
            .field("return_type", &self.return_type.to_string())
            .finish_non_exhaustive()
    }
}
