//! Per-field details handed to lookahead hooks.

use std::cell::OnceCell;
use std::convert::Infallible;
use std::fmt;

use async_graphql_parser::types::{Field, SelectionSet};
use async_graphql_value::{ConstValue, Name, Value};
use indexmap::IndexMap;

use crate::operation::LookaheadInfo;
use crate::registry::{FieldDefinition, TypeRegistry};
use crate::selection::nested_selection_set;
use crate::wrapping::is_list_type;

/// Resolved argument values keyed by argument name.
pub type ArgumentValues = IndexMap<Name, ConstValue>;

/// What a hook knows about the field being visited.
///
/// Argument values are only resolved when [`args`](Self::args) is first
/// called and are cached afterwards.
pub struct HandlerDetails<'d, S> {
    field: &'d Field,
    definition: &'d FieldDefinition,
    type_name: &'d str,
    source_type: &'d str,
    state: &'d S,
    depth: usize,
    info: &'d LookaheadInfo<'d>,
    args: OnceCell<ArgumentValues>,
}

impl<'d, S> HandlerDetails<'d, S> {
    pub(crate) fn new(
        field: &'d Field,
        definition: &'d FieldDefinition,
        type_name: &'d str,
        source_type: &'d str,
        state: &'d S,
        depth: usize,
        info: &'d LookaheadInfo<'d>,
    ) -> Self {
        Self {
            field,
            definition,
            type_name,
            source_type,
            state,
            depth,
            info,
            args: OnceCell::new(),
        }
    }

    /// Schema name of the field.
    #[must_use]
    pub fn field_name(&self) -> &'d str {
        self.field.name.node.as_str()
    }

    /// Alias of the field, if the query set one.
    #[must_use]
    pub fn alias(&self) -> Option<&'d str> {
        self.field.alias.as_ref().map(|alias| alias.node.as_str())
    }

    /// Key of the field in the response: its alias, or its name.
    #[must_use]
    pub fn response_key(&self) -> &'d str {
        self.field.response_key().node.as_str()
    }

    /// Named return type of the field, with list and non-null wrappers
    /// removed.
    #[must_use]
    pub fn type_name(&self) -> &'d str {
        self.type_name
    }

    /// Type the field is declared on.
    #[must_use]
    pub fn source_type(&self) -> &'d str {
        self.source_type
    }

    /// State of the enclosing level.
    #[must_use]
    pub fn state(&self) -> &'d S {
        self.state
    }

    /// Nesting level of the field below the lookahead entry point, starting
    /// at 1. Fragments do not count.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The raw field selection node.
    #[must_use]
    pub fn selection(&self) -> &'d Field {
        self.field
    }

    /// Nested selections of the field, `None` for leaves.
    #[must_use]
    pub fn nested_selection_set(&self) -> Option<&'d SelectionSet> {
        nested_selection_set(self.field)
    }

    /// Schema definition of the field.
    #[must_use]
    pub fn field_definition(&self) -> &'d FieldDefinition {
        self.definition
    }

    /// Schema the traversal reads types from.
    #[must_use]
    pub fn schema(&self) -> &'d dyn TypeRegistry {
        self.info.schema
    }

    /// Returns whether the field's type is a list.
    #[must_use]
    pub fn is_list(&self) -> bool {
        is_list_type(&self.definition.ty)
    }

    /// Resolved argument values of the field.
    ///
    /// Literals are taken from the query with variables substituted, and
    /// omitted arguments fall back to the schema default. Arguments without
    /// a value or default are left out, as are arguments the schema does not
    /// declare.
    pub fn args(&self) -> &ArgumentValues {
        self.args.get_or_init(|| self.resolve_arguments())
    }

    /// Resolved value of a single argument.
    pub fn arg(&self, name: &str) -> Option<&ConstValue> {
        self.args().get(name)
    }

    fn resolve_arguments(&self) -> ArgumentValues {
        let mut values = ArgumentValues::new();

        for argument in &self.definition.arguments {
            let provided = self
                .field
                .get_argument(argument.name.as_str())
                .map(|value| &value.node);

            let value = match provided {
                // An unset variable behaves like an omitted argument.
                Some(Value::Variable(name)) => self
                    .info
                    .variable(name.as_str())
                    .cloned()
                    .or_else(|| argument.default_value.clone()),
                Some(value) => Some(self.to_const(value.clone())),
                None => argument.default_value.clone(),
            };

            if let Some(value) = value {
                values.insert(argument.name.clone(), value);
            }
        }

        values
    }

    fn to_const(&self, value: Value) -> ConstValue {
        let info = self.info;
        let Ok(value) = value.into_const_with(|name| {
            Ok::<_, Infallible>(info.variable(&name).cloned().unwrap_or(ConstValue::Null))
        });
        value
    }
}

impl<S> fmt::Debug for HandlerDetails<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDetails")
            .field("field_name", &self.field_name())
            .field("type_name", &self.type_name)
            .field("source_type", &self.source_type)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_graphql::Variables;
    use async_graphql_parser::parse_query;
    use async_graphql_parser::types::Selection;

    use super::*;
    use crate::operation::{ExecutionPath, OperationTree};
    use crate::registry::{SdlRegistry, TypeRegistry};

    const SDL: &str = r#"
        type Query { page: Page }
        type Page {
            products(where: ProductWhere, first: Int = 20, after: String): [Product!]!
        }
        type Product { color: String }
        input ProductWhere { color: String size: String }
    "#;

    fn first_field(set: &SelectionSet) -> &Field {
        match &set.items[0].node {
            Selection::Field(field) => &field.node,
            _ => panic!("expected field"),
        }
    }

    #[test]
    fn test_args_resolve_literals_variables_and_defaults() {
        let schema = SdlRegistry::parse(SDL).unwrap();
        let document = parse_query(
            r#"
            query Page($size: String, $after: String) {
                page { products(where: { color: "blue", size: $size }, after: $after) { color } }
            }
            "#,
        )
        .unwrap();
        let operation = OperationTree::from_document(&document, None).unwrap();
        let path = ExecutionPath::new().field("page", "Query");
        let return_type = async_graphql_parser::types::Type::new("Page").unwrap();
        let variables = Variables::from_json(serde_json::json!({ "size": "M" }));
        let info = LookaheadInfo::new(&schema, operation, &path, &return_type)
            .with_variables(&variables);

        let page = first_field(operation.selection_set);
        let products = first_field(&page.selection_set.node);
        let definition = schema.lookup("Page").unwrap().field("products").unwrap();
        let state = ();
        let details = HandlerDetails::new(
            products,
            definition,
            "Product",
            "Page",
            &state,
            1,
            &info,
        );

        assert!(details.is_list());
        assert_eq!(details.field_name(), "products");
        assert_eq!(details.response_key(), "products");
        assert_eq!(details.alias(), None);

        let args = details.args();
        assert_eq!(
            args.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
            vec!["where", "first"]
        );
        assert_eq!(
            details.arg("where").unwrap().clone().into_json().unwrap(),
            serde_json::json!({ "color": "blue", "size": "M" })
        );
        assert_eq!(details.arg("first"), Some(&ConstValue::Number(20.into())));
        assert_eq!(details.arg("after"), None);
    }
}
