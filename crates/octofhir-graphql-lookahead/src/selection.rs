//! Selection classification.
//!
//! Turns a single selection node into what the traversal needs to know
//! about it: is it a concrete field or a fragment, which named type does it
//! lead to, and which selection set comes next.

use async_graphql_parser::types::{Field, Selection, SelectionSet};

use crate::error::LookaheadError;
use crate::operation::FragmentMap;
use crate::registry::{FieldDefinition, FieldMap};
use crate::wrapping::unwrap_to_named_type;

/// A classified selection.
#[derive(Debug, Clone, Copy)]
pub enum Classified<'a> {
    /// A concrete field selection.
    Field {
        /// The field selection node.
        field: &'a Field,
        /// Schema definition of the field.
        definition: &'a FieldDefinition,
        /// Named return type of the field.
        type_name: &'a str,
        /// Nested selections, `None` for leaves.
        nested: Option<&'a SelectionSet>,
    },

    /// A named fragment spread or an inline fragment.
    Fragment {
        /// Type condition of the fragment.
        type_name: &'a str,
        /// Selections of the fragment.
        selection_set: &'a SelectionSet,
    },

    /// A field the enclosing type does not declare, such as `__typename`.
    Unresolved,
}

/// Classifies one selection of a selection set whose enclosing type is
/// `parent_type` with fields `parent_fields`.
///
/// # Errors
///
/// Returns `LookaheadError::UnknownFragment` for a spread of an undefined
/// fragment.
pub fn classify<'a>(
    selection: &'a Selection,
    fragments: &'a FragmentMap,
    parent_type: &'a str,
    parent_fields: Option<&'a FieldMap>,
) -> Result<Classified<'a>, LookaheadError> {
    match selection {
        Selection::Field(field) => {
            let field = &field.node;
            let name = field.name.node.as_str();
            let Some(definition) = parent_fields.and_then(|fields| fields.get(name)) else {
                return Ok(Classified::Unresolved);
            };

            Ok(Classified::Field {
                field,
                definition,
                type_name: unwrap_to_named_type(&definition.ty),
                nested: nested_selection_set(field),
            })
        }
        Selection::FragmentSpread(spread) => {
            let name = &spread.node.fragment_name.node;
            let fragment = fragments
                .get(name)
                .ok_or_else(|| LookaheadError::unknown_fragment(name.as_str()))?;

            Ok(Classified::Fragment {
                type_name: fragment.node.type_condition.node.on.node.as_str(),
                selection_set: &fragment.node.selection_set.node,
            })
        }
        Selection::InlineFragment(inline) => {
            let inline = &inline.node;
            let type_name = inline
                .type_condition
                .as_ref()
                .map_or(parent_type, |condition| condition.node.on.node.as_str());

            Ok(Classified::Fragment {
                type_name,
                selection_set: &inline.selection_set.node,
            })
        }
    }
}

/// Returns the nested selection set of a field, or `None` for a leaf.
pub fn nested_selection_set(field: &Field) -> Option<&SelectionSet> {
    let selection_set = &field.selection_set.node;
    (!selection_set.items.is_empty()).then_some(selection_set)
}

#[cfg(test)]
mod tests {
    use async_graphql_parser::parse_query;

    use super::*;
    use crate::operation::OperationTree;
    use crate::registry::SdlRegistry;
    use crate::wrapping::fields_of;

    const SDL: &str = r#"
        type Query { order: Order }
        type Order { status: String items: [OrderItem!]! }
        type OrderItem { quantity: Int }
    "#;

    #[test]
    fn test_classify_each_kind() {
        let schema = SdlRegistry::parse(SDL).unwrap();
        let document = parse_query(
            r#"
            {
                order {
                    status
                    items { quantity }
                    __typename
                    ... on Order { status }
                    ... { status }
                    ...OrderFields
                }
            }
            fragment OrderFields on Order { items { quantity } }
            "#,
        )
        .unwrap();
        let operation = OperationTree::from_document(&document, None).unwrap();

        let Selection::Field(order) = &operation.selection_set.items[0].node else {
            panic!("expected field");
        };
        let fields = fields_of(&schema, "Order");
        let fragments = operation.fragments;
        let items = &order.node.selection_set.node.items;
        let classified: Vec<Classified<'_>> = items
            .iter()
            .map(|item| classify(&item.node, fragments, "Order", fields))
            .collect::<Result<_, _>>()
            .unwrap();

        assert!(matches!(
            classified[0],
            Classified::Field {
                type_name: "String",
                nested: None,
                ..
            }
        ));
        assert!(matches!(
            classified[1],
            Classified::Field {
                type_name: "OrderItem",
                nested: Some(_),
                ..
            }
        ));
        assert!(matches!(classified[2], Classified::Unresolved));
        for fragment in &classified[3..] {
            assert!(matches!(
                fragment,
                Classified::Fragment {
                    type_name: "Order",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_unknown_fragment() {
        let document = parse_query("{ order { ...Missing } }").unwrap();
        let operation = OperationTree::from_document(&document, None).unwrap();

        let Selection::Field(order) = &operation.selection_set.items[0].node else {
            panic!("expected field");
        };
        let spread = &order.node.selection_set.node.items[0].node;

        let fragments = operation.fragments;
        let err = classify(spread, fragments, "Order", None).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_FRAGMENT");
        assert_eq!(err.to_string(), "Unknown fragment: Missing");
    }

    #[test]
    fn test_fields_without_parent_fields_are_unresolved() {
        let document = parse_query("{ order { status } }").unwrap();
        let operation = OperationTree::from_document(&document, None).unwrap();

        let Selection::Field(order) = &operation.selection_set.items[0].node else {
            panic!("expected field");
        };
        let status = &order.node.selection_set.node.items[0].node;
        let fragments = operation.fragments;

        assert!(matches!(
            classify(status, fragments, "Order", None).unwrap(),
            Classified::Unresolved
        ));
    }
}
