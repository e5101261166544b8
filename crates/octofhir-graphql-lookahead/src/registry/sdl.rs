//! SDL-backed type registry.

use std::collections::HashMap;

use async_graphql_parser::types::{
    FieldDefinition as AstFieldDefinition, ServiceDocument, TypeDefinition as AstTypeDefinition,
    TypeKind as AstTypeKind, TypeSystemDefinition,
};
use async_graphql_parser::{Positioned, parse_schema};
use async_graphql_value::Name;
use tracing::debug;

use super::{ArgumentDefinition, FieldDefinition, TypeDefinition, TypeKind, TypeRegistry};
use crate::error::LookaheadError;

/// Scalars every schema has without declaring them.
const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

const NO_FIELDS: &[Positioned<AstFieldDefinition>] = &[];

/// Type registry built from a schema document.
///
/// Type extensions (`extend type`, `extend interface`, `extend union`) are
/// merged into the base definition, regardless of document order. The
/// built-in scalars are always registered.
#[derive(Debug, Clone, Default)]
pub struct SdlRegistry {
    types: HashMap<Name, TypeDefinition>,
}

impl SdlRegistry {
    /// Parses SDL text into a registry.
    ///
    /// # Errors
    ///
    /// Returns `LookaheadError::SchemaParse` if the SDL is not valid.
    pub fn parse(sdl: &str) -> Result<Self, LookaheadError> {
        let document = parse_schema(sdl)?;
        Ok(Self::from_document(&document))
    }

    /// Builds a registry from the SDL exported by a dynamic schema.
    ///
    /// # Errors
    ///
    /// Returns `LookaheadError::SchemaParse` if the exported SDL cannot be
    /// parsed back.
    pub fn from_dynamic_schema(
        schema: &async_graphql::dynamic::Schema,
    ) -> Result<Self, LookaheadError> {
        Self::parse(&schema.sdl())
    }

    /// Builds a registry from an already parsed schema document.
    #[must_use]
    pub fn from_document(document: &ServiceDocument) -> Self {
        let mut registry = Self::default();

        for name in BUILTIN_SCALARS {
            let scalar = TypeDefinition::new(name, TypeKind::Scalar);
            registry.insert(scalar);
        }

        for definition in &document.definitions {
            if let TypeSystemDefinition::Type(ty) = definition {
                registry.ingest_type(&ty.node);
            }
        }

        registry.link_implementors();

        debug!(types = registry.len(), "Built SDL type registry");

        registry
    }

    /// Registers a type definition, replacing any previous definition.
    pub fn insert(&mut self, definition: TypeDefinition) {
        self.types.insert(definition.name.clone(), definition);
    }

    /// Returns the number of registered types, built-in scalars included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns whether the registry has no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn ingest_type(&mut self, ty: &AstTypeDefinition) {
        let name = ty.name.node.clone();
        let (kind, fields, possible_types) = match &ty.kind {
            AstTypeKind::Scalar => (TypeKind::Scalar, NO_FIELDS, Vec::new()),
            AstTypeKind::Object(object) => (
                TypeKind::Object,
                object.fields.as_slice(),
                names(&object.implements),
            ),
            AstTypeKind::Interface(interface) => (
                TypeKind::Interface,
                interface.fields.as_slice(),
                names(&interface.implements),
            ),
            AstTypeKind::Union(union) => (TypeKind::Union, NO_FIELDS, names(&union.members)),
            AstTypeKind::Enum(_) => (TypeKind::Enum, NO_FIELDS, Vec::new()),
            AstTypeKind::InputObject(_) => (TypeKind::InputObject, NO_FIELDS, Vec::new()),
        };

        let entry = self
            .types
            .entry(name.clone())
            .or_insert_with(|| TypeDefinition::new(name.as_str(), kind));

        // An extension seen before its base definition created the entry with
        // the extension's kind, which always matches the base kind.
        if !ty.extend {
            entry.kind = kind;
            if kind.has_fields() && entry.fields.is_none() {
                entry.fields = Some(Default::default());
            }
        }

        if let Some(field_map) = entry.fields.as_mut() {
            for field in fields {
                let field = convert_field(&field.node);
                field_map.insert(field.name.clone(), field);
            }
        }

        for possible in possible_types {
            if !entry.possible_types.contains(&possible) {
                entry.possible_types.push(possible);
            }
        }
    }

    /// Records each object as a possible type of the interfaces it
    /// implements, so interface fragments match their implementors.
    fn link_implementors(&mut self) {
        let links: Vec<(Name, Name)> = self
            .types
            .values()
            .filter(|def| def.kind == TypeKind::Object)
            .flat_map(|def| {
                def.possible_types
                    .iter()
                    .map(move |interface| (interface.clone(), def.name.clone()))
            })
            .collect();

        for (interface, object) in links {
            if let Some(def) = self.types.get_mut(&interface)
                && def.kind == TypeKind::Interface
                && !def.possible_types.contains(&object)
            {
                def.possible_types.push(object);
            }
        }
    }
}

impl TypeRegistry for SdlRegistry {
    fn lookup(&self, type_name: &str) -> Option<&TypeDefinition> {
        self.types.get(type_name)
    }
}

fn names(list: &[Positioned<Name>]) -> Vec<Name> {
    list.iter().map(|name| name.node.clone()).collect()
}

fn convert_field(field: &AstFieldDefinition) -> FieldDefinition {
    let arguments = field
        .arguments
        .iter()
        .map(|arg| {
            let arg = &arg.node;
            ArgumentDefinition {
                name: arg.name.node.clone(),
                ty: arg.ty.node.clone(),
                default_value: arg.default_value.as_ref().map(|v| v.node.clone()),
            }
        })
        .collect();

    FieldDefinition {
        name: field.name.node.clone(),
        ty: field.ty.node.clone(),
        arguments,
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_value::ConstValue;

    use super::*;

    const SDL: &str = r#"
        schema { query: Root }

        type Root {
            node(id: ID!): Node
            search(first: Int = 10, term: String): [SearchResult!]!
        }

        interface Node { id: ID! }

        type Product implements Node {
            id: ID!
            color: String
        }

        extend type Product {
            size: String
        }

        union SearchResult = Product

        enum Status { CART ORDERED }

        scalar Money

        input ProductWhere { color: String }
    "#;

    #[test]
    fn test_parse_types() {
        let registry = SdlRegistry::parse(SDL).unwrap();

        assert_eq!(registry.lookup("Product").unwrap().kind, TypeKind::Object);
        assert_eq!(registry.lookup("Node").unwrap().kind, TypeKind::Interface);
        assert_eq!(
            registry.lookup("SearchResult").unwrap().kind,
            TypeKind::Union
        );
        assert_eq!(registry.lookup("Status").unwrap().kind, TypeKind::Enum);
        assert_eq!(registry.lookup("Money").unwrap().kind, TypeKind::Scalar);
        assert_eq!(
            registry.lookup("ProductWhere").unwrap().kind,
            TypeKind::InputObject
        );
        assert!(registry.lookup("Missing").is_none());
    }

    #[test]
    fn test_builtin_scalars_are_registered() {
        let registry = SdlRegistry::parse("type Query { id: ID }").unwrap();

        for scalar in BUILTIN_SCALARS {
            let definition = registry.lookup(scalar).unwrap();
            assert_eq!(definition.kind, TypeKind::Scalar);
            assert!(definition.fields.is_none());
        }
        assert_eq!(registry.lookup("ID").unwrap().kind, TypeKind::Scalar);
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_extension_merges_fields() {
        let registry = SdlRegistry::parse(SDL).unwrap();
        let product = registry.lookup("Product").unwrap();
        let names: Vec<&str> = product
            .fields
            .as_ref()
            .unwrap()
            .keys()
            .map(|name| name.as_str())
            .collect();
        assert_eq!(names, vec!["id", "color", "size"]);
    }

    #[test]
    fn test_extension_before_base_definition() {
        let registry = SdlRegistry::parse(
            r#"
            extend type Order { total: Float }
            type Order { status: String }
            "#,
        )
        .unwrap();
        let order = registry.lookup("Order").unwrap();
        assert!(order.field("total").is_some());
        assert!(order.field("status").is_some());
    }

    #[test]
    fn test_argument_defaults() {
        let registry = SdlRegistry::parse(SDL).unwrap();
        let search = registry.lookup("Root").unwrap().field("search").unwrap();

        assert_eq!(search.arguments.len(), 2);
        assert_eq!(search.arguments[0].name.as_str(), "first");
        assert_eq!(
            search.arguments[0].default_value,
            Some(ConstValue::Number(10.into()))
        );
        assert_eq!(search.arguments[1].default_value, None);
    }

    #[test]
    fn test_possible_types() {
        let registry = SdlRegistry::parse(SDL).unwrap();

        assert!(registry.is_possible_type("Node", "Product"));
        assert!(registry.is_possible_type("SearchResult", "Product"));
        assert!(!registry.is_possible_type("SearchResult", "Root"));
    }

    #[test]
    fn test_invalid_sdl() {
        let err = SdlRegistry::parse("type {").unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_PARSE");
    }
}
