//! Schema type registry.
//!
//! The traversal never talks to a concrete schema implementation directly.
//! It reads types through the [`TypeRegistry`] trait, which only needs to
//! answer "what is the definition of the type named X". The crate ships one
//! implementation, [`SdlRegistry`], built from SDL text or from an
//! `async_graphql::dynamic::Schema`.

mod sdl;

pub use sdl::SdlRegistry;

use async_graphql_parser::types::Type;
use async_graphql_value::{ConstValue, Name};
use indexmap::IndexMap;

/// Ordered map of field name to field definition.
pub type FieldMap = IndexMap<Name, FieldDefinition>;

/// Read-only access to the types of a GraphQL schema.
///
/// Implementations must be immutable for the duration of a traversal.
pub trait TypeRegistry {
    /// Looks up a named type.
    fn lookup(&self, type_name: &str) -> Option<&TypeDefinition>;

    /// Returns whether a fragment with type condition `condition` applies to
    /// objects of type `concrete`.
    ///
    /// The default implementation accepts equal names and abstract types that
    /// list `concrete` among their possible types, or that `concrete` lists
    /// among its interfaces.
    fn is_possible_type(&self, condition: &str, concrete: &str) -> bool {
        if condition == concrete {
            return true;
        }

        let listed_by_condition = self
            .lookup(condition)
            .is_some_and(|def| def.possible_types.iter().any(|t| t == concrete));

        listed_by_condition
            || self
                .lookup(concrete)
                .is_some_and(|def| def.possible_types.iter().any(|t| t == condition))
    }
}

impl<T: TypeRegistry + ?Sized> TypeRegistry for &T {
    fn lookup(&self, type_name: &str) -> Option<&TypeDefinition> {
        (**self).lookup(type_name)
    }

    fn is_possible_type(&self, condition: &str, concrete: &str) -> bool {
        (**self).is_possible_type(condition, concrete)
    }
}

/// Kind of a named schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    /// Returns whether types of this kind expose selectable fields.
    #[must_use]
    pub fn has_fields(self) -> bool {
        matches!(self, Self::Object | Self::Interface)
    }
}

/// A named type of the schema.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    /// Type name.
    pub name: Name,

    /// Kind of the type.
    pub kind: TypeKind,

    /// Fields, present only for object and interface types.
    pub fields: Option<FieldMap>,

    /// Related types used for fragment matching.
    ///
    /// Objects list the interfaces they implement, interfaces list their
    /// implementors, unions list their members.
    pub possible_types: Vec<Name>,
}

impl TypeDefinition {
    /// Creates an empty definition of the given kind.
    ///
    /// Object and interface types start with an empty field map.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: Name::new(name.into()),
            kind,
            fields: kind.has_fields().then(FieldMap::new),
            possible_types: Vec::new(),
        }
    }

    /// Adds a field, replacing any previous field with the same name.
    ///
    /// Has no effect on non-composite types.
    #[must_use]
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        if let Some(fields) = self.fields.as_mut() {
            fields.insert(field.name.clone(), field);
        }
        self
    }

    /// Adds a possible type.
    #[must_use]
    pub fn with_possible_type(mut self, name: impl Into<String>) -> Self {
        self.possible_types.push(Name::new(name.into()));
        self
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.as_ref().and_then(|fields| fields.get(name))
    }
}

/// A field of an object or interface type.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Field name.
    pub name: Name,

    /// Return type, possibly wrapped in list and non-null modifiers.
    pub ty: Type,

    /// Declared arguments in declaration order.
    pub arguments: Vec<ArgumentDefinition>,
}

impl FieldDefinition {
    /// Creates a field without arguments.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: Name::new(name.into()),
            ty,
            arguments: Vec::new(),
        }
    }

    /// Adds a declared argument.
    #[must_use]
    pub fn with_argument(mut self, argument: ArgumentDefinition) -> Self {
        self.arguments.push(argument);
        self
    }
}

/// A declared field argument.
#[derive(Debug, Clone)]
pub struct ArgumentDefinition {
    /// Argument name.
    pub name: Name,

    /// Argument input type.
    pub ty: Type,

    /// Default value used when the query omits the argument.
    pub default_value: Option<ConstValue>,
}

impl ArgumentDefinition {
    /// Creates an argument without a default value.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: Name::new(name.into()),
            ty,
            default_value: None,
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: ConstValue) -> Self {
        self.default_value = Some(value);
        self
    }
}
