//! Wrapping type helpers.
//!
//! A field's return type may be wrapped any number of times in list and
//! non-null modifiers (`[[OrderItem!]]!`). Selections always apply to the
//! innermost named type.

use async_graphql_parser::types::{BaseType, Type};

use crate::error::LookaheadError;
use crate::registry::{FieldMap, TypeDefinition, TypeKind, TypeRegistry};

/// Strips every list and non-null wrapper and returns the named type.
pub fn unwrap_to_named_type(ty: &Type) -> &str {
    match &ty.base {
        BaseType::Named(name) => name.as_str(),
        BaseType::List(inner) => unwrap_to_named_type(inner),
    }
}

/// Returns whether the type is a list once the outer non-null modifier is
/// removed.
///
/// Only the outermost wrapper matters: `[[Int!]]!` is a list, `Int!` is not.
pub fn is_list_type(ty: &Type) -> bool {
    matches!(ty.base, BaseType::List(_))
}

/// Returns the fields of a named type, or `None` when the type is unknown
/// or has no fields (scalars, enums, unions, inputs).
pub fn fields_of<'a>(schema: &'a dyn TypeRegistry, type_name: &str) -> Option<&'a FieldMap> {
    schema
        .lookup(type_name)
        .and_then(|definition| definition.fields.as_ref())
}

/// Looks up a type that selections can be applied to.
///
/// Unions are accepted: they carry no fields but inline fragments on them
/// still resolve.
///
/// # Errors
///
/// Returns `UnknownType` if the type is missing and `NonCompositeType` if it
/// is a scalar, enum or input object.
pub fn composite_type<'a>(
    schema: &'a dyn TypeRegistry,
    type_name: &str,
) -> Result<&'a TypeDefinition, LookaheadError> {
    let definition = schema
        .lookup(type_name)
        .ok_or_else(|| LookaheadError::unknown_type(type_name))?;

    if definition.fields.is_none() && definition.kind != TypeKind::Union {
        return Err(LookaheadError::non_composite_type(type_name));
    }

    Ok(definition)
}
