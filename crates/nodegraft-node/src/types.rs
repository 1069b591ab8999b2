//! Classification of schema type names

/// Type names treated as primitive
pub const PRIMITIVE_TYPES: [&str; 5] = ["string", "number", "integer", "boolean", "array"];

/// Whether `type_name` is one of [`PRIMITIVE_TYPES`]
#[inline]
#[must_use]
pub fn is_primitive_type(type_name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&type_name)
}

/// Whether `type_name` names a custom (non-primitive) type
#[inline]
#[must_use]
pub fn is_custom_type(type_name: &str) -> bool {
    !is_primitive_type(type_name)
}
