//! Accessor type inference from declared type tags.

use stubgen_types::{ArgumentSpec, BaseType, TypeDescriptor, TypeTag};

/// The unwrapped type for a declared tag. Unrecognized tags are untyped.
pub fn base_type(tag: &TypeTag) -> BaseType {
    match tag {
        TypeTag::Array => BaseType::ArrayOfStrings,
        TypeTag::Boolean => BaseType::Boolean,
        TypeTag::Hash => BaseType::HashOfStrings,
        TypeTag::Numeric => BaseType::Numeric,
        TypeTag::String => BaseType::String,
        TypeTag::Other(_) => BaseType::Untyped,
    }
}

/// Infer the accessor return type for one declared member.
///
/// The type is nilable exactly when the member is neither required nor
/// defaulted. This holds for untyped members too.
pub fn type_for(spec: &ArgumentSpec) -> TypeDescriptor {
    let base = base_type(&spec.tag);
    if spec.may_be_absent() {
        TypeDescriptor::nilable(base)
    } else {
        TypeDescriptor::new(base)
    }
}
