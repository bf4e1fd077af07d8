use crate::isomer::Isomer;

/// How the traversal engine treats values of a type.
///
/// - **Immutable**: shared or copied as-is, never descended into
/// - **Value**: owned data without identity, copied field by field
/// - **Array**: element-wise copy preserving shape
/// - **Reference**: a shared handle with identity, tracked per call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Immutable,
    Value,
    Array,
    Reference,
}

/// Classifies `T`.
pub fn classify<T: Isomer>() -> Kind {
    T::kind()
}

/// Returns true if `T` takes the immutable fast path.
pub fn is_immutable<T: Isomer>() -> bool {
    T::kind() == Kind::Immutable
}
