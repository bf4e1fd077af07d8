/// Error type for graph traversal operations.
#[derive(Debug, thiserror::Error)]
pub enum IsomerError {
    #[error("cannot allocate an uninitialized instance of {0}")]
    Uninstantiable(&'static str),
    #[error("{0} is exclusively borrowed during traversal")]
    Borrowed(&'static str),
    #[error("identity map holds a clone of a different type for {0}")]
    TypeMismatch(&'static str),
    #[error("array shape holds {expected} elements but {actual} were given")]
    Shape { expected: usize, actual: usize },
    #[error("arrays must have at least one dimension")]
    Rank,
    #[error("array dimensions exceed the addressable range")]
    Overflow,
    #[error("no field {declaring_type}::{name}")]
    UnknownField {
        declaring_type: &'static str,
        name: &'static str,
    },
    #[error("field {field} expects {expected}, got {actual}")]
    FieldType {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl IsomerError {
    /// Shorthand for the uninitialized-allocation failure of `T`.
    pub fn uninstantiable<T: ?Sized>() -> Self {
        IsomerError::Uninstantiable(std::any::type_name::<T>())
    }
}
