//! # Framework Errors
//!
//! Errors raised by the runtime itself, plus the boxed entity error that carries a hook's
//! typed failure back to the caller.

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Recovers the entity's own error type from an `EntityError`.
    ///
    /// Returns the original `FrameworkError` when it is a runtime failure or when the boxed
    /// error is of a different type.
    pub fn into_entity<E>(self) -> Result<E, FrameworkError>
    where
        E: std::error::Error + 'static,
    {
        match self {
            FrameworkError::EntityError(inner) => match inner.downcast::<E>() {
                Ok(typed) => Ok(*typed),
                Err(inner) => Err(FrameworkError::EntityError(inner)),
            },
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("out of stock")]
    struct OutOfStock;

    #[test]
    fn into_entity_recovers_typed_error() {
        let err = FrameworkError::EntityError(Box::new(OutOfStock));
        assert_eq!(err.into_entity::<OutOfStock>().unwrap(), OutOfStock);
    }

    #[test]
    fn into_entity_passes_runtime_errors_through() {
        let err = FrameworkError::ActorClosed;
        assert!(matches!(
            err.into_entity::<OutOfStock>(),
            Err(FrameworkError::ActorClosed)
        ));
    }

    #[test]
    fn into_entity_keeps_foreign_errors_boxed() {
        let err = FrameworkError::EntityError(Box::new(std::io::Error::other("disk")));
        match err.into_entity::<OutOfStock>() {
            Err(FrameworkError::EntityError(inner)) => assert_eq!(inner.to_string(), "disk"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
