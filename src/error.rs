//! Error types for the viewing surface

use thiserror::Error;

/// Result type alias for renderer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while typesetting or displaying a document
#[derive(Error, Debug)]
pub enum Error {
    /// The typesetter capability failed to load or configure.
    ///
    /// Fatal for the current session; recovery requires constructing a new
    /// renderer (or, in a page embedding, reloading the page).
    #[error("Typesetter initialization failed: {0}")]
    InitializationError(String),

    /// `render` was called before an output surface was bound.
    ///
    /// A usage precondition violation: fatal to the call, recoverable by the
    /// caller via `set_surface`.
    #[error("No output surface bound; call set_surface() first")]
    NoSurfaceBound,

    /// Compiling or painting the given source failed.
    ///
    /// Recoverable; the source can be edited and rendering retried.
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// A remote document could not be fetched or decoded as text.
    #[error("Failed to fetch document: {0}")]
    FetchError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "native")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::InitializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_underlying_cause() {
        let err = Error::RenderError("unexpected token".to_string());
        assert!(err.to_string().contains("unexpected token"));

        let err = Error::FetchError("404 Not Found".to_string());
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn no_surface_bound_names_the_remedy() {
        assert!(Error::NoSurfaceBound.to_string().contains("set_surface"));
    }
}
