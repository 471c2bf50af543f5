//! The error shared by engines, resolvers and views.

use thiserror::Error;

/// Why a template could not be rendered.
///
/// [`RenderError::Unresolved`] is the one failure views hand back to their
/// caller. Everything else happened inside a backend and ends up in the
/// view's exception bag.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No engine accepted the template.
    #[error("could not resolve engine for template \"{template}\"")]
    Unresolved { template: String },

    /// The backend rejected the template source.
    #[error("template error: {0}")]
    TemplateError(String),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Template data could not be converted for the backend.
    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The view with this id was rendered from inside its own render.
    #[error("view {0} is nested inside itself")]
    Recursion(String),

    #[error("{0}")]
    OperationError(String),
}

impl RenderError {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, RenderError::Unresolved { .. })
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::SerializationError(err.to_string())
    }
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind::*;

        let message = err.to_string();
        match err.kind() {
            TemplateNotFound => RenderError::TemplateNotFound(message),
            BadSerialization => RenderError::SerializationError(message),
            SyntaxError | BadEscape | UndefinedError | UnknownTest | UnknownFunction
            | UnknownFilter | UnknownMethod => RenderError::TemplateError(message),
            _ => RenderError::OperationError(message),
        }
    }
}
