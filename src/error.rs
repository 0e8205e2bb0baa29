//! Error types for the template-loading pipeline

use thiserror::Error;

/// Errors that can occur while loading, compiling, or rendering a template.
///
/// Every error is terminal for the call that produced it; the pipeline has no
/// retry or fallback beyond the documented two-source lookup and the
/// compiler-over-renderer preference.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Neither the page document nor the inline table yielded content
    #[error("unknown template: {name}")]
    UnknownTemplate { name: String },

    /// Compilation was requested but no compiler is installed, or the
    /// engine rejected the source
    #[error("could not compile template {name}: {message}")]
    Compile { name: String, message: String },

    /// Raw template text needs rendering but neither a compiler nor a
    /// renderer is installed
    #[error("no template engine available to render {name}")]
    MissingEngine { name: String },

    /// The engine failed while rendering
    #[error("failed to render template {name}: {message}")]
    Render { name: String, message: String },

    /// The output sink rejected the rendered text
    #[error("failed to write rendered template {name}: {message}")]
    Write { name: String, message: String },
}

impl TemplateError {
    /// The identifier of the template the error is about
    pub fn template_name(&self) -> &str {
        match self {
            TemplateError::UnknownTemplate { name }
            | TemplateError::Compile { name, .. }
            | TemplateError::MissingEngine { name }
            | TemplateError::Render { name, .. }
            | TemplateError::Write { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_template() {
        let err = TemplateError::UnknownTemplate {
            name: "includes/user".to_string(),
        };
        assert_eq!(err.to_string(), "unknown template: includes/user");
        assert_eq!(err.template_name(), "includes/user");

        let err = TemplateError::MissingEngine {
            name: "card".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no template engine available to render card"
        );
    }
}
