//! Pluggable template engine capabilities
//!
//! The loader never talks to a concrete engine. It is constructed with zero,
//! one, or two capabilities: a [`TemplateCompiler`] (compile once, render the
//! compiled template many times) and/or a [`TemplateRenderer`] (render source
//! text directly). When both are present the compiler is preferred.
//!
//! Production adapters backed by [`tera`] are provided for both capabilities.

use std::sync::Arc;

use tera::{Context, Tera};
use thiserror::Error;

use crate::context::RenderContext;

/// Error reported by an engine capability
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    /// Create an error from a plain message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<tera::Error> for EngineError {
    fn from(err: tera::Error) -> Self {
        // Tera's top-level Display is terse; the cause chain holds the detail
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message }
    }
}

/// A template compiled once and renderable many times
pub trait CompiledTemplate: Send + Sync + std::fmt::Debug {
    /// Render against a context
    fn render(&self, context: &RenderContext) -> Result<String, EngineError>;
}

/// Capability to compile template source into a reusable template
pub trait TemplateCompiler: Send + Sync {
    /// Compile source text
    fn compile(&self, source: &str) -> Result<Arc<dyn CompiledTemplate>, EngineError>;
}

/// Capability to render template source directly, without a compile step
pub trait TemplateRenderer: Send + Sync {
    /// Render source text against a context
    fn render(&self, source: &str, context: &RenderContext) -> Result<String, EngineError>;
}

// Tera keys autoescaping off the registered name's extension.
const INLINE_NAME: &str = "__inline__";
const INLINE_NAME_ESCAPED: &str = "__inline__.html";

/// Compiler capability backed by [`tera`].
///
/// Each compiled template owns a single-template `Tera` instance.
#[derive(Debug, Clone, Default)]
pub struct TeraCompiler {
    autoescape: bool,
}

impl TeraCompiler {
    /// Create a compiler with HTML autoescaping off
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable HTML autoescaping of substituted values
    pub fn with_autoescape(mut self, autoescape: bool) -> Self {
        self.autoescape = autoescape;
        self
    }

    fn template_name(&self) -> &'static str {
        if self.autoescape {
            INLINE_NAME_ESCAPED
        } else {
            INLINE_NAME
        }
    }
}

impl TemplateCompiler for TeraCompiler {
    fn compile(&self, source: &str) -> Result<Arc<dyn CompiledTemplate>, EngineError> {
        let name = self.template_name();
        let mut tera = Tera::default();
        tera.add_raw_template(name, source)?;
        Ok(Arc::new(TeraTemplate { tera, name }))
    }
}

#[derive(Debug)]
struct TeraTemplate {
    tera: Tera,
    name: &'static str,
}

impl CompiledTemplate for TeraTemplate {
    fn render(&self, context: &RenderContext) -> Result<String, EngineError> {
        let context = Context::from_serialize(context)?;
        Ok(self.tera.render(self.name, &context)?)
    }
}

/// Direct renderer capability backed by [`Tera::one_off`]
#[derive(Debug, Clone, Default)]
pub struct TeraRenderer {
    autoescape: bool,
}

impl TeraRenderer {
    /// Create a renderer with HTML autoescaping off
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable HTML autoescaping of substituted values
    pub fn with_autoescape(mut self, autoescape: bool) -> Self {
        self.autoescape = autoescape;
        self
    }
}

impl TemplateRenderer for TeraRenderer {
    fn render(&self, source: &str, context: &RenderContext) -> Result<String, EngineError> {
        let context = Context::from_serialize(context)?;
        Ok(Tera::one_off(source, &context, self.autoescape)?)
    }
}
