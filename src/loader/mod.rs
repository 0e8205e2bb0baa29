//! Template loading pipeline
//!
//! This module turns a template identifier into rendered output: the
//! identifier is normalized, raw source is located in the hosting page's
//! markup or an inline table, the result is memoized, and an injected engine
//! capability compiles or renders it.
//!
//! # Example
//!
//! ```
//! use mustache_loader::engine::TeraRenderer;
//! use mustache_loader::{RenderContext, TemplateResolver};
//!
//! let mut resolver = TemplateResolver::new()
//!     .with_renderer(TeraRenderer::new())
//!     .with_template("includes/user", "Hello {{ name }}");
//!
//! let mut context = RenderContext::new();
//! context.insert("name", "Jan");
//!
//! let html = resolver.render("includes/user", &context).unwrap();
//! assert_eq!(html, "Hello Jan");
//! ```

mod cache;
mod resolver;

pub use cache::{CacheEntry, TemplateCache};
pub use resolver::{normalize, TemplateResolver};
