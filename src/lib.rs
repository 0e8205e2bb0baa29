//! Mustache-style template loading for server-hosted pages
//!
//! This library locates template source in a hosting page's markup or an
//! inline table, memoizes it, and compiles or renders it through a pluggable
//! engine. The template language itself is delegated entirely to the engine;
//! production adapters backed by [`tera`] are included.
//!
//! # Example
//!
//! ```rust
//! use mustache_loader::engine::TeraCompiler;
//! use mustache_loader::{PageDocument, RenderContext, TemplateResolver};
//!
//! let page = PageDocument::parse(
//!     r#"<div id="includes-user">Hello {{ name }}</div>"#,
//! );
//! let mut resolver = TemplateResolver::new()
//!     .with_page(page)
//!     .with_compiler(TeraCompiler::new());
//!
//! let mut context = RenderContext::new();
//! context.insert("name", "Jan");
//!
//! let html = resolver.render("includes/user", &context).unwrap();
//! assert_eq!(html, "Hello Jan");
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod loader;
pub mod page;
pub mod server;

pub use context::RenderContext;
pub use error::TemplateError;
pub use loader::{normalize, CacheEntry, TemplateCache, TemplateResolver};
pub use page::PageDocument;
