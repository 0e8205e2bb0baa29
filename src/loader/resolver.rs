//! Template resolution - locates, caches, compiles, and renders templates

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use tracing::debug;

use crate::context::RenderContext;
use crate::engine::{CompiledTemplate, EngineError, TemplateCompiler, TemplateRenderer};
use crate::error::TemplateError;
use crate::page::PageDocument;

use super::cache::{CacheEntry, TemplateCache};

/// Normalize a template identifier into the key used for cache and page
/// lookups.
///
/// The first path separator becomes a hyphen so that identifiers like
/// `includes/user` match the DOM-safe ids of page-embedded template blocks.
/// Only the first separator is replaced: `a/b/c` normalizes to `a-b/c`, so
/// identifiers with multiple separators keep their later slashes.
pub fn normalize(name: &str) -> String {
    name.replacen('/', "-", 1)
}

/// Resolves template identifiers to rendered output with the least work
/// necessary: a cached compiled template beats cached raw text, which beats a
/// fresh source lookup.
///
/// Raw source comes from two places, tried in order: the hosting page's
/// embedded markup (queried by the normalized identifier) and an inline
/// template table (keyed by the identifier as given). The first resolution of
/// an identifier populates the cache; later lookups never re-query either
/// source.
///
/// Engine capabilities are supplied at construction. With a
/// [`TemplateCompiler`] installed, [`compile`](Self::compile) upgrades the
/// cache entry to its compiled form; [`render`](Self::render) on a raw entry
/// compiles transiently and leaves the entry raw, so only `compile` (and
/// [`render_function`](Self::render_function), which uses it) ever upgrades
/// an entry.
#[derive(Default)]
pub struct TemplateResolver {
    cache: TemplateCache,
    page: Option<PageDocument>,
    inline: HashMap<String, String>,
    compiler: Option<Box<dyn TemplateCompiler>>,
    renderer: Option<Box<dyn TemplateRenderer>>,
}

impl TemplateResolver {
    /// Create a resolver with no sources and no engine capabilities
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hosting page to query for embedded template blocks
    pub fn with_page(mut self, page: PageDocument) -> Self {
        self.page = Some(page);
        self
    }

    /// Register one inline template, keyed by its un-normalized identifier
    pub fn with_template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.inline.insert(name.into(), source.into());
        self
    }

    /// Register a batch of inline templates
    pub fn with_templates(
        mut self,
        templates: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.inline.extend(templates);
        self
    }

    /// Install the compile capability
    pub fn with_compiler(mut self, compiler: impl TemplateCompiler + 'static) -> Self {
        self.compiler = Some(Box::new(compiler));
        self
    }

    /// Install the direct-render capability
    pub fn with_renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Start from a cache the owner already holds, for example one carried
    /// over from a previous resolver with the same sources
    pub fn with_cache(mut self, cache: TemplateCache) -> Self {
        self.cache = cache;
        self
    }

    /// Register an inline template after construction.
    ///
    /// Replaces any previous table entry under the same identifier; an
    /// already-cached resolution is unaffected.
    pub fn add_template(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.inline.insert(name.into(), source.into());
    }

    /// The resolver's cache
    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// Consume the resolver, handing the cache back to the owner
    pub fn into_cache(self) -> TemplateCache {
        self.cache
    }

    /// Resolve an identifier to its cache entry.
    ///
    /// On a cache miss the page markup is tried first, then the inline
    /// table. `None` means no source knows the template; nothing is cached
    /// in that case.
    pub fn load(&mut self, name: &str) -> Option<&CacheEntry> {
        let key = normalize(name);
        if !self.cache.contains(&key) {
            if let Some(text) = self.page.as_ref().and_then(|page| page.fragment(&key)) {
                debug!(template = %key, "caching template from page markup");
                self.cache.insert(key.clone(), CacheEntry::Raw(text));
            } else if let Some(text) = self.inline.get(name).cloned() {
                debug!(template = %key, "caching template from inline table");
                self.cache.insert(key.clone(), CacheEntry::Raw(text));
            }
        }
        self.cache.get(&key)
    }

    /// Compile a template, upgrading its cache entry to the compiled form.
    ///
    /// An already-compiled entry is returned as-is; the upgrade happens at
    /// most once per identifier.
    pub fn compile(&mut self, name: &str) -> Result<Arc<dyn CompiledTemplate>, TemplateError> {
        let source = match self.load(name) {
            None => {
                return Err(TemplateError::Compile {
                    name: name.to_string(),
                    message: "template could not be loaded".to_string(),
                })
            }
            Some(CacheEntry::Compiled(template)) => return Ok(Arc::clone(template)),
            Some(CacheEntry::Raw(text)) => text.clone(),
        };

        let compiler = self
            .compiler
            .as_ref()
            .ok_or_else(|| TemplateError::Compile {
                name: name.to_string(),
                message: "no template compiler installed".to_string(),
            })?;
        let template = compiler
            .compile(&source)
            .map_err(|err| TemplateError::Compile {
                name: name.to_string(),
                message: err.to_string(),
            })?;

        let key = normalize(name);
        debug!(template = %key, "upgraded cache entry to compiled template");
        self.cache
            .insert(key, CacheEntry::Compiled(Arc::clone(&template)));
        Ok(template)
    }

    /// Return a render closure bound to the compiled template.
    ///
    /// Each invocation renders against a fresh context. Requires a
    /// successful [`compile`](Self::compile).
    pub fn render_function(
        &mut self,
        name: &str,
    ) -> Result<impl Fn(&RenderContext) -> Result<String, TemplateError>, TemplateError> {
        let template = self.compile(name)?;
        let name = name.to_string();
        Ok(move |context: &RenderContext| {
            template
                .render(context)
                .map_err(|err| render_error(&name, err))
        })
    }

    /// Render a template against a context.
    ///
    /// A compiled cache entry renders directly. A raw entry is compiled
    /// transiently when a compiler is installed (the cache keeps the raw
    /// text), or rendered directly when only a renderer is installed.
    pub fn render(&mut self, name: &str, context: &RenderContext) -> Result<String, TemplateError> {
        let source = match self.load(name) {
            None => {
                return Err(TemplateError::UnknownTemplate {
                    name: name.to_string(),
                })
            }
            Some(CacheEntry::Compiled(template)) => {
                let template = Arc::clone(template);
                return template
                    .render(context)
                    .map_err(|err| render_error(name, err));
            }
            Some(CacheEntry::Raw(text)) => text.clone(),
        };

        if let Some(compiler) = self.compiler.as_ref() {
            let template = compiler
                .compile(&source)
                .map_err(|err| TemplateError::Compile {
                    name: name.to_string(),
                    message: err.to_string(),
                })?;
            return template
                .render(context)
                .map_err(|err| render_error(name, err));
        }

        if let Some(renderer) = self.renderer.as_ref() {
            return renderer
                .render(&source, context)
                .map_err(|err| render_error(name, err));
        }

        Err(TemplateError::MissingEngine {
            name: name.to_string(),
        })
    }

    /// Render a template into a writer
    pub fn render_to<W: io::Write>(
        &mut self,
        out: &mut W,
        name: &str,
        context: &RenderContext,
    ) -> Result<(), TemplateError> {
        let html = self.render(name, context)?;
        out.write_all(html.as_bytes())
            .map_err(|err| TemplateError::Write {
                name: name.to_string(),
                message: err.to_string(),
            })
    }
}

fn render_error(name: &str, err: EngineError) -> TemplateError {
    TemplateError::Render {
        name: name.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::engine::{TeraCompiler, TeraRenderer};

    /// Compiler that counts invocations and wraps the source verbatim
    struct RecordingCompiler {
        calls: Arc<AtomicUsize>,
    }

    impl RecordingCompiler {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl TemplateCompiler for RecordingCompiler {
        fn compile(&self, source: &str) -> Result<Arc<dyn CompiledTemplate>, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Echo(source.to_string())))
        }
    }

    /// Compiled template that echoes its source plus the context size
    #[derive(Debug)]
    struct Echo(String);

    impl CompiledTemplate for Echo {
        fn render(&self, context: &RenderContext) -> Result<String, EngineError> {
            Ok(format!("compiled:{}:{}", self.0, context.len()))
        }
    }

    fn context_with_name(name: &str) -> RenderContext {
        let mut context = RenderContext::new();
        context.insert("name", name);
        context
    }

    #[test]
    fn test_normalize_replaces_first_separator_only() {
        assert_eq!(normalize("includes/user"), "includes-user");
        assert_eq!(normalize("a/b/c"), "a-b/c");
        assert_eq!(normalize("plain"), "plain");
    }

    #[test]
    fn test_load_from_inline_table() {
        let mut resolver =
            TemplateResolver::new().with_template("includes/user", "Hello {{ name }}");

        let entry = resolver.load("includes/user").expect("Should load");
        assert_eq!(entry.as_raw(), Some("Hello {{ name }}"));
        assert!(resolver.cache().contains("includes-user"));
    }

    #[test]
    fn test_load_prefers_page_markup_over_inline_table() {
        let page = PageDocument::parse(r#"<div id="includes-user">From page</div>"#);
        let mut resolver = TemplateResolver::new()
            .with_page(page)
            .with_template("includes/user", "From table");

        let entry = resolver.load("includes/user").expect("Should load");
        assert_eq!(entry.as_raw(), Some("From page"));
    }

    #[test]
    fn test_load_never_requeries_sources() {
        let mut resolver = TemplateResolver::new().with_template("card", "first");
        assert_eq!(resolver.load("card").unwrap().as_raw(), Some("first"));

        // Replacing the table entry does not disturb the cached resolution
        resolver.add_template("card", "second");
        assert_eq!(resolver.load("card").unwrap().as_raw(), Some("first"));
    }

    #[test]
    fn test_load_unknown_caches_nothing() {
        let mut resolver = TemplateResolver::new();
        assert!(resolver.load("missing").is_none());
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn test_render_with_direct_renderer() {
        let mut resolver = TemplateResolver::new()
            .with_renderer(TeraRenderer::new())
            .with_template("known-id", "Hello {{ name }}");

        let html = resolver
            .render("known-id", &context_with_name("Jan"))
            .expect("Should render");
        assert_eq!(html, "Hello Jan");
    }

    #[test]
    fn test_render_unknown_template() {
        let mut resolver = TemplateResolver::new().with_renderer(TeraRenderer::new());
        let err = resolver
            .render("missing-id", &RenderContext::new())
            .unwrap_err();
        assert!(matches!(err, TemplateError::UnknownTemplate { .. }));
        assert_eq!(err.template_name(), "missing-id");
    }

    #[test]
    fn test_render_without_any_engine() {
        let mut resolver = TemplateResolver::new().with_template("card", "Hello {{ name }}");
        let err = resolver.render("card", &RenderContext::new()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingEngine { .. }));
    }

    #[test]
    fn test_compile_upgrades_cache_entry_exactly_once() {
        let (compiler, calls) = RecordingCompiler::new();
        let mut resolver = TemplateResolver::new()
            .with_compiler(compiler)
            .with_template("card", "{{ body }}");

        let first = resolver.compile("card").expect("Should compile");
        assert!(resolver.cache().get("card").unwrap().is_compiled());

        let second = resolver.compile("card").expect("Should compile");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_compile_without_compiler() {
        let mut resolver = TemplateResolver::new().with_template("card", "{{ body }}");
        let err = resolver.compile("card").unwrap_err();
        assert!(matches!(err, TemplateError::Compile { .. }));
    }

    #[test]
    fn test_compile_unknown_template() {
        let (compiler, _) = RecordingCompiler::new();
        let mut resolver = TemplateResolver::new().with_compiler(compiler);
        let err = resolver.compile("missing").unwrap_err();
        assert!(matches!(err, TemplateError::Compile { .. }));
    }

    #[test]
    fn test_render_compiles_transiently_and_keeps_raw_entry() {
        let (compiler, calls) = RecordingCompiler::new();
        let mut resolver = TemplateResolver::new()
            .with_compiler(compiler)
            .with_template("card", "{{ body }}");

        resolver.render("card", &RenderContext::new()).unwrap();
        resolver.render("card", &RenderContext::new()).unwrap();

        // Each render compiled afresh; the cache entry never upgraded
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(resolver.cache().get("card").unwrap().is_raw());
    }

    #[test]
    fn test_render_uses_compiled_entry_after_compile() {
        let (compiler, calls) = RecordingCompiler::new();
        let mut resolver = TemplateResolver::new()
            .with_compiler(compiler)
            .with_template("card", "{{ body }}");

        resolver.compile("card").unwrap();
        let html = resolver.render("card", &RenderContext::new()).unwrap();

        assert_eq!(html, "compiled:{{ body }}:0");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_render_prefers_compiler_over_renderer() {
        let (compiler, _) = RecordingCompiler::new();
        let mut resolver = TemplateResolver::new()
            .with_compiler(compiler)
            .with_renderer(TeraRenderer::new())
            .with_template("card", "Hello {{ name }}");

        let html = resolver.render("card", &context_with_name("Jan")).unwrap();
        assert_eq!(html, "compiled:Hello {{ name }}:1");
    }

    #[test]
    fn test_render_function_is_reusable() {
        let mut resolver = TemplateResolver::new()
            .with_compiler(TeraCompiler::new())
            .with_template("includes/user", "Hello {{ name }}");

        let render = resolver
            .render_function("includes/user")
            .expect("Should compile");

        assert_eq!(render(&context_with_name("Jan")).unwrap(), "Hello Jan");
        assert_eq!(render(&context_with_name("Ada")).unwrap(), "Hello Ada");
    }

    #[test]
    fn test_render_to_sink() {
        let mut resolver = TemplateResolver::new()
            .with_renderer(TeraRenderer::new())
            .with_template("card", "Hi {{ name }}");

        let mut out = Vec::new();
        resolver
            .render_to(&mut out, "card", &context_with_name("Jan"))
            .expect("Should render");
        assert_eq!(out, b"Hi Jan");
    }

    #[test]
    fn test_resolver_accepts_prepopulated_cache() {
        let mut cache = TemplateCache::new();
        cache.insert("card", CacheEntry::Raw("cached {{ name }}".to_string()));

        let mut resolver = TemplateResolver::new()
            .with_cache(cache)
            .with_renderer(TeraRenderer::new());

        let html = resolver.render("card", &context_with_name("Jan")).unwrap();
        assert_eq!(html, "cached Jan");
    }

    #[test]
    fn test_page_template_renders_end_to_end() {
        let page = PageDocument::parse(
            r#"<div id="includes-user">&lt;b&gt;{{ name }}&lt;/b&gt;</div>"#,
        );
        let mut resolver = TemplateResolver::new()
            .with_page(page)
            .with_compiler(TeraCompiler::new());

        let html = resolver
            .render("includes/user", &context_with_name("Jan"))
            .expect("Should render");
        assert_eq!(html, "<b>Jan</b>");
    }
}
