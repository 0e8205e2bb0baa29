//! End-to-end tests for the template loading pipeline

use mustache_loader::engine::{TeraCompiler, TeraRenderer};
use mustache_loader::{PageDocument, RenderContext, TemplateResolver};

const INDEX_PAGE: &str = include_str!("../public/index.html");

fn context_with_name(name: &str) -> RenderContext {
    let mut context = RenderContext::new();
    context.insert("name", name);
    context
}

#[test]
fn test_render_template_embedded_in_site_index() {
    let page = PageDocument::parse(INDEX_PAGE);
    let mut resolver = TemplateResolver::new()
        .with_page(page)
        .with_compiler(TeraCompiler::new());

    let html = resolver
        .render("includes/user", &context_with_name("Jan"))
        .expect("Should render");

    insta::assert_snapshot!(html, @r#"<p class="user">Hello Jan</p>"#);
}

#[test]
fn test_render_function_from_site_index() {
    let page = PageDocument::parse(INDEX_PAGE);
    let mut resolver = TemplateResolver::new()
        .with_page(page)
        .with_compiler(TeraCompiler::new());

    let render = resolver
        .render_function("includes/user")
        .expect("Should compile");

    assert_eq!(
        render(&context_with_name("Jan")).unwrap(),
        r#"<p class="user">Hello Jan</p>"#
    );
    assert_eq!(
        render(&context_with_name("Ada")).unwrap(),
        r#"<p class="user">Hello Ada</p>"#
    );

    // The compiled form is now the cache entry
    assert!(resolver.cache().get("includes-user").unwrap().is_compiled());
}

#[test]
fn test_inline_table_backs_up_the_page() {
    let page = PageDocument::parse(INDEX_PAGE);
    let mut resolver = TemplateResolver::new()
        .with_page(page)
        .with_renderer(TeraRenderer::new())
        .with_template("includes/footer", "<footer>{{ year }}</footer>");

    let mut context = RenderContext::new();
    context.insert("year", 2012);

    let html = resolver.render("includes/footer", &context).unwrap();
    assert_eq!(html, "<footer>2012</footer>");
}

#[test]
fn test_render_to_sink_end_to_end() {
    let page = PageDocument::parse(INDEX_PAGE);
    let mut resolver = TemplateResolver::new()
        .with_page(page)
        .with_compiler(TeraCompiler::new());

    let mut out = Vec::new();
    resolver
        .render_to(&mut out, "includes/user", &context_with_name("Jan"))
        .expect("Should render");

    assert_eq!(
        String::from_utf8(out).unwrap(),
        r#"<p class="user">Hello Jan</p>"#
    );
}

#[test]
fn test_unknown_template_reports_the_identifier() {
    let mut resolver = TemplateResolver::new().with_renderer(TeraRenderer::new());

    let err = resolver
        .render("includes/missing", &RenderContext::new())
        .unwrap_err();
    assert_eq!(err.to_string(), "unknown template: includes/missing");
}
