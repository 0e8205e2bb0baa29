//! Static site server
//!
//! Serves the hosting site: a fixed route each for the landing page and the
//! error page, with everything else looked up as a static asset under the
//! site root.

use std::fs;
use std::path::{Path, PathBuf};

use rouille::{Request, Response};
use tracing::info;

/// Configuration for the site server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1:8000`
    pub addr: String,
    /// Directory holding `index.html`, `404.html`, and assets
    pub root: PathBuf,
}

/// Serve the site forever
pub fn serve(config: ServerConfig) -> ! {
    info!(addr = %config.addr, root = %config.root.display(), "serving site");
    let root = config.root;
    rouille::start_server(config.addr, move |request| {
        let response = handle(request, &root);
        info!(
            method = %request.method(),
            url = %request.url(),
            status = response.status_code,
            "request"
        );
        response
    })
}

/// Route a single request
pub fn handle(request: &Request, root: &Path) -> Response {
    if request.method() == "GET" {
        match request.url().as_str() {
            "/" => return page(root, "index.html"),
            "/404" => return page(root, "404.html"),
            _ => {}
        }
    }

    let asset = rouille::match_assets(request, root);
    if asset.is_success() {
        return asset;
    }

    page(root, "404.html").with_status_code(404)
}

fn page(root: &Path, file: &str) -> Response {
    match fs::read_to_string(root.join(file)) {
        Ok(body) => Response::html(body),
        Err(err) => {
            Response::text(format!("cannot read {file}: {err}")).with_status_code(500)
        }
    }
}
