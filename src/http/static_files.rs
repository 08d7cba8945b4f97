//! Static file serving for everything outside `/api/`.
//!
//! # Responsibilities
//! - Serve regular files below the configured root
//! - Refuse paths with a segment starting with `.` (`..`, `.`, `.env`, `.git/…`)
//! - Refuse directories instead of listing them or falling back to `index.html`
//!
//! Refusals are plain 404s so hidden files are indistinguishable from missing ones.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::Path;
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// Filesystem handler rooted at one directory.
#[derive(Debug, Clone)]
pub struct WebFileSystem {
    serve_dir: ServeDir,
}

impl WebFileSystem {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            serve_dir: ServeDir::new(root).append_index_html_on_directories(false),
        }
    }

    pub async fn serve(&self, request: Request<Body>) -> Response {
        if path_contains_dots(request.uri().path()) {
            tracing::debug!(path = %request.uri().path(), "Refusing dotted path");
            return StatusCode::NOT_FOUND.into_response();
        }

        match self.serve_dir.clone().oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        }
    }
}

/// Axum fallback handler.
pub async fn static_handler(
    State(files): State<WebFileSystem>,
    request: Request<Body>,
) -> Response {
    files.serve(request).await
}

/// True if any `/`-separated segment starts with a dot.
pub fn path_contains_dots(path: &str) -> bool {
    path.split('/').any(|segment| segment.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn detects_dotted_segments() {
        assert!(path_contains_dots("/some/path/../foo"));
        assert!(path_contains_dots("/some/path/./bar"));
        assert!(path_contains_dots("/.env"));
        assert!(path_contains_dots("/assets/.git/config"));

        assert!(!path_contains_dots("/"));
        assert!(!path_contains_dots("/index.html"));
        assert!(!path_contains_dots("/assets/app.v2.js"));
    }

    #[tokio::test]
    async fn serves_files_but_not_directories_or_dotfiles() {
        let root = std::env::temp_dir().join(format!("api-proxy-static-{}", std::process::id()));
        fs::create_dir_all(root.join("assets")).unwrap();
        fs::write(root.join("index.html"), "<h1>hi</h1>").unwrap();
        fs::write(root.join(".env"), "SECRET=1").unwrap();

        let files = WebFileSystem::new(&root);
        let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

        let response = files.serve(get("/index.html")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<h1>hi</h1>");

        assert_eq!(files.serve(get("/.env")).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(files.serve(get("/assets")).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(files.serve(get("/missing.txt")).await.status(), StatusCode::NOT_FOUND);
    }
}
