//! Static file responder.
//!
//! Maps a request path onto a file below a base directory. Missing files
//! can fall back to a default document so that client-side routed pages
//! (`/app/palette/3`) still load the application shell.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::io;
use std::path::{Component, Path};

/// Document served for directory paths.
pub const INDEX_FILE: &str = "index.html";

/// Options for [`respond`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticOptions {
    /// Served in place of any path that does not resolve to a file
    pub default_file: Option<String>,
    /// Leading path segment removed before resolution, e.g. `app/`
    pub strip_prefix: Option<String>,
}

/// Serve `request_path` from `base_dir`.
///
/// Never fails: unreadable files become a 500 response, missing files the
/// configured default document or a 404.
pub async fn respond(base_dir: &Path, request_path: &str, options: &StaticOptions) -> Response {
    let primary = resolve_path(request_path, options.strip_prefix.as_deref());

    let missing = match primary {
        Some(relative) => match serve_file(base_dir, &relative).await {
            Ok(response) => return response,
            Err(e) if is_missing(&e) => relative,
            Err(e) => return internal_error(&relative, e),
        },
        None => request_path.to_string(),
    };

    let Some(default_file) = &options.default_file else {
        tracing::debug!("Not found: {}", missing);
        return not_found();
    };

    // The fallback is resolved once, without stripping and without a
    // further fallback.
    match resolve_path(default_file, None) {
        Some(relative) => match serve_file(base_dir, &relative).await {
            Ok(response) => response,
            Err(e) if is_missing(&e) => {
                tracing::warn!("Fallback {} not found in {}", relative, base_dir.display());
                not_found()
            }
            Err(e) => internal_error(&relative, e),
        },
        None => not_found(),
    }
}

/// Turn a request path into a path relative to the base directory.
///
/// Returns `None` for paths that would escape the base directory.
pub fn resolve_path(request_path: &str, strip_prefix: Option<&str>) -> Option<String> {
    let mut path = request_path.trim_start_matches('/');

    if let Some(prefix) = strip_prefix.map(|p| p.trim_start_matches('/')) {
        if !prefix.is_empty() {
            if let Some(rest) = path.strip_prefix(prefix) {
                // Only strip whole segments: `app` strips `app/x`, not `apple`.
                if prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/') {
                    path = rest.trim_start_matches('/');
                }
            }
        }
    }

    let mut resolved = path.to_string();
    if resolved.is_empty() || resolved.ends_with('/') {
        resolved.push_str(INDEX_FILE);
    }

    let escapes = Path::new(&resolved)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    (!escapes).then_some(resolved)
}

/// Content type for a file, from its extension.
pub fn content_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "text" => "text/plain",
        "json" => "application/json",
        "yaml" | "yml" => "text/yaml",
        "js" => "application/javascript",
        "css" => "text/css",
        "html" => "text/html",
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        _ => "text/plain",
    }
}

async fn serve_file(base_dir: &Path, relative: &str) -> io::Result<Response> {
    let content = tokio::fs::read(base_dir.join(relative)).await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(relative)),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from(content),
    )
        .into_response())
}

fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::IsADirectory
    )
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        "Not Found",
    )
        .into_response()
}

fn internal_error(relative: &str, e: io::Error) -> Response {
    tracing::error!("Error reading {}: {}", relative, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain")],
        "Internal Server Error",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn site() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("index.html"), "<h1>home</h1>").unwrap();
        fs::create_dir_all(temp.path().join("css")).unwrap();
        fs::write(temp.path().join("css/site.css"), "body{}").unwrap();
        fs::write(temp.path().join("palette.yml"), "a: 1").unwrap();
        temp
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path("/", None).as_deref(), Some("index.html"));
        assert_eq!(resolve_path("", None).as_deref(), Some("index.html"));
        assert_eq!(resolve_path("/a/b.js", None).as_deref(), Some("a/b.js"));
        assert_eq!(resolve_path("/docs/", None).as_deref(), Some("docs/index.html"));
    }

    #[test]
    fn test_resolve_path_strip_prefix() {
        assert_eq!(resolve_path("/app/page", Some("app/")).as_deref(), Some("page"));
        assert_eq!(resolve_path("/app/page", Some("app")).as_deref(), Some("page"));
        assert_eq!(resolve_path("/app", Some("app")).as_deref(), Some("index.html"));
        assert_eq!(resolve_path("/apple", Some("app")).as_deref(), Some("apple"));
        assert_eq!(resolve_path("/other/page", Some("app/")).as_deref(), Some("other/page"));
    }

    #[test]
    fn test_resolve_path_rejects_traversal() {
        assert_eq!(resolve_path("/../secret", None), None);
        assert_eq!(resolve_path("/a/../../b", None), None);
    }

    #[test]
    fn test_content_type_table() {
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("data.json"), "application/json");
        assert_eq!(content_type_for("a.yaml"), "text/yaml");
        assert_eq!(content_type_for("a.yml"), "text/yaml");
        assert_eq!(content_type_for("main.js"), "application/javascript");
        assert_eq!(content_type_for("site.css"), "text/css");
        assert_eq!(content_type_for("index.html"), "text/html");
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("photo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("icon.png"), "image/png");
        assert_eq!(content_type_for("logo.svg"), "image/svg+xml");
        assert_eq!(content_type_for("model.glb"), "text/plain");
        assert_eq!(content_type_for("Makefile"), "text/plain");
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let temp = site();
        let response = respond(temp.path(), "/", &StaticOptions::default()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert_eq!(body_text(response).await, "<h1>home</h1>");
    }

    #[tokio::test]
    async fn test_nested_file() {
        let temp = site();
        let response = respond(temp.path(), "/css/site.css", &StaticOptions::default()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
        assert_eq!(body_text(response).await, "body{}");
    }

    #[tokio::test]
    async fn test_missing_without_default_is_404() {
        let temp = site();
        let response = respond(temp.path(), "/missing.xyz", &StaticOptions::default()).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(body_text(response).await, "Not Found");
    }

    #[tokio::test]
    async fn test_strip_prefix_falls_back_to_default() {
        let temp = site();
        let options = StaticOptions {
            default_file: Some("index.html".to_string()),
            strip_prefix: Some("app/".to_string()),
        };
        let response = respond(temp.path(), "/app/page", &options).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert_eq!(body_text(response).await, "<h1>home</h1>");
    }

    #[tokio::test]
    async fn test_strip_prefix_serves_existing_file() {
        let temp = site();
        let options = StaticOptions {
            default_file: None,
            strip_prefix: Some("app/".to_string()),
        };
        let response = respond(temp.path(), "/app/palette.yml", &options).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/yaml");
    }

    #[tokio::test]
    async fn test_missing_default_file_is_404() {
        let temp = TempDir::new().unwrap();
        let options = StaticOptions {
            default_file: Some("index.html".to_string()),
            strip_prefix: None,
        };
        let response = respond(temp.path(), "/nothing", &options).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_uses_fallback_or_404() {
        let temp = site();
        let response = respond(temp.path(), "/../etc/passwd", &StaticOptions::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_directory_without_index_is_404() {
        let temp = site();
        let response = respond(temp.path(), "/css", &StaticOptions::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_500() {
        use std::os::unix::fs::PermissionsExt;

        let temp = site();
        let secret = temp.path().join("secret.txt");
        fs::write(&secret, "x").unwrap();
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores file permissions; nothing to check there.
        if fs::read(&secret).is_ok() {
            return;
        }

        let response = respond(temp.path(), "/secret.txt", &StaticOptions::default()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Internal Server Error");
    }
}
