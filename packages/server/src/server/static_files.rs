use tower_http::services::ServeDir;

/// Serve the map front-end from disk, with `index.html` for directory paths.
pub fn static_service(dir: &str) -> ServeDir {
    ServeDir::new(dir).append_index_html_on_directories(true)
}
