//! Live-tail page.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// `GET /` - the browser log view.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
