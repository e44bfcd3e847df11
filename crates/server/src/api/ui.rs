use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Chat UI
#[utoipa::path(
    get,
    path = "/",
    tag = "UI",
    responses(
        (status = 200, description = "Single-page chat UI", body = String, content_type = "text/html")
    )
)]
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
