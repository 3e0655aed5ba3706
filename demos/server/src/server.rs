//! Demo routes.

use crate::layout;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse},
    routing::get,
};
use pagelets_core::Response;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Header the pagelets client adds to every request it makes.
const PAGELET_REQUEST_HEADER: &str = "x-pagelet-request";

struct Site {
    name: String,
    custom_hits: AtomicU64,
}

impl Site {
    fn new(name: String) -> Self {
        Self {
            name,
            custom_hits: AtomicU64::new(0),
        }
    }
}

type AppState = Arc<Site>;

pub async fn run(port: u16, name: String) -> anyhow::Result<()> {
    let app = router(Arc::new(Site::new(name)));

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(site: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/pagelet", get(pagelet))
        .route("/custom.json", get(custom))
        .route("/redirect", get(redirect))
        .with_state(site)
}

/// Send `response` as a framed pagelet body to the pagelets client, or as a
/// full page to everyone else.
fn reply(site: &Site, headers: &HeaderMap, response: Response) -> axum::response::Response {
    if !headers.contains_key(PAGELET_REQUEST_HEADER) {
        let content = response.primary_content().unwrap_or_default();
        return Html(layout::page(&site.name, content)).into_response();
    }

    match response.to_bytes() {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize pagelet response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn index(State(site): State<AppState>, headers: HeaderMap) -> axum::response::Response {
    let mut response = Response::new();
    response.set_content("this is the index page", "");
    reply(&site, &headers, response)
}

async fn pagelet(State(site): State<AppState>, headers: HeaderMap) -> axum::response::Response {
    let mut response = Response::new();
    response.set_content("this is a <b>pagelet</b> response", "");
    reply(&site, &headers, response)
}

async fn custom(State(site): State<AppState>, headers: HeaderMap) -> axum::response::Response {
    let hit = site.custom_hits.fetch_add(1, Ordering::Relaxed) + 1;
    tracing::debug!(hit, "Serving custom action");

    let mut items = serde_json::Map::new();
    items.insert("items".to_string(), serde_json::json!(["one", "two", "three"]));

    let mut response = Response::new();
    response
        .set_content(format!("other content {hit}"), "other")
        .add_custom("my-items", items);
    reply(&site, &headers, response)
}

async fn redirect(State(site): State<AppState>, headers: HeaderMap) -> axum::response::Response {
    let mut response = Response::new();
    response.redirect("/");
    reply(&site, &headers, response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::HeaderValue;
    use pagelets_core::Action;

    fn site() -> AppState {
        Arc::new(Site::new("Demo".to_string()))
    }

    fn pagelet_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(PAGELET_REQUEST_HEADER, HeaderValue::from_static("1"));
        headers
    }

    async fn body(response: axum::response::Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn pagelet_request_gets_framed_json() {
        let response = pagelet(State(site()), pagelet_headers()).await;
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            HeaderValue::from_static("application/json")
        );

        let decoded = Response::from_bytes(&body(response).await).unwrap();
        assert_eq!(
            decoded.primary_content(),
            Some("this is a <b>pagelet</b> response")
        );
    }

    #[tokio::test]
    async fn plain_request_gets_full_page() {
        let response = pagelet(State(site()), HeaderMap::new()).await;
        let html = String::from_utf8(body(response).await).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<div id="content">this is a <b>pagelet</b> response</div>"#));
    }

    #[tokio::test]
    async fn custom_sends_content_then_custom_action() {
        let site = site();
        let _ = custom(State(site.clone()), pagelet_headers()).await;
        let response = custom(State(site), pagelet_headers()).await;

        let decoded = Response::from_bytes(&body(response).await).unwrap();
        let kinds: Vec<_> = decoded.actions().iter().filter_map(Action::kind).collect();
        assert_eq!(kinds, ["content", "my-items"]);

        let Action::Content(content) = &decoded.actions()[0] else {
            panic!("expected content action");
        };
        assert_eq!(content.target, "other");
        assert_eq!(content.content, "other content 2");
    }

    #[tokio::test]
    async fn redirect_without_main_content_renders_empty_page() {
        let response = redirect(State(site()), HeaderMap::new()).await;
        let html = String::from_utf8(body(response).await).unwrap();
        assert!(html.contains(r#"<div id="content"></div>"#));
    }
}
