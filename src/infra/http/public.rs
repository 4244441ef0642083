use std::{
    io::ErrorKind,
    path::{Component, Path as FsPath, PathBuf},
};

use axum::{
    Form, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, HOST},
    },
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::error;

use crate::{
    application::{
        error::{AppError, HttpError},
        post::CommentOutcome,
        syndication::FeedKind,
    },
    domain::{comments::CommentDraft, entities::BlogRecord},
    presentation::views::{
        LayoutContext, ListTemplate, PageTemplate, PostTemplate, render_not_found_response,
        render_template_response,
    },
};

use super::extract::{ClientIp, CurrentBlog};
use super::state::HttpState;

const FEED_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

pub(super) fn routes() -> Router<HttpState> {
    Router::new()
        .route("/", get(index))
        .route("/post/{slug}", get(post_detail).post(post_comment))
        .route("/tag/{name}", get(tag_index))
        .route("/page/{slug}", get(page_detail))
        .route("/archives/{year}/{month}", get(archive_index))
        .route("/feed/{kind}", get(feed))
        .route("/feed/tag/{name}/{kind}", get(tag_feed))
        .route("/static/{*path}", get(serve_static))
        .fallback(not_found)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PageQuery {
    p: Option<String>,
}

impl PageQuery {
    /// Requested page number; missing or non-numeric values mean page 1.
    pub(super) fn number(&self) -> i64 {
        self.p
            .as_deref()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .unwrap_or(1)
    }
}

async fn index(
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Query(query): Query<PageQuery>,
) -> Response {
    let chrome = match state.chrome.load(&blog).await {
        Ok(chrome) => chrome,
        Err(err) => return err.into_response(),
    };

    match state.feed.front_page(&blog, query.number()).await {
        Ok(content) => {
            let view = LayoutContext::new(chrome, "", content);
            render_template_response(ListTemplate { view }, StatusCode::OK)
        }
        Err(err) => err.into_response(),
    }
}

async fn tag_index(
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Path(name): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let chrome = match state.chrome.load(&blog).await {
        Ok(chrome) => chrome,
        Err(err) => return err.into_response(),
    };

    match state.feed.tag_page(&blog, &name, query.number()).await {
        Ok(Some(content)) => {
            let view = LayoutContext::new(chrome, name, content);
            render_template_response(ListTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => err.into_response(),
    }
}

async fn archive_index(
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Path((year, month)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Response {
    let chrome = match state.chrome.load(&blog).await {
        Ok(chrome) => chrome,
        Err(err) => return err.into_response(),
    };

    let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u8>()) else {
        return render_not_found_response(chrome);
    };

    match state
        .feed
        .archive_page(&blog, year, month, query.number())
        .await
    {
        Ok(Some(content)) => {
            let title = content.heading.clone().unwrap_or_default();
            let view = LayoutContext::new(chrome, title, content);
            render_template_response(ListTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => err.into_response(),
    }
}

async fn post_detail(
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Path(slug): Path<String>,
) -> Response {
    let chrome = match state.chrome.load(&blog).await {
        Ok(chrome) => chrome,
        Err(err) => return err.into_response(),
    };

    match state.posts.post_detail(&blog, &slug).await {
        Ok(Some(content)) => {
            let title = content.post.title.clone();
            let view = LayoutContext::new(chrome, title, content);
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => err.into_response(),
    }
}

async fn post_comment(
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Path(slug): Path<String>,
    ClientIp(ip): ClientIp,
    Form(draft): Form<CommentDraft>,
) -> Response {
    let chrome = match state.chrome.load(&blog).await {
        Ok(chrome) => chrome,
        Err(err) => return err.into_response(),
    };

    match state.posts.submit_comment(&blog, &slug, draft, ip).await {
        Ok(Some(CommentOutcome::Accepted(content) | CommentOutcome::Rejected(content))) => {
            let title = content.post.title.clone();
            let view = LayoutContext::new(chrome, title, content);
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Ok(Some(CommentOutcome::Closed)) => {
            AppError::forbidden("comments are closed for this post").into_response()
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => err.into_response(),
    }
}

async fn page_detail(
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Path(slug): Path<String>,
) -> Response {
    let chrome = match state.chrome.load(&blog).await {
        Ok(chrome) => chrome,
        Err(err) => return err.into_response(),
    };

    match state.pages.page_view(&blog, &slug).await {
        Ok(Some(page)) => {
            let title = page.title.clone();
            let view = LayoutContext::new(chrome, title, page);
            render_template_response(PageTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => err.into_response(),
    }
}

async fn feed(
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    headers: HeaderMap,
    Path(kind): Path<String>,
) -> Response {
    render_feed(&state, &blog, &headers, &kind, None).await
}

async fn tag_feed(
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    headers: HeaderMap,
    Path((name, kind)): Path<(String, String)>,
) -> Response {
    render_feed(&state, &blog, &headers, &kind, Some(&name)).await
}

async fn render_feed(
    state: &HttpState,
    blog: &BlogRecord,
    headers: &HeaderMap,
    kind: &str,
    tag: Option<&str>,
) -> Response {
    const SOURCE: &str = "infra::http::public::feed";

    let Some(kind) = FeedKind::parse(kind) else {
        return AppError::NotFound.into_response();
    };

    let base_url = site_root(state, headers);
    match state.syndication.feed(blog, kind, tag, &base_url).await {
        Ok(Some(body)) => xml_response(body),
        Ok(None) => AppError::NotFound.into_response(),
        Err(err) => HttpError::from_error(
            SOURCE,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate feed",
            &err,
        )
        .into_response(),
    }
}

/// Absolute site root: the configured public URL, else derived from `Host`.
fn site_root(state: &HttpState, headers: &HeaderMap) -> String {
    if let Some(url) = &state.public_url {
        return url.to_string();
    }

    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .filter(|value| matches!(*value, "http" | "https"))
        .unwrap_or("http");
    format!("{scheme}://{host}/")
}

async fn serve_static(State(state): State<HttpState>, Path(path): Path<String>) -> Response {
    const SOURCE: &str = "infra::http::public::serve_static";

    let Some(file) = resolve_static_path(&state.static_dir, &path) else {
        return static_not_found(SOURCE);
    };

    match tokio::fs::read(&file).await {
        Ok(bytes) => build_static_response(&path, bytes),
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
            static_not_found(SOURCE)
        }
        Err(err) => {
            error!(
                target = SOURCE,
                path = %path,
                error = %err,
                "failed to read static file"
            );
            HttpError::from_error(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read static file",
                &err,
            )
            .into_response()
        }
    }
}

/// Join `requested` under `root`, refusing anything but plain path segments.
pub(crate) fn resolve_static_path(root: &FsPath, requested: &str) -> Option<PathBuf> {
    let relative = FsPath::new(requested);
    let mut resolved = root.to_path_buf();
    let mut segments = 0;

    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                resolved.push(segment);
                segments += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    (segments > 0).then_some(resolved)
}

fn static_not_found(source: &'static str) -> Response {
    HttpError::new(
        source,
        StatusCode::NOT_FOUND,
        "File not found",
        "The requested static file is not available",
    )
    .into_response()
}

fn build_static_response(path: &str, bytes: Vec<u8>) -> Response {
    let length = bytes.len();
    let mut response = Response::new(Body::from(bytes));

    let headers = response.headers_mut();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&length.to_string()) {
        headers.insert(CONTENT_LENGTH, value);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=3600"));

    response
}

async fn not_found(State(state): State<HttpState>, CurrentBlog(blog): CurrentBlog) -> Response {
    match state.chrome.load(&blog).await {
        Ok(chrome) => render_not_found_response(chrome),
        Err(err) => err.into_response(),
    }
}

fn xml_response(body: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, FEED_CONTENT_TYPE)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults_to_first_page() {
        let query = |p: Option<&str>| PageQuery {
            p: p.map(str::to_string),
        };
        assert_eq!(query(None).number(), 1);
        assert_eq!(query(Some("abc")).number(), 1);
        assert_eq!(query(Some("3")).number(), 3);
        assert_eq!(query(Some("-2")).number(), -2);
    }

    #[test]
    fn static_paths_stay_under_root() {
        let root = FsPath::new("/srv/static");
        assert_eq!(
            resolve_static_path(root, "ouverta/style.css"),
            Some(PathBuf::from("/srv/static/ouverta/style.css"))
        );
        assert_eq!(resolve_static_path(root, "../etc/passwd"), None);
        assert_eq!(resolve_static_path(root, "a/../../b"), None);
        assert_eq!(resolve_static_path(root, ""), None);
    }
}
