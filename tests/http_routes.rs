mod support;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
    response::Response,
};
use axum_extra::extract::cookie::Key;
use pblog::application::admin::posts::{AdminPostService, NEW_POST_ID};
use pblog::application::auth::hash_password;
use pblog::infra::http::{HttpConfig, HttpState, SESSION_COOKIE, build_router};
use support::{BLOG_NAME, MemoryStore, post_draft, seed_blog};
use tower::ServiceExt;

const PASSWORD: &str = "correct horse";

async fn app() -> (Router, Arc<MemoryStore>) {
    app_with_proxy_trust(false).await
}

async fn app_with_proxy_trust(trust_forwarded: bool) -> (Router, Arc<MemoryStore>) {
    let store = MemoryStore::new();
    let hash = hash_password(PASSWORD).expect("hash password");
    seed_blog(&store, hash).await;

    let state = HttpState::new(
        store.repositories(),
        HttpConfig {
            blog_name: BLOG_NAME.to_string(),
            cookie_key: Key::generate(),
            public_url: None,
            trust_forwarded,
            static_dir: "static".into(),
        },
    );
    (build_router(state), store)
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.expect("router response")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("host", "blog.test")
        .body(Body::empty())
        .expect("request")
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

async fn sign_in(router: &Router) -> String {
    let response = send(
        router,
        post_form("/login", "password=correct+horse&next=%2Fadmin%2F"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/admin/");

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("session cookie");
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")));
    cookie.split(';').next().unwrap_or_default().to_string()
}

async fn publish(store: &Arc<MemoryStore>, title: &str, comments_allowed: bool) {
    let blog = store_blog(store).await;
    let mut draft = post_draft(title, "Body text", "");
    draft.comments_allowed = comments_allowed;
    AdminPostService::new(store.clone(), store.clone())
        .save(&blog, NEW_POST_ID, &draft)
        .await
        .expect("save post");
}

async fn store_blog(store: &Arc<MemoryStore>) -> pblog::domain::entities::BlogRecord {
    use pblog::application::repos::BlogsRepo;
    store
        .find_blog_by_name(BLOG_NAME)
        .await
        .expect("find blog")
        .expect("blog exists")
}

#[tokio::test]
async fn admin_requires_a_session() {
    let (router, _) = app().await;

    let response = send(&router, get("/admin/")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/login?next=%2Fadmin%2F");
}

#[tokio::test]
async fn bare_admin_path_redirects_to_the_dashboard() {
    let (router, _) = app().await;

    let response = send(&router, get("/admin")).await;
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()[LOCATION], "/admin/");
}

#[tokio::test]
async fn signing_in_opens_the_admin_area() {
    let (router, _) = app().await;
    let cookie = sign_in(&router).await;

    let mut request = get("/admin/");
    request
        .headers_mut()
        .insert(COOKIE, cookie.parse().expect("cookie header"));
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_redisplays_the_form() {
    let (router, _) = app().await;

    let response = send(&router, post_form("/login", "password=nope&next=%2Fadmin%2F")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("Wrong password."));
}

#[tokio::test]
async fn front_page_lists_published_posts() {
    let (router, store) = app().await;
    publish(&store, "Greetings", true).await;

    let response = send(&router, get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Greetings"));
    assert!(body.contains("/post/greetings"));
}

#[tokio::test]
async fn unknown_post_is_not_found() {
    let (router, _) = app().await;

    let response = send(&router, get("/post/nothing-here")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feeds_are_served_as_xml() {
    let (router, store) = app().await;
    publish(&store, "Greetings", true).await;

    let response = send(&router, get("/feed/rss2")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "application/xml; charset=utf-8"
    );
    let body = body_text(response).await;
    assert!(body.contains("http://blog.test/post/greetings"));

    let response = send(&router, get("/feed/json")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&router, get("/feed/tag/unknown/atom")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comments_on_a_closed_post_are_forbidden() {
    let (router, store) = app().await;
    publish(&store, "Quiet", false).await;

    let response = send(
        &router,
        post_form("/post/quiet", "name=Ada&email=&content=Hello"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.comment_count(), 0);
}

#[tokio::test]
async fn comments_on_an_open_post_are_stored() {
    let (router, store) = app().await;
    publish(&store, "Chatty", true).await;

    let response = send(
        &router,
        post_form("/post/chatty", "name=Ada&email=&content=Hello+there"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Hello there"));
    assert_eq!(store.comment_count(), 1);
}

fn forwarded_comment() -> Request<Body> {
    let mut request = post_form("/post/chatty", "name=Ada&email=&content=Hello");
    request.headers_mut().insert(
        "x-forwarded-for",
        "198.51.100.7, 10.0.0.1".parse().expect("header value"),
    );
    request
}

#[tokio::test]
async fn forwarded_for_is_ignored_unless_trusted() {
    let (router, store) = app().await;
    publish(&store, "Chatty", true).await;

    let response = send(&router, forwarded_comment()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.comment_ips(), vec![None]);
}

#[tokio::test]
async fn trusted_proxy_supplies_the_client_address() {
    let (router, store) = app_with_proxy_trust(true).await;
    publish(&store, "Chatty", true).await;

    let response = send(&router, forwarded_comment()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.comment_ips(), vec![Some("198.51.100.7".to_string())]);
}
