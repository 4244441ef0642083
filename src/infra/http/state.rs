use std::{path::PathBuf, sync::Arc};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use url::Url;

use crate::application::{
    admin::{
        comments::AdminCommentService, dashboard::AdminDashboardService, pages::AdminPageService,
        posts::AdminPostService, settings::AdminSettingsService,
    },
    chrome::ChromeService,
    feed::FeedService,
    markdown::{MarkdownRenderer, markdown_renderer},
    page::PageService,
    post::PostService,
    repos::{
        BlogsRepo, CommentsRepo, PagesRepo, PagesWriteRepo, PostsRepo, PostsWriteRepo, TagsRepo,
    },
    syndication::SyndicationService,
};
use crate::infra::db::PostgresRepositories;

/// Repository handles the HTTP services are built from.
#[derive(Clone)]
pub struct HttpRepositories {
    pub blogs: Arc<dyn BlogsRepo>,
    pub posts: Arc<dyn PostsRepo>,
    pub posts_write: Arc<dyn PostsWriteRepo>,
    pub pages: Arc<dyn PagesRepo>,
    pub pages_write: Arc<dyn PagesWriteRepo>,
    pub comments: Arc<dyn CommentsRepo>,
    pub tags: Arc<dyn TagsRepo>,
}

impl HttpRepositories {
    pub fn from_postgres(db: &Arc<PostgresRepositories>) -> Self {
        Self {
            blogs: db.clone(),
            posts: db.clone(),
            posts_write: db.clone(),
            pages: db.clone(),
            pages_write: db.clone(),
            comments: db.clone(),
            tags: db.clone(),
        }
    }
}

/// Deployment settings the handlers need at request time.
#[derive(Clone)]
pub struct HttpConfig {
    /// Name of the blog row served by this process.
    pub blog_name: String,
    pub cookie_key: Key,
    /// Absolute site root for feed links; the `Host` header is used when absent.
    pub public_url: Option<Url>,
    /// Read the client address from `X-Forwarded-For`.
    pub trust_forwarded: bool,
    pub static_dir: PathBuf,
}

#[derive(Clone)]
pub struct AdminServices {
    pub dashboard: Arc<AdminDashboardService>,
    pub posts: Arc<AdminPostService>,
    pub pages: Arc<AdminPageService>,
    pub comments: Arc<AdminCommentService>,
    pub settings: Arc<AdminSettingsService>,
}

#[derive(Clone)]
pub struct HttpState {
    pub blog_name: Arc<str>,
    pub blogs: Arc<dyn BlogsRepo>,
    pub chrome: Arc<ChromeService>,
    pub feed: Arc<FeedService>,
    pub posts: Arc<PostService>,
    pub pages: Arc<PageService>,
    pub syndication: Arc<SyndicationService>,
    pub admin: AdminServices,
    pub renderer: Arc<MarkdownRenderer>,
    pub cookie_key: Key,
    pub public_url: Option<Url>,
    pub trust_forwarded: bool,
    pub static_dir: Arc<PathBuf>,
}

impl HttpState {
    pub fn new(repos: HttpRepositories, config: HttpConfig) -> Self {
        let renderer = markdown_renderer();

        let admin = AdminServices {
            dashboard: Arc::new(AdminDashboardService::new(
                repos.posts.clone(),
                repos.pages.clone(),
                repos.comments.clone(),
                repos.tags.clone(),
            )),
            posts: Arc::new(AdminPostService::new(
                repos.posts.clone(),
                repos.posts_write.clone(),
            )),
            pages: Arc::new(AdminPageService::new(
                repos.pages.clone(),
                repos.pages_write.clone(),
            )),
            comments: Arc::new(AdminCommentService::new(repos.comments.clone())),
            settings: Arc::new(AdminSettingsService::new(repos.blogs.clone())),
        };

        Self {
            blog_name: Arc::from(config.blog_name),
            blogs: repos.blogs,
            chrome: Arc::new(ChromeService::new(
                repos.posts.clone(),
                repos.tags.clone(),
                repos.pages.clone(),
            )),
            feed: Arc::new(FeedService::new(
                repos.posts.clone(),
                repos.tags.clone(),
                renderer.clone(),
            )),
            posts: Arc::new(PostService::new(
                repos.posts.clone(),
                repos.comments,
                renderer.clone(),
            )),
            pages: Arc::new(PageService::new(repos.pages, renderer.clone())),
            syndication: Arc::new(SyndicationService::new(
                repos.posts,
                repos.tags,
                renderer.clone(),
            )),
            admin,
            renderer,
            cookie_key: config.cookie_key,
            public_url: config.public_url,
            trust_forwarded: config.trust_forwarded,
            static_dir: Arc::new(config.static_dir),
        }
    }
}

impl FromRef<HttpState> for Key {
    fn from_ref(state: &HttpState) -> Self {
        state.cookie_key.clone()
    }
}
