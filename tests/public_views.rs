mod support;

use std::sync::Arc;

use pblog::application::admin::{
    SaveOutcome,
    posts::{AdminPostService, NEW_POST_ID},
};
use pblog::application::feed::FeedService;
use pblog::application::markdown::markdown_renderer;
use pblog::application::post::{COMMENT_THANKS, CommentOutcome, PostService};
use pblog::application::repos::CommentsRepo;
use pblog::application::syndication::{FeedKind, SyndicationService};
use pblog::domain::blog_config::EmailPolicy;
use pblog::domain::comments::CommentDraft;
use pblog::domain::entities::{BlogRecord, PostRecord};
use pblog::domain::forms::MSG_REQUIRED;
use support::{MemoryStore, post_draft, seed_blog};
use time::macros::datetime;

async fn publish(store: &Arc<MemoryStore>, blog: &BlogRecord, title: &str, tags: &str) -> PostRecord {
    let admin = AdminPostService::new(store.clone(), store.clone());
    match admin
        .save(blog, NEW_POST_ID, &post_draft(title, "Some *body* text", tags))
        .await
        .expect("save post")
    {
        SaveOutcome::Created(post) => post,
        other => panic!("expected a created post, got {other:?}"),
    }
}

fn post_service(store: &Arc<MemoryStore>) -> PostService {
    PostService::new(store.clone(), store.clone(), markdown_renderer())
}

fn comment(name: &str, email: &str, content: &str) -> CommentDraft {
    CommentDraft {
        name: name.to_string(),
        email: email.to_string(),
        content: content.to_string(),
    }
}

#[tokio::test]
async fn accepted_comment_is_stored_and_form_reset() {
    let store = MemoryStore::new();
    let mut blog = seed_blog(&store, String::new()).await;
    blog.config.email = EmailPolicy::Optional;
    let post = publish(&store, &blog, "Hello", "").await;

    let outcome = post_service(&store)
        .submit_comment(
            &blog,
            &post.slug,
            comment("Ada", "ada@example.com", "Nice post"),
            Some("203.0.113.9".to_string()),
        )
        .await
        .expect("submit")
        .expect("post exists");

    let CommentOutcome::Accepted(detail) = outcome else {
        panic!("expected the comment to be accepted");
    };
    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].author, "Ada");
    assert_eq!(detail.post.comment_count, 1);
    let form = detail.form.expect("comment form");
    assert!(form.name.is_empty());
    assert_eq!(form.notice.as_deref(), Some(COMMENT_THANKS));

    let stored = store
        .list_comments_for_post(post.id)
        .await
        .expect("list comments");
    assert_eq!(stored[0].email.as_deref(), Some("ada@example.com"));
    assert_eq!(stored[0].ip.as_deref(), Some("203.0.113.9"));
}

#[tokio::test]
async fn rejected_comment_keeps_the_draft() {
    let store = MemoryStore::new();
    let mut blog = seed_blog(&store, String::new()).await;
    blog.config.email = EmailPolicy::Required;
    let post = publish(&store, &blog, "Hello", "").await;

    let outcome = post_service(&store)
        .submit_comment(&blog, &post.slug, comment("Ada", "", "Kept text"), None)
        .await
        .expect("submit")
        .expect("post exists");

    let CommentOutcome::Rejected(detail) = outcome else {
        panic!("expected the comment to be rejected");
    };
    let form = detail.form.expect("comment form");
    assert_eq!(form.content, "Kept text");
    assert_eq!(form.errors.get("email"), Some(MSG_REQUIRED));
    assert!(form.email_required);
    assert_eq!(store.comment_count(), 0);
}

#[tokio::test]
async fn disabled_email_policy_discards_the_address() {
    let store = MemoryStore::new();
    let mut blog = seed_blog(&store, String::new()).await;
    blog.config.email = EmailPolicy::Disabled;
    let post = publish(&store, &blog, "Hello", "").await;

    let outcome = post_service(&store)
        .submit_comment(&blog, &post.slug, comment("Ada", "not an email", "Hi"), None)
        .await
        .expect("submit")
        .expect("post exists");
    assert!(matches!(outcome, CommentOutcome::Accepted(_)));

    let stored = store
        .list_comments_for_post(post.id)
        .await
        .expect("list comments");
    assert_eq!(stored.len(), 1);
    assert!(stored[0].email.is_none());
}

#[tokio::test]
async fn closed_post_refuses_comments() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let admin = AdminPostService::new(store.clone(), store.clone());
    let mut draft = post_draft("Quiet", "Body", "");
    draft.comments_allowed = false;
    admin.save(&blog, NEW_POST_ID, &draft).await.expect("save");

    let service = post_service(&store);
    let outcome = service
        .submit_comment(&blog, "quiet", comment("Ada", "", "Hi"), None)
        .await
        .expect("submit")
        .expect("post exists");
    assert!(matches!(outcome, CommentOutcome::Closed));
    assert_eq!(store.comment_count(), 0);

    let detail = service
        .post_detail(&blog, "quiet")
        .await
        .expect("detail")
        .expect("post exists");
    assert!(detail.form.is_none());
}

#[tokio::test]
async fn drafts_are_hidden_from_readers() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let admin = AdminPostService::new(store.clone(), store.clone());
    let mut draft = post_draft("Secret", "Body", "");
    draft.published = false;
    admin.save(&blog, NEW_POST_ID, &draft).await.expect("save");

    let detail = post_service(&store)
        .post_detail(&blog, "secret")
        .await
        .expect("detail");
    assert!(detail.is_none());
}

#[tokio::test]
async fn front_page_paginates_newest_first() {
    let store = MemoryStore::new();
    let mut blog = seed_blog(&store, String::new()).await;
    blog.config.max_post = 2;
    for title in ["First", "Second", "Third"] {
        publish(&store, &blog, title, "").await;
    }

    let feed = FeedService::new(store.clone(), store.clone(), markdown_renderer());
    let first = feed.front_page(&blog, 1).await.expect("page 1");
    let titles: Vec<&str> = first.posts.iter().map(|card| card.title.as_str()).collect();
    assert_eq!(titles, vec!["Third", "Second"]);
    assert_eq!(first.pager.total_pages, 2);
    assert_eq!(first.pager.next_href.as_deref(), Some("/?p=2"));
    assert!(first.pager.previous_href.is_none());

    let second = feed.front_page(&blog, 2).await.expect("page 2");
    assert_eq!(second.posts.len(), 1);
    assert_eq!(second.pager.previous_href.as_deref(), Some("/"));

    let beyond = feed.front_page(&blog, 9).await.expect("page 9");
    assert!(beyond.posts.is_empty());
}

#[tokio::test]
async fn tag_and_archive_pages_filter_posts() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let old = publish(&store, &blog, "Old", "rust").await;
    publish(&store, &blog, "New", "").await;
    store.set_post_created_at(old.id, datetime!(2023-12-15 08:00 UTC));

    let feed = FeedService::new(store.clone(), store.clone(), markdown_renderer());

    let tagged = feed
        .tag_page(&blog, "rust", 1)
        .await
        .expect("tag page")
        .expect("tag exists");
    assert_eq!(tagged.posts.len(), 1);
    assert_eq!(tagged.posts[0].title, "Old");
    let links = tagged.feeds.expect("tag feed links");
    assert_eq!(links.rss_href, "/feed/tag/rust/rss2");

    assert!(feed.tag_page(&blog, "missing", 1).await.expect("tag page").is_none());

    let archive = feed
        .archive_page(&blog, 2023, 12, 1)
        .await
        .expect("archive")
        .expect("valid month");
    assert_eq!(archive.posts.len(), 1);
    assert_eq!(archive.posts[0].title, "Old");

    assert!(feed.archive_page(&blog, 2023, 13, 1).await.expect("archive").is_none());
}

#[tokio::test]
async fn feeds_link_to_absolute_post_urls() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    publish(&store, &blog, "Hello <World>", "news").await;

    let syndication = SyndicationService::new(store.clone(), store.clone(), markdown_renderer());

    let rss = syndication
        .feed(&blog, FeedKind::Rss2, None, "https://blog.example")
        .await
        .expect("rss")
        .expect("blog feed");
    assert!(rss.contains("<rss version=\"2.0\""));
    assert!(rss.contains("https://blog.example/post/hello-world"));
    assert!(rss.contains("Hello &lt;World&gt;"));

    let atom = syndication
        .feed(&blog, FeedKind::Atom, Some("news"), "https://blog.example/")
        .await
        .expect("atom")
        .expect("tag feed");
    assert!(atom.contains("<feed xmlns=\"http://www.w3.org/2005/Atom\""));
    assert!(atom.contains("https://blog.example/feed/tag/news/atom"));

    let unknown = syndication
        .feed(&blog, FeedKind::Atom, Some("nope"), "https://blog.example/")
        .await
        .expect("atom");
    assert!(unknown.is_none());
}

#[tokio::test]
async fn tags_carried_only_by_drafts_are_not_public() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let admin = AdminPostService::new(store.clone(), store.clone());
    let mut draft = post_draft("Unfinished", "Body", "wip");
    draft.published = false;
    admin.save(&blog, NEW_POST_ID, &draft).await.expect("save draft");
    assert_eq!(store.tag_names(blog.id), vec!["wip"]);

    let feed = FeedService::new(store.clone(), store.clone(), markdown_renderer());
    assert!(feed.tag_page(&blog, "wip", 1).await.expect("tag page").is_none());

    let syndication = SyndicationService::new(store.clone(), store.clone(), markdown_renderer());
    let tag_feed = syndication
        .feed(&blog, FeedKind::Rss2, Some("wip"), "https://blog.example/")
        .await
        .expect("rss");
    assert!(tag_feed.is_none());
}
