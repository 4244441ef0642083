mod support;

use pblog::application::admin::{
    SaveOutcome,
    dashboard::AdminDashboardService,
    pages::{AdminPageService, NEW_PAGE_ID},
    posts::{AdminPostService, NEW_POST_ID},
    settings::{AdminSettingsService, SettingsOutcome},
};
use pblog::application::auth::verify_password;
use pblog::application::bootstrap::{BootstrapOutcome, create_blog};
use pblog::application::repos::BlogsRepo;
use pblog::domain::blog_config::{EmailPolicy, SettingsForm};
use pblog::domain::forms::{MSG_REQUIRED, MSG_SLUG_TAKEN, PageDraft};
use support::{BLOG_NAME, MemoryStore, post_draft, seed_blog};

fn created<T: std::fmt::Debug>(outcome: SaveOutcome<T>) -> T {
    match outcome {
        SaveOutcome::Created(value) => value,
        other => panic!("expected a created entry, got {other:?}"),
    }
}

fn invalid<T: std::fmt::Debug>(outcome: SaveOutcome<T>) -> pblog::domain::forms::FieldErrors {
    match outcome {
        SaveOutcome::Invalid(errors) => errors,
        other => panic!("expected field errors, got {other:?}"),
    }
}

fn post_service(store: &std::sync::Arc<MemoryStore>) -> AdminPostService {
    AdminPostService::new(store.clone(), store.clone())
}

#[tokio::test]
async fn new_post_slug_comes_from_title() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let posts = post_service(&store);

    let first = posts
        .save(&blog, NEW_POST_ID, &post_draft("Hello, World!", "Body", ""))
        .await
        .expect("save first post");
    let first = created(first);
    assert_eq!(first.slug, "hello-world");

    let second = posts
        .save(&blog, NEW_POST_ID, &post_draft("Hello, World!", "Again", ""))
        .await
        .expect("save second post");
    let second = created(second);
    let suffix = second
        .slug
        .strip_prefix("hello-world-")
        .expect("collision suffix");
    assert!(!suffix.is_empty());
    assert!(suffix.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn taken_explicit_slug_is_reported_on_the_field() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let posts = post_service(&store);

    posts
        .save(&blog, NEW_POST_ID, &post_draft("About me", "Body", ""))
        .await
        .expect("save first post");

    let mut draft = post_draft("Another", "Body", "");
    draft.slug = "About Me".to_string();
    let outcome = posts
        .save(&blog, NEW_POST_ID, &draft)
        .await
        .expect("save second post");
    let errors = invalid(outcome);
    assert_eq!(errors.get("slug"), Some(MSG_SLUG_TAKEN));
}

#[tokio::test]
async fn missing_fields_are_reported_without_writing() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let posts = post_service(&store);

    let outcome = posts
        .save(&blog, NEW_POST_ID, &post_draft("  ", "", ""))
        .await
        .expect("save");
    let errors = invalid(outcome);
    assert_eq!(errors.get("title"), Some(MSG_REQUIRED));
    assert_eq!(errors.get("content"), Some(MSG_REQUIRED));

    let listed = posts.list(&blog, 1).await.expect("list posts");
    assert_eq!(listed.total_items, 0);
}

#[tokio::test]
async fn editing_tags_detaches_and_prunes_unused_ones() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let posts = post_service(&store);

    let outcome = posts
        .save(&blog, NEW_POST_ID, &post_draft("Tagged", "Body", "rust, web, rust"))
        .await
        .expect("create");
    let post = created(outcome);
    assert_eq!(store.tag_names(blog.id), vec!["rust", "web"]);

    let mut draft = post_draft("Tagged", "Body", "rust");
    draft.slug = post.slug.clone();
    let updated = posts.save(&blog, post.id, &draft).await.expect("update");
    assert!(matches!(updated, SaveOutcome::Updated(_)));
    assert_eq!(store.tag_names(blog.id), vec!["rust"]);

    // Saving the same list again changes nothing.
    posts.save(&blog, post.id, &draft).await.expect("resave");
    assert_eq!(store.tag_names(blog.id), vec!["rust"]);

    let listing = posts
        .find(&blog, post.id)
        .await
        .expect("find")
        .expect("post exists");
    assert_eq!(listing.tags.len(), 1);
    assert_eq!(listing.tags[0].name, "rust");

    draft.tags = String::new();
    posts.save(&blog, post.id, &draft).await.expect("clear tags");
    assert!(store.tag_names(blog.id).is_empty());
}

#[tokio::test]
async fn shared_tags_survive_until_the_last_post_is_deleted() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let posts = post_service(&store);

    let mut ids = Vec::new();
    for title in ["One", "Two"] {
        let outcome = posts
            .save(&blog, NEW_POST_ID, &post_draft(title, "Body", "shared"))
            .await
            .expect("create");
        ids.push(created(outcome).id);
    }

    assert_eq!(posts.delete(&blog, &ids[..1]).await.expect("delete"), 1);
    assert_eq!(store.tag_names(blog.id), vec!["shared"]);

    assert_eq!(posts.delete(&blog, &ids[1..]).await.expect("delete"), 1);
    assert!(store.tag_names(blog.id).is_empty());

    assert_eq!(posts.delete(&blog, &[]).await.expect("empty delete"), 0);
}

#[tokio::test]
async fn editing_a_missing_post_is_not_found() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let posts = post_service(&store);

    let err = posts
        .save(&blog, 4242, &post_draft("Ghost", "Body", ""))
        .await
        .expect_err("missing post");
    assert!(matches!(
        err,
        pblog::application::admin::AdminContentError::NotFound
    ));
}

#[tokio::test]
async fn pages_get_their_own_slug_namespace() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let posts = post_service(&store);
    let pages = AdminPageService::new(store.clone(), store.clone());

    posts
        .save(&blog, NEW_POST_ID, &post_draft("About", "Post body", ""))
        .await
        .expect("create post");

    let draft = PageDraft {
        title: "About".to_string(),
        content: "Page body".to_string(),
        ..PageDraft::blank()
    };
    let outcome = pages.save(&blog, NEW_PAGE_ID, &draft).await.expect("create page");
    let page = created(outcome);
    assert_eq!(page.slug, "about");
    assert!(page.published);

    let listed = pages.list(&blog, 1).await.expect("list pages");
    assert_eq!(listed.items.len(), 1);
}

#[tokio::test]
async fn settings_update_validates_every_field() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let settings = AdminSettingsService::new(store.clone());

    let form = SettingsForm {
        title: String::new(),
        max_post: "ten".to_string(),
        ..SettingsForm::from_config(&blog.config)
    };
    let outcome = settings.update(&blog, &form).await.expect("update");
    let SettingsOutcome::Invalid(errors) = outcome else {
        panic!("expected field errors");
    };
    assert!(errors.contains("title"));
    assert!(errors.contains("max_post"));

    let stored = store
        .find_blog_by_name(BLOG_NAME)
        .await
        .expect("find blog")
        .expect("blog exists");
    assert_eq!(stored.config, blog.config);
}

#[tokio::test]
async fn settings_update_persists_and_rehashes_password() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let settings = AdminSettingsService::new(store.clone());

    let form = SettingsForm {
        title: "Renamed".to_string(),
        max_post: "3".to_string(),
        email: EmailPolicy::Required.code().to_string(),
        password: "hunter2".to_string(),
        links: "Home | https://example.com/".to_string(),
        ..SettingsForm::from_config(&blog.config)
    };
    let outcome = settings.update(&blog, &form).await.expect("update");
    assert!(matches!(outcome, SettingsOutcome::Saved(_)));

    let stored = store
        .find_blog_by_name(BLOG_NAME)
        .await
        .expect("find blog")
        .expect("blog exists");
    assert_eq!(stored.config.title, "Renamed");
    assert_eq!(stored.config.max_post, 3);
    assert_eq!(stored.config.email, EmailPolicy::Required);
    assert_eq!(stored.config.links.len(), 1);
    assert!(verify_password("hunter2", &stored.config.password_hash));
}

#[tokio::test]
async fn bootstrap_leaves_an_existing_blog_untouched() {
    let store = MemoryStore::new();

    let created = create_blog(store.clone(), BLOG_NAME, "first")
        .await
        .expect("create blog");
    let BootstrapOutcome::Created(blog) = created else {
        panic!("expected a new blog");
    };
    assert_eq!(blog.config.title, BLOG_NAME);
    assert!(verify_password("first", &blog.config.password_hash));

    let again = create_blog(store.clone(), BLOG_NAME, "second")
        .await
        .expect("create blog again");
    let BootstrapOutcome::AlreadyExists(existing) = again else {
        panic!("expected the existing blog");
    };
    assert_eq!(existing.id, blog.id);
    assert!(verify_password("first", &existing.config.password_hash));
}

#[tokio::test]
async fn dashboard_counts_content() {
    let store = MemoryStore::new();
    let blog = seed_blog(&store, String::new()).await;
    let posts = post_service(&store);

    for title in ["One", "Two"] {
        posts
            .save(&blog, NEW_POST_ID, &post_draft(title, "Body", "misc"))
            .await
            .expect("create");
    }

    let dashboard =
        AdminDashboardService::new(store.clone(), store.clone(), store.clone(), store.clone());
    let view = dashboard.overview(&blog).await.expect("overview");

    let values: Vec<(String, u64)> = view
        .metrics
        .iter()
        .map(|metric| (metric.label.clone(), metric.value))
        .collect();
    assert_eq!(
        values,
        vec![
            ("Posts".to_string(), 2),
            ("Pages".to_string(), 0),
            ("Comments".to_string(), 0),
            ("Tags".to_string(), 1),
        ]
    );
    assert!(!view.has_recent_comments());
}
