use std::sync::Arc;

use axum::http::StatusCode;
use tracing::info;

use crate::application::error::HttpError;
use crate::application::feed::{listing_to_card, render_failure};
use crate::application::markdown::{MarkdownRenderer, RenderTarget};
use crate::application::repos::{CommentsRepo, NewComment, PostsRepo, RepoError, Visibility};
use crate::domain::archive::human_date;
use crate::domain::blog_config::EmailPolicy;
use crate::domain::comments::CommentDraft;
use crate::domain::entities::{BlogRecord, PostListing};
use crate::domain::forms::FieldErrors;
use crate::infra::telemetry::{METRIC_COMMENTS_CREATED, METRIC_COMMENTS_REJECTED};
use crate::presentation::views::{CommentFormView, CommentView, PostDetailContext};

const SOURCE: &str = "application::post::PostService";
pub const COMMENT_THANKS: &str = "Thank you, your comment has been posted.";

/// Result of a comment submission.
pub enum CommentOutcome {
    /// Stored; the form is reset.
    Accepted(PostDetailContext),
    /// Failed validation; the draft is redisplayed with its errors.
    Rejected(PostDetailContext),
    /// The post does not accept comments.
    Closed,
}

/// Single post view and reader comment submission.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostsRepo>,
    comments: Arc<dyn CommentsRepo>,
    renderer: Arc<MarkdownRenderer>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        comments: Arc<dyn CommentsRepo>,
        renderer: Arc<MarkdownRenderer>,
    ) -> Self {
        Self {
            posts,
            comments,
            renderer,
        }
    }

    /// `None` when no published post has this slug.
    pub async fn post_detail(
        &self,
        blog: &BlogRecord,
        slug: &str,
    ) -> Result<Option<PostDetailContext>, HttpError> {
        let Some(listing) = self.find_published(blog, slug).await? else {
            return Ok(None);
        };

        let form = blank_form(blog.config.email);
        self.detail(&listing, form).await.map(Some)
    }

    /// `None` when no published post has this slug.
    pub async fn submit_comment(
        &self,
        blog: &BlogRecord,
        slug: &str,
        draft: CommentDraft,
        ip: Option<String>,
    ) -> Result<Option<CommentOutcome>, HttpError> {
        let Some(listing) = self.find_published(blog, slug).await? else {
            return Ok(None);
        };

        if !listing.post.comments_allowed {
            return Ok(Some(CommentOutcome::Closed));
        }

        let policy = blog.config.email;
        let valid = match draft.validate(policy) {
            Ok(valid) => valid,
            Err(errors) => {
                metrics::counter!(METRIC_COMMENTS_REJECTED).increment(1);
                let form = draft_form(policy, draft, errors);
                return self
                    .detail(&listing, form)
                    .await
                    .map(|detail| Some(CommentOutcome::Rejected(detail)));
            }
        };

        let comment = self
            .comments
            .create_comment(
                blog.id,
                NewComment {
                    post_id: listing.post.id,
                    name: valid.name,
                    email: valid.email,
                    content: valid.content,
                    ip,
                },
            )
            .await
            .map_err(|err| repo_failure("create_comment", err))?;

        metrics::counter!(METRIC_COMMENTS_CREATED).increment(1);
        info!(
            target = "pblog::application::post",
            post_id = listing.post.id,
            comment_id = comment.id,
            "comment created"
        );

        // The stored comment counts towards the listing shown below.
        let mut listing = listing;
        listing.comment_count += 1;

        let mut form = blank_form(policy);
        form.notice = Some(COMMENT_THANKS.to_string());
        self.detail(&listing, form)
            .await
            .map(|detail| Some(CommentOutcome::Accepted(detail)))
    }

    async fn find_published(
        &self,
        blog: &BlogRecord,
        slug: &str,
    ) -> Result<Option<PostListing>, HttpError> {
        self.posts
            .find_post_by_slug(blog.id, slug, Visibility::Published)
            .await
            .map_err(|err| repo_failure("find_post_by_slug", err))
    }

    async fn detail(
        &self,
        listing: &PostListing,
        form: CommentFormView,
    ) -> Result<PostDetailContext, HttpError> {
        let records = self
            .comments
            .list_comments_for_post(listing.post.id)
            .await
            .map_err(|err| repo_failure("list_comments_for_post", err))?;

        let mut comments = Vec::with_capacity(records.len());
        for record in records {
            let body_html = self
                .renderer
                .render(RenderTarget::Comment, &record.content)
                .map_err(render_failure)?;
            comments.push(CommentView {
                author: record.name,
                date: human_date(record.created_at),
                body_html,
            });
        }

        Ok(PostDetailContext {
            post: listing_to_card(&self.renderer, listing)?,
            comments,
            form: listing.post.comments_allowed.then_some(form),
        })
    }
}

fn blank_form(policy: EmailPolicy) -> CommentFormView {
    CommentFormView {
        show_email: policy != EmailPolicy::Disabled,
        email_required: policy == EmailPolicy::Required,
        ..CommentFormView::default()
    }
}

fn draft_form(policy: EmailPolicy, draft: CommentDraft, errors: FieldErrors) -> CommentFormView {
    CommentFormView {
        name: draft.name,
        email: draft.email,
        content: draft.content,
        errors,
        ..blank_form(policy)
    }
}

fn repo_failure(operation: &'static str, err: RepoError) -> HttpError {
    HttpError::new(
        SOURCE,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to load post",
        format!("{operation} failed: {err}"),
    )
}
