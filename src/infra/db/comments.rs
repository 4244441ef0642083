use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::pagination::{Page, PageRequest},
    application::repos::{CommentsRepo, NewComment, RepoError},
    domain::entities::{CommentRecord, CommentWithPost},
};

use super::{PostgresRepositories, map_sqlx_error, util::limit_offset};

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    blog_id: i64,
    post_id: i64,
    name: String,
    email: Option<String>,
    content: String,
    ip: Option<String>,
    created_at: OffsetDateTime,
}

impl From<CommentRow> for CommentRecord {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            blog_id: row.blog_id,
            post_id: row.post_id,
            name: row.name,
            email: row.email,
            content: row.content,
            ip: row.ip,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentWithPostRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    post_title: String,
    post_slug: String,
}

#[async_trait]
impl CommentsRepo for PostgresRepositories {
    async fn list_comments_for_post(
        &self,
        post_id: i64,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, blog_id, post_id, name, email, content, ip, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CommentRecord::from).collect())
    }

    async fn list_recent_comments(
        &self,
        blog_id: i64,
        page: PageRequest,
    ) -> Result<Page<CommentWithPost>, RepoError> {
        let total = self.count_comments(blog_id).await?;

        let Some((limit, offset)) = limit_offset(page) else {
            return Ok(Page::from_parts(Vec::new(), page, total));
        };

        let rows = sqlx::query_as::<_, CommentWithPostRow>(
            r#"
            SELECT c.id, c.blog_id, c.post_id, c.name, c.email, c.content, c.ip, c.created_at,
                   p.title AS post_title, p.slug AS post_slug
            FROM comments c
            INNER JOIN posts p ON p.id = c.post_id
            WHERE c.blog_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(blog_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let items = rows
            .into_iter()
            .map(|row| CommentWithPost {
                comment: CommentRecord::from(row.comment),
                post_title: row.post_title,
                post_slug: row.post_slug,
            })
            .collect();
        Ok(Page::from_parts(items, page, total))
    }

    async fn create_comment(
        &self,
        blog_id: i64,
        comment: NewComment,
    ) -> Result<CommentRecord, RepoError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (blog_id, post_id, name, email, content, ip)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, blog_id, post_id, name, email, content, ip, created_at
            "#,
        )
        .bind(blog_id)
        .bind(comment.post_id)
        .bind(&comment.name)
        .bind(&comment.email)
        .bind(&comment.content)
        .bind(&comment.ip)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(CommentRecord::from(row))
    }

    async fn delete_comments(&self, blog_id: i64, ids: &[i64]) -> Result<u64, RepoError> {
        sqlx::query("DELETE FROM comments WHERE blog_id = $1 AND id = ANY($2)")
            .bind(blog_id)
            .bind(ids)
            .execute(self.pool())
            .await
            .map(|result| result.rows_affected())
            .map_err(map_sqlx_error)
    }

    async fn count_comments(&self, blog_id: i64) -> Result<u64, RepoError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE blog_id = $1")
                .bind(blog_id)
                .fetch_one(self.pool())
                .await
                .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }
}
