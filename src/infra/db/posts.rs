use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, Transaction};
use time::OffsetDateTime;

use crate::{
    application::pagination::{Page, PageRequest},
    application::repos::{
        PostFilter, PostWrite, PostsRepo, PostsWriteRepo, RepoError, Visibility,
    },
    domain::entities::{PostListing, PostRecord, TagRecord},
    domain::tags::plan_tag_sync,
};

use super::{PostgresRepositories, map_sqlx_error, util::limit_offset};

const POST_COLUMNS: &str = "p.id, p.blog_id, p.title, p.slug, p.content, p.published, \
    p.comments_allowed, p.created_at, \
    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    blog_id: i64,
    title: String,
    slug: String,
    content: String,
    published: bool,
    comments_allowed: bool,
    created_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            blog_id: row.blog_id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            published: row.published,
            comments_allowed: row.comments_allowed,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostListRow {
    #[sqlx(flatten)]
    post: PostRow,
    comment_count: i64,
}

#[derive(sqlx::FromRow)]
struct PostTagRow {
    post_id: i64,
    id: i64,
    name: String,
}

impl PostgresRepositories {
    async fn attach_listings(&self, rows: Vec<PostListRow>) -> Result<Vec<PostListing>, RepoError> {
        let ids: Vec<i64> = rows.iter().map(|row| row.post.id).collect();
        let mut tags = self.tags_for_posts(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| PostListing {
                tags: tags.remove(&row.post.id).unwrap_or_default(),
                comment_count: row.comment_count,
                post: PostRecord::from(row.post),
            })
            .collect())
    }

    async fn tags_for_posts(
        &self,
        post_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<TagRecord>>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, PostTagRow>(
            r#"
            SELECT pt.post_id, t.id, t.name
            FROM post_tags pt
            INNER JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY t.name ASC
            "#,
        )
        .bind(post_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut grouped: HashMap<i64, Vec<TagRecord>> = HashMap::new();
        for row in rows {
            grouped.entry(row.post_id).or_default().push(TagRecord {
                id: row.id,
                name: row.name,
            });
        }
        Ok(grouped)
    }

    async fn find_listing<'q>(
        &self,
        mut qb: QueryBuilder<'q, Postgres>,
    ) -> Result<Option<PostListing>, RepoError> {
        let row = qb
            .build_query_as::<PostListRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Ok(self.attach_listings(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_posts(
        &self,
        blog_id: i64,
        visibility: Visibility,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostListing>, RepoError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM posts p WHERE p.blog_id = ");
        count_qb.push_bind(blog_id);
        Self::apply_visibility(&mut count_qb, "p", visibility);
        Self::apply_post_filter(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        let total = Self::convert_count(total)?;

        let Some((limit, offset)) = limit_offset(page) else {
            return Ok(Page::from_parts(Vec::new(), page, total));
        };

        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(" FROM posts p WHERE p.blog_id = ");
        qb.push_bind(blog_id);
        Self::apply_visibility(&mut qb, "p", visibility);
        Self::apply_post_filter(&mut qb, filter);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<PostListRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let items = self.attach_listings(rows).await?;
        Ok(Page::from_parts(items, page, total))
    }

    async fn find_post_by_slug(
        &self,
        blog_id: i64,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<PostListing>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(" FROM posts p WHERE p.blog_id = ");
        qb.push_bind(blog_id);
        qb.push(" AND p.slug = ");
        qb.push_bind(slug.to_string());
        Self::apply_visibility(&mut qb, "p", visibility);

        self.find_listing(qb).await
    }

    async fn find_post_by_id(
        &self,
        blog_id: i64,
        id: i64,
    ) -> Result<Option<PostListing>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(" FROM posts p WHERE p.blog_id = ");
        qb.push_bind(blog_id);
        qb.push(" AND p.id = ");
        qb.push_bind(id);

        self.find_listing(qb).await
    }

    async fn post_dates(
        &self,
        blog_id: i64,
        visibility: Visibility,
    ) -> Result<Vec<OffsetDateTime>, RepoError> {
        sqlx::query_scalar::<_, OffsetDateTime>(
            r#"
            SELECT created_at
            FROM posts
            WHERE blog_id = $1 AND ($2 = FALSE OR published = TRUE)
            ORDER BY created_at DESC
            "#,
        )
        .bind(blog_id)
        .bind(visibility == Visibility::Published)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn post_slug_exists(
        &self,
        blog_id: i64,
        slug: &str,
        exclude: Option<i64>,
    ) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM posts
                WHERE blog_id = $1 AND slug = $2 AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(blog_id)
        .bind(slug)
        .bind(exclude)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn count_posts(&self, blog_id: i64) -> Result<u64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE blog_id = $1")
            .bind(blog_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, blog_id: i64, write: PostWrite) -> Result<PostRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (blog_id, title, slug, content, published, comments_allowed)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, blog_id, title, slug, content, published, comments_allowed, created_at
            "#,
        )
        .bind(blog_id)
        .bind(&write.title)
        .bind(&write.slug)
        .bind(&write.content)
        .bind(write.published)
        .bind(write.comments_allowed)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sync_post_tags(&mut tx, blog_id, row.id, &write.tags).await?;
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn update_post(
        &self,
        blog_id: i64,
        id: i64,
        write: PostWrite,
    ) -> Result<PostRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = $3, slug = $4, content = $5, published = $6, comments_allowed = $7
            WHERE blog_id = $1 AND id = $2
            RETURNING id, blog_id, title, slug, content, published, comments_allowed, created_at
            "#,
        )
        .bind(blog_id)
        .bind(id)
        .bind(&write.title)
        .bind(&write.slug)
        .bind(&write.content)
        .bind(write.published)
        .bind(write.comments_allowed)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        sync_post_tags(&mut tx, blog_id, row.id, &write.tags).await?;
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn delete_posts(&self, blog_id: i64, ids: &[i64]) -> Result<u64, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let removed = sqlx::query("DELETE FROM posts WHERE blog_id = $1 AND id = ANY($2)")
            .bind(blog_id)
            .bind(ids)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();

        prune_orphan_tags(&mut tx, blog_id).await?;
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(removed)
    }
}

/// Make the post's tag set equal `requested`, creating missing tags and
/// deleting any tag left without posts.
async fn sync_post_tags(
    tx: &mut Transaction<'_, Postgres>,
    blog_id: i64,
    post_id: i64,
    requested: &[String],
) -> Result<(), RepoError> {
    let current = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT t.id, t.name
        FROM post_tags pt
        INNER JOIN tags t ON t.id = pt.tag_id
        WHERE pt.post_id = $1
        "#,
    )
    .bind(post_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(|(id, name)| TagRecord { id, name })
    .collect::<Vec<_>>();

    let plan = plan_tag_sync(&current, requested);
    if plan.is_noop() {
        return Ok(());
    }

    for name in &plan.attach {
        let tag_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tags (blog_id, name)
            VALUES ($1, $2)
            ON CONFLICT (blog_id, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(blog_id)
        .bind(name)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query(
            "INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;
    }

    if !plan.detach.is_empty() {
        let detach: Vec<i64> = plan.detach.iter().map(|tag| tag.id).collect();
        sqlx::query("DELETE FROM post_tags WHERE post_id = $1 AND tag_id = ANY($2)")
            .bind(post_id)
            .bind(&detach)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
        prune_orphan_tags(tx, blog_id).await?;
    }

    Ok(())
}

async fn prune_orphan_tags(
    tx: &mut Transaction<'_, Postgres>,
    blog_id: i64,
) -> Result<u64, RepoError> {
    sqlx::query(
        r#"
        DELETE FROM tags t
        WHERE t.blog_id = $1
          AND NOT EXISTS (SELECT 1 FROM post_tags pt WHERE pt.tag_id = t.id)
        "#,
    )
    .bind(blog_id)
    .execute(&mut **tx)
    .await
    .map(|result| result.rows_affected())
    .map_err(map_sqlx_error)
}
