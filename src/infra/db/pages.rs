use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::pagination::{Page, PageRequest},
    application::repos::{PageWrite, PagesRepo, PagesWriteRepo, RepoError, Visibility},
    domain::entities::PageRecord,
};

use super::{PostgresRepositories, map_sqlx_error, util::limit_offset};

#[derive(sqlx::FromRow)]
struct PageRow {
    id: i64,
    blog_id: i64,
    title: String,
    slug: String,
    content: String,
    published: bool,
    created_at: OffsetDateTime,
}

impl From<PageRow> for PageRecord {
    fn from(row: PageRow) -> Self {
        Self {
            id: row.id,
            blog_id: row.blog_id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            published: row.published,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PagesRepo for PostgresRepositories {
    async fn list_pages(
        &self,
        blog_id: i64,
        visibility: Visibility,
        page: PageRequest,
    ) -> Result<Page<PageRecord>, RepoError> {
        let published_only = visibility == Visibility::Published;
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pages WHERE blog_id = $1 AND ($2 = FALSE OR published = TRUE)",
        )
        .bind(blog_id)
        .bind(published_only)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        let total = Self::convert_count(total)?;

        let Some((limit, offset)) = limit_offset(page) else {
            return Ok(Page::from_parts(Vec::new(), page, total));
        };

        let rows = sqlx::query_as::<_, PageRow>(
            r#"
            SELECT id, blog_id, title, slug, content, published, created_at
            FROM pages
            WHERE blog_id = $1 AND ($2 = FALSE OR published = TRUE)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(blog_id)
        .bind(published_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(Page::from_parts(
            rows.into_iter().map(PageRecord::from).collect(),
            page,
            total,
        ))
    }

    async fn list_page_links(
        &self,
        blog_id: i64,
        visibility: Visibility,
    ) -> Result<Vec<PageRecord>, RepoError> {
        let rows = sqlx::query_as::<_, PageRow>(
            r#"
            SELECT id, blog_id, title, slug, content, published, created_at
            FROM pages
            WHERE blog_id = $1 AND ($2 = FALSE OR published = TRUE)
            ORDER BY title ASC, id ASC
            "#,
        )
        .bind(blog_id)
        .bind(visibility == Visibility::Published)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PageRecord::from).collect())
    }

    async fn find_page_by_slug(
        &self,
        blog_id: i64,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<PageRecord>, RepoError> {
        let row = sqlx::query_as::<_, PageRow>(
            r#"
            SELECT id, blog_id, title, slug, content, published, created_at
            FROM pages
            WHERE blog_id = $1 AND slug = $2 AND ($3 = FALSE OR published = TRUE)
            "#,
        )
        .bind(blog_id)
        .bind(slug)
        .bind(visibility == Visibility::Published)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PageRecord::from))
    }

    async fn find_page_by_id(
        &self,
        blog_id: i64,
        id: i64,
    ) -> Result<Option<PageRecord>, RepoError> {
        let row = sqlx::query_as::<_, PageRow>(
            r#"
            SELECT id, blog_id, title, slug, content, published, created_at
            FROM pages
            WHERE blog_id = $1 AND id = $2
            "#,
        )
        .bind(blog_id)
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PageRecord::from))
    }

    async fn page_slug_exists(
        &self,
        blog_id: i64,
        slug: &str,
        exclude: Option<i64>,
    ) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM pages
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

    async fn count_pages(&self, blog_id: i64) -> Result<u64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pages WHERE blog_id = $1")
            .bind(blog_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }
}

#[async_trait]
impl PagesWriteRepo for PostgresRepositories {
    async fn create_page(&self, blog_id: i64, write: PageWrite) -> Result<PageRecord, RepoError> {
        let row = sqlx::query_as::<_, PageRow>(
            r#"
            INSERT INTO pages (blog_id, title, slug, content, published)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, blog_id, title, slug, content, published, created_at
            "#,
        )
        .bind(blog_id)
        .bind(&write.title)
        .bind(&write.slug)
        .bind(&write.content)
        .bind(write.published)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(PageRecord::from(row))
    }

    async fn update_page(
        &self,
        blog_id: i64,
        id: i64,
        write: PageWrite,
    ) -> Result<PageRecord, RepoError> {
        let row = sqlx::query_as::<_, PageRow>(
            r#"
            UPDATE pages
            SET title = $3, slug = $4, content = $5, published = $6
            WHERE blog_id = $1 AND id = $2
            RETURNING id, blog_id, title, slug, content, published, created_at
            "#,
        )
        .bind(blog_id)
        .bind(id)
        .bind(&write.title)
        .bind(&write.slug)
        .bind(&write.content)
        .bind(write.published)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(PageRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_pages(&self, blog_id: i64, ids: &[i64]) -> Result<u64, RepoError> {
        sqlx::query("DELETE FROM pages WHERE blog_id = $1 AND id = ANY($2)")
            .bind(blog_id)
            .bind(ids)
            .execute(self.pool())
            .await
            .map(|result| result.rows_affected())
            .map_err(map_sqlx_error)
    }
}
