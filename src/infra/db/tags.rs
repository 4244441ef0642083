use async_trait::async_trait;

use crate::{
    application::repos::{RepoError, TagsRepo, Visibility},
    domain::entities::TagWithCount,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct TagCountRow {
    id: i64,
    name: String,
    post_count: i64,
}

#[async_trait]
impl TagsRepo for PostgresRepositories {
    async fn list_tags_with_counts(
        &self,
        blog_id: i64,
        visibility: Visibility,
    ) -> Result<Vec<TagWithCount>, RepoError> {
        let rows = sqlx::query_as::<_, TagCountRow>(
            r#"
            SELECT t.id, t.name, COUNT(p.id) AS post_count
            FROM tags t
            INNER JOIN post_tags pt ON pt.tag_id = t.id
            INNER JOIN posts p
                ON p.id = pt.post_id
                AND ($2 = FALSE OR p.published = TRUE)
            WHERE t.blog_id = $1
            GROUP BY t.id, t.name
            ORDER BY t.name ASC
            "#,
        )
        .bind(blog_id)
        .bind(visibility == Visibility::Published)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| TagWithCount {
                id: row.id,
                name: row.name,
                post_count: row.post_count,
            })
            .collect())
    }

    async fn tag_exists(
        &self,
        blog_id: i64,
        name: &str,
        visibility: Visibility,
    ) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM tags t
                WHERE t.blog_id = $1
                  AND t.name = $2
                  AND (
                      $3 = FALSE
                      OR EXISTS (
                          SELECT 1
                          FROM post_tags pt
                          INNER JOIN posts p ON p.id = pt.post_id
                          WHERE pt.tag_id = t.id AND p.published = TRUE
                      )
                  )
            )
            "#,
        )
        .bind(blog_id)
        .bind(name)
        .bind(visibility == Visibility::Published)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
