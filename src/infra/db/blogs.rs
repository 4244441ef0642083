use async_trait::async_trait;
use sqlx::types::Json;

use crate::{
    application::repos::{BlogsRepo, RepoError},
    domain::{blog_config::BlogConfig, entities::BlogRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct BlogRow {
    id: i64,
    name: String,
    config: Json<BlogConfig>,
}

impl From<BlogRow> for BlogRecord {
    fn from(row: BlogRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            config: row.config.0,
        }
    }
}

#[async_trait]
impl BlogsRepo for PostgresRepositories {
    async fn find_blog_by_name(&self, name: &str) -> Result<Option<BlogRecord>, RepoError> {
        let row = sqlx::query_as::<_, BlogRow>(
            r#"
            SELECT id, name, config
            FROM blogs
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(BlogRecord::from))
    }

    async fn create_blog(
        &self,
        name: &str,
        config: &BlogConfig,
    ) -> Result<BlogRecord, RepoError> {
        let row = sqlx::query_as::<_, BlogRow>(
            r#"
            INSERT INTO blogs (name, config)
            VALUES ($1, $2)
            RETURNING id, name, config
            "#,
        )
        .bind(name)
        .bind(Json(config))
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(BlogRecord::from(row))
    }

    async fn update_blog_config(
        &self,
        blog_id: i64,
        config: &BlogConfig,
    ) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE blogs
            SET config = $2
            WHERE id = $1
            "#,
        )
        .bind(blog_id)
        .bind(Json(config))
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
