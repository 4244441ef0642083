use crate::application::pagination::PageRequest;
use crate::application::repos::RepoError;

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Duplicate {
            constraint: db.constraint().unwrap_or("unknown").to_string(),
        },
        sqlx::Error::Database(db)
            if db.is_foreign_key_violation() || db.message().contains("invalid input syntax") =>
        {
            RepoError::InvalidInput {
                message: db.message().to_string(),
            }
        }
        other => RepoError::from_persistence(other),
    }
}

/// LIMIT and OFFSET for a page request, or `None` when the page lies before
/// the first one.
pub(super) fn limit_offset(request: PageRequest) -> Option<(i64, i64)> {
    let offset = i64::try_from(request.offset()?).ok()?;
    Some((i64::from(request.per_page()), offset))
}
