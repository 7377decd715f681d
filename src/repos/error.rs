/**
 * Responsibility
 * - the meaning a repo reports upward
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("conflict")]
    Conflict,
    // referenced row is missing, deleted, or owned by someone else
    #[error("missing parent: {0}")]
    MissingParent(&'static str),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    // 23505 = unique_violation
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            return RepoError::Conflict;
        }
        RepoError::Db(e)
    }
}
