/*
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    // A stored value outside what the domain accepts (e.g. unknown role name).
    #[error("invalid row: {0}")]
    InvalidRow(String),
}
