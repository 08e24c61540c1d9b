#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("database has unsupported type {2} in {0}.{1}")]
    UnsupportedType(String, String, String),
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
