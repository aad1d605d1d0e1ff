use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Keyword filter requires a non-empty keyword")]
    EmptyKeyword,

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}
