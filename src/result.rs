use crate::{cql, errorlog::ErrorLog};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("render error: {0}")]
    Render(#[from] cql::Error),
    #[error("mapping validation failed with {} record(s):\n{0}", .0.len())]
    Validation(ErrorLog),
}
