use thiserror::Error;

/// Rejected query mutation. The query is left untouched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("sort key `{key}` is not one of the configured sort options")]
    InvalidSortKey { key: String },
    #[error("page index {index} is out of range")]
    OutOfRange { index: i64 },
    #[error("page size must be positive, got {size}")]
    InvalidPageSize { size: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("response body is not a JSON object")]
    NotAnObject,
    #[error("response is missing field `{field}`")]
    MissingField { field: String },
    #[error("response field `{field}` is malformed: {reason}")]
    InvalidField { field: String, reason: String },
}
