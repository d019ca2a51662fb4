//! Error types for sqlrow

use thiserror::Error;

/// Result type alias for sqlrow operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum DbError {
    /// Unterminated expression or stray brace in an embedded-expression template
    #[error("Malformed template at offset {offset}: {message}")]
    MalformedTemplate { offset: usize, message: String },

    /// Arguments were given in a shape that is neither positional, named nor an evaluator
    #[error("Unsupported argument shape: {0}")]
    UnsupportedArgumentShape(String),

    /// An upsert key names a column that is not in the column list
    #[error("Unique column '{0}' not found in columns")]
    UnknownUniqueColumn(String),

    /// An embedded expression could not be evaluated
    #[error("Evaluation error in `{expr}`: {message}")]
    Eval { expr: String, message: String },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Invalid identifier, value or statement shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// A row of a change set failed
    #[error("Change {index} on '{table}' failed: {source}")]
    Change {
        table: String,
        index: usize,
        #[source]
        source: Box<DbError>,
    },

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Statement timeout
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl DbError {
    /// Create a malformed-template error at a character offset
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Self::MalformedTemplate {
            offset,
            message: message.into(),
        }
    }

    /// Create an evaluation error for an embedded expression
    pub fn eval(expr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Eval {
            expr: expr.into(),
            message: message.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a malformed template error
    pub fn is_malformed_template(&self) -> bool {
        matches!(self, Self::MalformedTemplate { .. })
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Parse a tokio_postgres error into a more specific DbError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{constraint}: {message}")),
                "23503" => return Self::ForeignKeyViolation(format!("{constraint}: {message}")),
                "23514" => return Self::CheckViolation(format!("{constraint}: {message}")),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
