use crate::arg::SqlType;
use crate::builder::DEFAULT_PK;
use std::time::Duration;
use tracing::Level;

/// Settings shared by every call made through a [`Db`](crate::Db).
///
/// ```ignore
/// let config = DbConfig::new()
///     .with_default_pk_column("uid")
///     .with_query_timeout(Duration::from_secs(5))
///     .log_level(Level::INFO);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Primary key column used by the row builders when none is given.
    pub default_pk_column: String,
    /// Database type for JSON values that carry no explicit tag (`JSON` or `JSONB`).
    pub json_type: SqlType,
    /// Level of the `sqlrow.sql` statement events.
    pub log_level: Level,
    /// Truncate logged SQL (in bytes). `None` logs the full text.
    pub max_sql_length: Option<usize>,
    /// Per-statement timeout. `None` means no timeout (default).
    pub query_timeout: Option<Duration>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            default_pk_column: DEFAULT_PK.to_string(),
            json_type: SqlType::Jsonb,
            log_level: Level::DEBUG,
            max_sql_length: Some(200),
            query_timeout: None,
        }
    }
}

impl DbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_pk_column(mut self, column: impl Into<String>) -> Self {
        self.default_pk_column = column.into();
        self
    }

    /// Bind untagged JSON as `JSON` instead of `JSONB`.
    ///
    /// Any other type is ignored.
    pub fn with_json_type(mut self, ty: SqlType) -> Self {
        if matches!(ty, SqlType::Json | SqlType::Jsonb) {
            self.json_type = ty;
        }
        self
    }

    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Log statements in full.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_row_builders() {
        let config = DbConfig::new();
        assert_eq!(config.default_pk_column, "id");
        assert_eq!(config.json_type, SqlType::Jsonb);
        assert_eq!(config.max_sql_length, Some(200));
        assert!(config.query_timeout.is_none());
    }

    #[test]
    fn json_type_only_accepts_json_tags() {
        assert_eq!(DbConfig::new().with_json_type(SqlType::Json).json_type, SqlType::Json);
        assert_eq!(DbConfig::new().with_json_type(SqlType::Int).json_type, SqlType::Jsonb);
    }
}
