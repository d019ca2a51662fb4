//! Statement logging on the `sqlrow.sql` target.

use crate::config::DbConfig;
use crate::dialect::Dialect;
use crate::template::Statement;
use tracing::Level;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

fn display_sql(config: &DbConfig, sql: &str) -> String {
    match config.max_sql_length {
        Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
        _ => sql.to_string(),
    }
}

/// Emit one event for a statement about to be handed to the transport.
pub(crate) fn statement(config: &DbConfig, op: &'static str, dialect: Dialect, stmt: &Statement) {
    /// Dispatch a tracing event at a runtime-determined level.
    macro_rules! emit_at_level {
        ($level:expr, $($field:tt)*) => {
            match $level {
                Level::ERROR => tracing::error!($($field)*),
                Level::WARN  => tracing::warn!($($field)*),
                Level::INFO  => tracing::info!($($field)*),
                Level::DEBUG => tracing::debug!($($field)*),
                Level::TRACE => tracing::trace!($($field)*),
            }
        };
    }

    let sql = display_sql(config, &stmt.sql);
    emit_at_level!(
        config.log_level,
        target: "sqlrow.sql",
        op,
        dialect = %dialect,
        param_count = stmt.args.len(),
        sql = %sql,
    );
}
