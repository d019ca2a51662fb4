//! PostgreSQL transport over `tokio-postgres`.
//!
//! - [`render_placeholders`] turns canonical `?` markers into `$1, $2, ...`.
//! - [`Arg`](crate::Arg) and [`Value`](crate::Value) implement `ToSql`, adapting
//!   each value to the parameter type the server settles on.
//! - Rows decode into [`Record`](crate::Record)s with typed column metadata.

mod decode;
mod encode;
mod placeholder;
mod transport;

pub use placeholder::{count_placeholders, render_placeholders};
pub use transport::{PgConnection, PgTransport, PgTx};
