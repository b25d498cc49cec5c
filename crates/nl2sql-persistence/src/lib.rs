//! Implementaciones de `RelationalStore` sobre almacenes reales.
//!
//! - `PostgresStore` (feature `pg`, activa por defecto): introspección vía
//!   `information_schema` y ejecución con el cliente síncrono `postgres`.
//! - `SqliteStore`: misma interfaz sobre un fichero SQLite, usada en pruebas
//!   y demos locales.
//!
//! Ambas abren una conexión nueva por operación y la cierran al terminar.

mod env;
#[cfg(feature = "pg")]
mod pg_value;
#[cfg(feature = "pg")]
mod postgres_store;
mod sqlite_store;

pub use env::{database_url_from_env, store_from_url};
#[cfg(feature = "pg")]
pub use postgres_store::PostgresStore;
pub use sqlite_store::SqliteStore;
