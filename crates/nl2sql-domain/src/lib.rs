//! nl2sql-domain: tipos del dominio de traducción lenguaje natural → SQL
//!
//! Define el catálogo de esquema (`SchemaCatalog`), los ejemplos semilla
//! (`SeedExample`), los tipos de petición/resultado y la frontera de
//! confianza entre el texto generado por el modelo (`GeneratedSql`) y el SQL
//! que realmente se ejecuta (`SanitizedSql`). También expone el contrato
//! `RelationalStore` que implementan las persistencias y un almacén en
//! memoria útil para pruebas (`InMemoryStore`).
mod errors;
mod example;
mod query;
mod schema;
mod store;

pub use errors::{DomainError, Result};
pub use example::{SeedExample, SeedPair};
pub use query::{sanitize_sql_text, GeneratedSql, QueryRequest, QueryResult, Row, SanitizedSql};
pub use schema::{ColumnSchema, SchemaCatalog, TableSchema};
pub use store::{redact_dsn, InMemoryStore, RelationalStore};
