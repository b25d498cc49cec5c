// errors.rs
use thiserror::Error;

/// Errores del dominio relacional.
///
/// - `Connection`: el almacén no es alcanzable.
/// - `SchemaFetch`: falló una consulta de introspección.
/// - `Execution`: el SQL generado no pudo ejecutarse; conserva el texto
///   exacto que se envió al almacén.
/// - `Validation`: entrada inválida (por ejemplo una pregunta vacía).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
  #[error("Error de conexión: {0}")]
  Connection(String),
  #[error("Error al leer el esquema: {0}")]
  SchemaFetch(String),
  #[error("Error al ejecutar `{sql}`: {message}")]
  Execution { sql: String, message: String },
  #[error("Error de validación: {0}")]
  Validation(String),
}

impl DomainError {
  /// Construye un `Execution` a partir del texto ejecutado y la causa.
  pub fn execution(sql: impl Into<String>, cause: impl std::fmt::Display) -> Self {
    Self::Execution { sql: sql.into(), message: cause.to_string() }
  }

  /// Texto exacto ejecutado cuando el error proviene de la ejecución.
  pub fn executed_sql(&self) -> Option<&str> {
    match self {
      Self::Execution { sql, .. } => Some(sql),
      _ => None,
    }
  }
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, DomainError>;
