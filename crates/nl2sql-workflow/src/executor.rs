// Archivo: executor.rs
// Propósito: ejecutar SQL saneado contra el almacén relacional.
use nl2sql_domain::{DomainError, RelationalStore, Result, Row, SanitizedSql};
use std::sync::Arc;

/// Ejecuta una sentencia por llamada. Operación bloqueante.
#[derive(Clone)]
pub struct SqlExecutor {
  store: Arc<dyn RelationalStore>,
}

impl SqlExecutor {
  pub fn new(store: Arc<dyn RelationalStore>) -> Self {
    Self { store }
  }

  /// Todas las filas devueltas, en orden. Cualquier fallo se informa como
  /// `DomainError::Execution` con el texto exacto ejecutado.
  pub fn execute(&self, sql: &SanitizedSql) -> Result<Vec<Row>> {
    log::info!("Ejecutando SQL: {}", sql);
    match self.store.execute(sql) {
      Ok(rows) => {
        log::info!("La consulta devolvió {} filas", rows.len());
        Ok(rows)
      }
      Err(e @ DomainError::Execution { .. }) => Err(e),
      Err(other) => Err(DomainError::execution(sql.as_str(), other)),
    }
  }
}
