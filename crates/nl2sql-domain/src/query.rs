// query.rs
use crate::errors::{DomainError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Fila de resultado: nombre de columna → valor, en el orden del result set.
pub type Row = IndexMap<String, JsonValue>;

/// Pregunta entrante. Sólo se construye con texto no vacío.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
  question: String,
}

impl QueryRequest {
  pub fn new(question: impl Into<String>) -> Result<Self> {
    let question = question.into();
    if question.trim().is_empty() {
      return Err(DomainError::Validation("la pregunta no puede estar vacía".into()));
    }
    Ok(Self { question })
  }

  pub fn question(&self) -> &str {
    &self.question
  }
}

/// Texto devuelto por el modelo, sin ninguna garantía. No puede ejecutarse
/// directamente: hay que pasar por `sanitize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSql(String);

impl GeneratedSql {
  pub fn new(raw: impl Into<String>) -> Self {
    Self(raw.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Única transformación aplicada antes de ejecutar: se eliminan las
  /// barras invertidas literales.
  ///
  /// No se comprueba si la sentencia es de lectura o de escritura. El texto
  /// del modelo se ejecuta tal cual tras esta limpieza: es una frontera de
  /// confianza explícita y un riesgo documentado.
  pub fn sanitize(&self) -> SanitizedSql {
    SanitizedSql(sanitize_sql_text(&self.0))
  }
}

impl fmt::Display for GeneratedSql {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// SQL que ya pasó por la limpieza y es exactamente lo que se ejecuta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SanitizedSql(String);

impl SanitizedSql {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for SanitizedSql {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Elimina todas las `\` del texto. Idempotente.
pub fn sanitize_sql_text(raw: &str) -> String {
  raw.replace('\\', "")
}

/// Traza completa de una petición resuelta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
  pub question: String,
  pub sql_query: String,
  pub results: Vec<Row>,
}

impl QueryResult {
  pub fn new(request: QueryRequest, sql: SanitizedSql, results: Vec<Row>) -> Self {
    Self { question: request.question, sql_query: sql.into_inner(), results }
  }
}
