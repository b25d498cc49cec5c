// example.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Par (pregunta, SQL) antes de ser embebido. Se acepta `query` como alias
/// de `sql` al deserializar ficheros de semillas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPair {
  pub question: String,
  #[serde(alias = "query")]
  pub sql: String,
}

impl SeedPair {
  pub fn new(question: impl Into<String>, sql: impl Into<String>) -> Self {
    Self { question: question.into(), sql: sql.into() }
  }
}

/// Ejemplo semilla ya embebido. Inmutable durante toda la vida del proceso.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedExample {
  question: String,
  sql: String,
  embedding: Vec<f32>,
}

impl SeedExample {
  pub fn new(pair: SeedPair, embedding: Vec<f32>) -> Self {
    Self { question: pair.question, sql: pair.sql, embedding }
  }

  pub fn question(&self) -> &str {
    &self.question
  }

  pub fn sql(&self) -> &str {
    &self.sql
  }

  pub fn embedding(&self) -> &[f32] {
    &self.embedding
  }
}

/// Bloque literal tal como aparece en el prompt.
impl fmt::Display for SeedExample {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Question: {}\nQuery: {}", self.question, self.sql)
  }
}
