use crate::stage::QueryStage;
use nl2sql_domain::DomainError;
use nl2sql_providers::ProviderError;
use nl2sql_rag::RagError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Errores del motor de consultas.
//
// Agrupa los errores de las capas inferiores (dominio relacional,
// proveedores, recuperación de ejemplos) junto con los de configuración.
#[derive(Error, Debug)]
pub enum WorkflowError {
  /// Errores del almacén relacional y de validación de la pregunta.
  #[error("Error de dominio: {0}")]
  Domain(#[from] DomainError),

  /// Errores de embeddings o del modelo de lenguaje.
  #[error("Error del proveedor: {0}")]
  Provider(#[from] ProviderError),

  /// Errores del índice de ejemplos.
  #[error("Error de recuperación: {0}")]
  Rag(#[from] RagError),

  /// Variables de entorno ausentes o con valores inválidos.
  #[error("Error de configuración: {0}")]
  Config(String),

  /// Error generico: tareas abortadas y similares.
  #[error("Otro error: {0}")]
  Other(String),
}

/// Clase de fallo tal como se comunica al usuario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
  /// La pregunta estaba vacía.
  InvalidQuestion,
  /// No se pudo leer la base de datos (conexión o esquema).
  Database,
  /// Falló el modelo (embeddings o generación).
  Model,
  /// El SQL generado no pudo ejecutarse.
  Execution,
}

impl fmt::Display for FailureCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      FailureCategory::InvalidQuestion => "invalid_question",
      FailureCategory::Database => "database",
      FailureCategory::Model => "model",
      FailureCategory::Execution => "execution",
    };
    write!(f, "{}", s)
  }
}

/// Fallo de una petición: etapa en la que ocurrió y causa.
#[derive(Error, Debug)]
#[error("La petición falló en la etapa {stage}: {error}")]
pub struct QueryFailure {
  pub stage: QueryStage,
  #[source]
  pub error: WorkflowError,
}

impl QueryFailure {
  pub fn new(stage: QueryStage, error: impl Into<WorkflowError>) -> Self {
    Self { stage, error: error.into() }
  }

  pub fn category(&self) -> FailureCategory {
    match &self.error {
      WorkflowError::Domain(DomainError::Validation(_)) => FailureCategory::InvalidQuestion,
      WorkflowError::Domain(DomainError::Execution { .. }) => FailureCategory::Execution,
      WorkflowError::Domain(_) => FailureCategory::Database,
      WorkflowError::Provider(_) | WorkflowError::Rag(_) => FailureCategory::Model,
      WorkflowError::Config(_) | WorkflowError::Other(_) => match self.stage {
        QueryStage::Executing => FailureCategory::Execution,
        QueryStage::RetrievingExamples | QueryStage::GeneratingSql => FailureCategory::Model,
        _ => FailureCategory::Database,
      },
    }
  }

  /// Mensaje corto para mostrar al usuario. No incluye cadenas de conexión.
  pub fn user_message(&self) -> String {
    match self.category() {
      FailureCategory::InvalidQuestion => "La pregunta está vacía.".to_string(),
      FailureCategory::Database => "No se pudo leer la base de datos.".to_string(),
      FailureCategory::Model => "El modelo no pudo generar la consulta.".to_string(),
      FailureCategory::Execution => match &self.error {
        WorkflowError::Domain(e) => match e.executed_sql() {
          Some(sql) => format!("La consulta generada no pudo ejecutarse: {}", sql),
          None => "La consulta generada no pudo ejecutarse.".to_string(),
        },
        _ => "La consulta generada no pudo ejecutarse.".to_string(),
      },
    }
  }
}
