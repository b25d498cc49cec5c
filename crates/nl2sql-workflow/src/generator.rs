// Archivo: generator.rs
// Propósito: traducir un prompt en SQL con una sola llamada al modelo.
use nl2sql_domain::GeneratedSql;
use nl2sql_providers::{LanguageModel, Message, ProviderError};
use nl2sql_rag::PromptText;
use std::sync::Arc;
use std::time::Duration;

/// Generador de SQL.
///
/// Una llamada por petición, sin reintentos, con el prompt como único mensaje
/// de usuario. El texto devuelto por el modelo se conserva tal cual en
/// `GeneratedSql`.
#[derive(Clone)]
pub struct SqlGenerator {
  model: Arc<dyn LanguageModel>,
  timeout: Duration,
}

impl SqlGenerator {
  pub fn new(model: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
    Self { model, timeout }
  }

  pub fn model_id(&self) -> &str {
    self.model.model_id()
  }

  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  pub async fn generate(&self, prompt: &PromptText) -> Result<GeneratedSql, ProviderError> {
    let messages = [Message::user(prompt.as_str())];
    log::debug!("Enviando prompt de {} caracteres a {}", prompt.as_str().len(), self.model.model_id());
    match tokio::time::timeout(self.timeout, self.model.complete(&messages)).await {
      Ok(Ok(text)) => Ok(GeneratedSql::new(text)),
      Ok(Err(e)) => Err(e),
      Err(_) => Err(ProviderError::Timeout(self.timeout)),
    }
  }
}
