// Archivo: config.rs
// Propósito: configuración del servicio leída del entorno (.env incluido).
use crate::errors::WorkflowError;
use nl2sql_domain::redact_dsn;
use nl2sql_persistence::database_url_from_env;
use nl2sql_providers::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use nl2sql_rag::DEFAULT_TOP_K;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CATALOG_TTL_SECS: u64 = 300;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Parámetros del servicio de consultas.
#[derive(Clone, PartialEq)]
pub struct ServiceConfig {
  pub database_url: String,
  pub api_key: Option<String>,
  pub model: String,
  pub llm_base_url: String,
  pub top_k: usize,
  pub catalog_ttl: Duration,
  pub generation_timeout: Duration,
  pub embedding_dim: usize,
  pub max_prompt_chars: Option<usize>,
  pub seeds_path: Option<PathBuf>,
}

// la API key y la contraseña del almacén no se imprimen
impl fmt::Debug for ServiceConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ServiceConfig")
     .field("database_url", &redact_dsn(&self.database_url))
     .field("api_key", &self.api_key.as_ref().map(|_| "***"))
     .field("model", &self.model)
     .field("llm_base_url", &self.llm_base_url)
     .field("top_k", &self.top_k)
     .field("catalog_ttl", &self.catalog_ttl)
     .field("generation_timeout", &self.generation_timeout)
     .field("embedding_dim", &self.embedding_dim)
     .field("max_prompt_chars", &self.max_prompt_chars)
     .field("seeds_path", &self.seeds_path)
     .finish()
  }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>, WorkflowError> {
  match raw {
    None => Ok(None),
    Some(v) if v.trim().is_empty() => Ok(None),
    Some(v) => v.trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| WorkflowError::Config(format!("{} tiene un valor inválido: {:?}", name, v))),
  }
}

impl ServiceConfig {
  /// Carga `.env` si existe y lee las variables `NL2SQL_*`, `GROQ_API_KEY`
  /// y las del almacén.
  pub fn from_env() -> Result<Self, WorkflowError> {
    dotenvy::dotenv().ok();
    let database_url = database_url_from_env()?;
    Self::from_lookup(database_url, |k| std::env::var(k).ok())
  }

  /// Igual que `from_env` pero con una función de búsqueda explícita.
  pub fn from_lookup<F>(database_url: String, lookup: F) -> Result<Self, WorkflowError>
    where F: Fn(&str) -> Option<String>
  {
    let top_k = parse_var::<usize>("NL2SQL_TOP_K", lookup("NL2SQL_TOP_K"))?.unwrap_or(DEFAULT_TOP_K);
    if top_k == 0 {
      return Err(WorkflowError::Config("NL2SQL_TOP_K debe ser >= 1".into()));
    }
    let embedding_dim =
      parse_var::<usize>("NL2SQL_EMBEDDING_DIM", lookup("NL2SQL_EMBEDDING_DIM"))?.unwrap_or(DEFAULT_EMBEDDING_DIM);
    if embedding_dim == 0 {
      return Err(WorkflowError::Config("NL2SQL_EMBEDDING_DIM debe ser >= 1".into()));
    }
    let ttl = parse_var::<u64>("NL2SQL_CATALOG_TTL_SECS", lookup("NL2SQL_CATALOG_TTL_SECS"))?
      .unwrap_or(DEFAULT_CATALOG_TTL_SECS);
    let timeout = parse_var::<u64>("NL2SQL_GENERATION_TIMEOUT_SECS", lookup("NL2SQL_GENERATION_TIMEOUT_SECS"))?
      .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS);
    if timeout == 0 {
      return Err(WorkflowError::Config("NL2SQL_GENERATION_TIMEOUT_SECS debe ser >= 1".into()));
    }
    let max_prompt_chars = parse_var::<usize>("NL2SQL_MAX_PROMPT_CHARS", lookup("NL2SQL_MAX_PROMPT_CHARS"))?;

    Ok(Self { database_url,
              api_key: lookup("GROQ_API_KEY").filter(|k| !k.trim().is_empty()),
              model: lookup("NL2SQL_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
              llm_base_url: lookup("NL2SQL_LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
              top_k,
              catalog_ttl: Duration::from_secs(ttl),
              generation_timeout: Duration::from_secs(timeout),
              embedding_dim,
              max_prompt_chars,
              seeds_path: lookup("NL2SQL_SEEDS_PATH").filter(|p| !p.trim().is_empty()).map(PathBuf::from) })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |k| map.get(k).cloned()
  }

  #[test]
  fn defaults_when_nothing_is_set() {
    let cfg = ServiceConfig::from_lookup("sqlite://x.db".into(), lookup(&[])).unwrap();
    assert_eq!(cfg.top_k, 2);
    assert_eq!(cfg.catalog_ttl, Duration::from_secs(300));
    assert_eq!(cfg.generation_timeout, Duration::from_secs(30));
    assert_eq!(cfg.embedding_dim, 384);
    assert_eq!(cfg.model, "llama-3.1-8b-instant");
    assert_eq!(cfg.llm_base_url, "https://api.groq.com/openai/v1");
    assert!(cfg.api_key.is_none());
    assert!(cfg.max_prompt_chars.is_none());
    assert!(cfg.seeds_path.is_none());
  }

  #[test]
  fn values_are_read_and_trimmed() {
    let cfg = ServiceConfig::from_lookup("sqlite://x.db".into(),
                                         lookup(&[("NL2SQL_TOP_K", " 4 "),
                                                  ("NL2SQL_CATALOG_TTL_SECS", "0"),
                                                  ("NL2SQL_MAX_PROMPT_CHARS", "2000"),
                                                  ("GROQ_API_KEY", "gsk_test"),
                                                  ("NL2SQL_SEEDS_PATH", "seeds.json")]))
              .unwrap();
    assert_eq!(cfg.top_k, 4);
    assert_eq!(cfg.catalog_ttl, Duration::ZERO);
    assert_eq!(cfg.max_prompt_chars, Some(2000));
    assert_eq!(cfg.api_key.as_deref(), Some("gsk_test"));
    assert_eq!(cfg.seeds_path, Some(PathBuf::from("seeds.json")));
  }

  #[test]
  fn invalid_numbers_are_config_errors() {
    let err = ServiceConfig::from_lookup("x".into(), lookup(&[("NL2SQL_TOP_K", "dos")])).unwrap_err();
    assert!(matches!(err, WorkflowError::Config(_)));
    let err = ServiceConfig::from_lookup("x".into(), lookup(&[("NL2SQL_TOP_K", "0")])).unwrap_err();
    assert!(matches!(err, WorkflowError::Config(_)));
    let err = ServiceConfig::from_lookup("x".into(), lookup(&[("NL2SQL_GENERATION_TIMEOUT_SECS", "-1")])).unwrap_err();
    assert!(matches!(err, WorkflowError::Config(_)));
    let err = ServiceConfig::from_lookup("x".into(), lookup(&[("NL2SQL_GENERATION_TIMEOUT_SECS", "0")])).unwrap_err();
    assert!(matches!(err, WorkflowError::Config(_)));
  }

  #[test]
  fn debug_output_hides_secrets() {
    let cfg = ServiceConfig::from_lookup("postgres://app:s3cret@db:5432/dvdrental".into(),
                                         lookup(&[("GROQ_API_KEY", "gsk_live_123")]))
              .unwrap();
    let shown = format!("{:?}", cfg);
    assert!(!shown.contains("s3cret"));
    assert!(!shown.contains("gsk_live_123"));
    assert!(shown.contains("postgres://app:***@db:5432/dvdrental"));
    assert!(shown.contains("llama-3.1-8b-instant"));
  }
}
