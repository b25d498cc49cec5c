// Resolución del almacén a partir del entorno.
use crate::sqlite_store::SqliteStore;
use nl2sql_domain::{redact_dsn, DomainError, RelationalStore, Result};
use std::sync::Arc;

fn quote_kv(value: &str) -> String {
  format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// URL del almacén: `NL2SQL_DB_URL`, luego `DATABASE_URL`, y si no existen
/// se compone una cadena clave=valor desde `POSTGRES_DB`, `POSTGRES_USER`,
/// `POSTGRES_PASSWORD`, `POSTGRES_HOST` y `POSTGRES_PORT`.
pub fn database_url_from_env() -> Result<String> {
  dotenvy::dotenv().ok();
  if let Ok(url) = std::env::var("NL2SQL_DB_URL").or_else(|_| std::env::var("DATABASE_URL")) {
    return Ok(url);
  }
  let dbname = std::env::var("POSTGRES_DB").map_err(|_| {
                                             DomainError::Connection("NL2SQL_DB_URL / DATABASE_URL / POSTGRES_DB no \
                                                                      definidos"
                                                                               .into())
                                           })?;
  let host = std::env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".into());
  let port = std::env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".into());
  let mut dsn = format!("host={} port={} dbname={}", quote_kv(&host), quote_kv(&port), quote_kv(&dbname));
  if let Ok(user) = std::env::var("POSTGRES_USER") {
    dsn.push_str(&format!(" user={}", quote_kv(&user)));
  }
  if let Ok(password) = std::env::var("POSTGRES_PASSWORD") {
    dsn.push_str(&format!(" password={}", quote_kv(&password)));
  }
  Ok(dsn)
}

fn sqlite_path(url: &str) -> Option<&str> {
  if let Some(p) = url.strip_prefix("sqlite://") {
    return Some(p);
  }
  if let Some(p) = url.strip_prefix("sqlite:") {
    return Some(p);
  }
  let l = url.to_lowercase();
  if l.starts_with("file:") || l.ends_with(".db") || l.ends_with(".sqlite") || l.ends_with(".sqlite3") {
    return Some(url);
  }
  None
}

/// Construye el almacén adecuado para `url`.
pub fn store_from_url(url: &str) -> Result<Arc<dyn RelationalStore>> {
  if let Some(path) = sqlite_path(url) {
    log::info!("Usando almacén SQLite: {}", path);
    return Ok(Arc::new(SqliteStore::new(path)));
  }
  let l = url.to_lowercase();
  let looks_pg = l.starts_with("postgres://") || l.starts_with("postgresql://") || l.contains("host=")
                 || l.contains("dbname=");
  if !looks_pg {
    return Err(DomainError::Connection("la URL del almacén no parece Postgres ni SQLite".into()));
  }
  #[cfg(feature = "pg")]
  {
    log::info!("Usando almacén Postgres: {}", redact_dsn(url));
    Ok(Arc::new(crate::postgres_store::PostgresStore::new(url)?))
  }
  #[cfg(not(feature = "pg"))]
  {
    log::warn!("URL Postgres recibida sin la feature 'pg': {}", redact_dsn(url));
    Err(DomainError::Connection("nl2sql-persistence se compiló sin la feature 'pg'".into()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sqlite_urls_are_recognized() {
    assert_eq!(sqlite_path("sqlite:///tmp/a.db"), Some("/tmp/a.db"));
    assert_eq!(sqlite_path("sqlite:data/x.sqlite"), Some("data/x.sqlite"));
    assert_eq!(sqlite_path("./rental.db"), Some("./rental.db"));
    assert_eq!(sqlite_path("postgres://u@h/db"), None);
  }

  #[test]
  fn kv_values_are_quoted() {
    assert_eq!(quote_kv("it's"), "'it\\'s'");
    assert_eq!(quote_kv(r"a\b"), r"'a\\b'");
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    assert!(store_from_url("mysql://u@h/db").is_err());
  }
}
