// Archivo: catalog.rs
// Propósito: caché del catálogo de esquema con TTL.
use nl2sql_domain::{RelationalStore, Result, SchemaCatalog};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Catálogo compartido con caducidad.
///
/// `get` devuelve el catálogo en caché mientras su edad sea menor que el TTL
/// y si no lo refresca. Si el refresco falla y había un catálogo previo se
/// devuelve el previo (caducado) con un aviso; sin catálogo previo se
/// propaga el error. Los lectores clonan el `Arc`; el refresco lo sustituye.
///
/// La edad se mide con un reloj monotónico tomado al cargar el catálogo;
/// `SchemaCatalog::refreshed_at` sólo se usa para mostrarlo.
///
/// Las operaciones son bloqueantes (tocan el almacén). Desde código async
/// hay que llamarlas dentro de `spawn_blocking`.
pub struct CatalogCache {
  store: Arc<dyn RelationalStore>,
  ttl: Duration,
  current: RwLock<Option<(Arc<SchemaCatalog>, Instant)>>,
}

impl CatalogCache {
  pub fn new(store: Arc<dyn RelationalStore>, ttl: Duration) -> Self {
    Self { store, ttl, current: RwLock::new(None) }
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  /// Catálogo en caché, fresco o no, sin tocar el almacén.
  pub fn cached(&self) -> Option<Arc<SchemaCatalog>> {
    self.entry().map(|(catalog, _)| catalog)
  }

  fn entry(&self) -> Option<(Arc<SchemaCatalog>, Instant)> {
    self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
  }

  pub fn get(&self) -> Result<Arc<SchemaCatalog>> {
    if let Some((catalog, loaded)) = self.entry() {
      if loaded.elapsed() < self.ttl {
        log::debug!("Catálogo en caché ({} tablas)", catalog.len());
        return Ok(catalog);
      }
      log::info!("Catálogo caducado, refrescando");
    }
    self.refresh_now()
  }

  /// Fuerza un refresco, con la misma regla de respaldo que `get`.
  pub fn refresh_now(&self) -> Result<Arc<SchemaCatalog>> {
    match SchemaCatalog::refresh(self.store.as_ref()) {
      Ok(fresh) => {
        let fresh = Arc::new(fresh);
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some((Arc::clone(&fresh), Instant::now()));
        Ok(fresh)
      }
      Err(e) => match self.cached() {
        Some(stale) => {
          log::warn!("No se pudo refrescar el catálogo ({}); se usa el anterior", e);
          Ok(stale)
        }
        None => {
          log::error!("No se pudo leer el catálogo: {}", e);
          Err(e)
        }
      },
    }
  }
}
