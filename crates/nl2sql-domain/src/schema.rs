// schema.rs
use crate::errors::{DomainError, Result};
use crate::store::RelationalStore;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Columna tal como la declara el almacén relacional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
  pub name: String,
  pub data_type: String,
  /// Expresión por defecto declarada (`None` si no tiene).
  pub default: Option<String>,
}

impl ColumnSchema {
  pub fn new(name: impl Into<String>, data_type: impl Into<String>, default: Option<String>) -> Self {
    Self { name: name.into(), data_type: data_type.into(), default }
  }
}

impl fmt::Display for ColumnSchema {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.name, self.data_type)?;
    if let Some(d) = &self.default {
      write!(f, " DEFAULT {}", d)?;
    }
    Ok(())
  }
}

/// Tabla con sus columnas en el orden declarado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
  pub name: String,
  pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
  pub fn new(name: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
    Self { name: name.into(), columns }
  }

  pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
    self.columns.iter().find(|c| c.name == name)
  }

  pub fn column_names(&self) -> Vec<&str> {
    self.columns.iter().map(|c| c.name.as_str()).collect()
  }
}

/// Descripción completa del almacén: tabla → columnas, más el instante del
/// último refresco exitoso.
///
/// Un catálogo nunca se modifica en sitio: cada refresco construye uno nuevo
/// y lo reemplaza entero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaCatalog {
  database: Option<String>,
  tables: IndexMap<String, TableSchema>,
  refreshed_at: DateTime<Utc>,
}

impl SchemaCatalog {
  /// Construye un catálogo a partir de las tablas introspectadas. Los nombres
  /// de tabla deben ser únicos; un duplicado invalida todo el catálogo.
  pub fn from_tables(database: Option<String>, tables: Vec<TableSchema>) -> Result<Self> {
    let mut map = IndexMap::with_capacity(tables.len());
    for t in tables {
      if map.contains_key(&t.name) {
        return Err(DomainError::SchemaFetch(format!("tabla duplicada en el catálogo: {}", t.name)));
      }
      map.insert(t.name.clone(), t);
    }
    Ok(Self { database, tables: map, refreshed_at: Utc::now() })
  }

  /// Conecta con el almacén y reconstruye el catálogo completo. Devuelve un
  /// catálogo totalmente poblado o el error del almacén; nunca uno parcial.
  pub fn refresh(store: &dyn RelationalStore) -> Result<Self> {
    log::info!("Leyendo el esquema del almacén relacional...");
    let tables = store.introspect()?;
    let catalog = Self::from_tables(store.database_name(), tables)?;
    log::info!("Esquema leído: {} tablas", catalog.len());
    Ok(catalog)
  }

  pub fn database(&self) -> Option<&str> {
    self.database.as_deref()
  }

  pub fn refreshed_at(&self) -> DateTime<Utc> {
    self.refreshed_at
  }

  /// Antigüedad del catálogo respecto a `now`.
  pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
    now - self.refreshed_at
  }

  pub fn table(&self, name: &str) -> Option<&TableSchema> {
    self.tables.get(name)
  }

  pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
    self.tables.values()
  }

  pub fn table_names(&self) -> Vec<&str> {
    self.tables.keys().map(|k| k.as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.tables.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tables.is_empty()
  }

  /// Representación textual usada en el prompt: una línea por tabla con sus
  /// columnas, tipos y defaults, en el orden del catálogo.
  pub fn render(&self) -> String {
    let mut out = String::new();
    for t in self.tables.values() {
      let cols: Vec<String> = t.columns.iter().map(|c| c.to_string()).collect();
      out.push_str(&format!("{}({})\n", t.name, cols.join(", ")));
    }
    out.truncate(out.trim_end().len());
    out
  }
}
